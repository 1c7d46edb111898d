use std::process;

use clap::Parser;
use minichain::commands::chat::{self, ChatArgs};

#[derive(Debug, Parser)]
#[command(
    name = "mcchat",
    about = "Render a prompt template and ask a chat model",
    version = minichain::LONG_VERSION
)]
struct Cli {
    #[command(flatten)]
    chat: ChatArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = chat::run(cli.chat).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
