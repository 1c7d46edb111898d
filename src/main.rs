use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use minichain::commands::chat::{self, ChatArgs};
use minichain::commands::config::{self, ConfigArgs};
use minichain::commands::embed::{self, EmbedArgs};

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  minichain chat --var country=India \"What is the capital of {country}?\"\n  echo \"Delhi is the capital of India\" | minichain embed\n  minichain config check\n  minichain completion bash > ~/.local/share/bash-completion/completions/minichain";

const CHAT_HELP_EXAMPLES: &str = "Examples:\n  minichain chat --var country=India \"What is the capital of {country}?\"\n  echo \"Summarize the water cycle\" | minichain chat\n  minichain chat --dry-run --json --var country=India \"What is the capital of {country}?\"";

const EMBED_HELP_EXAMPLES: &str = "Examples:\n  minichain embed \"Delhi is the capital of India\"\n  minichain embed --dimensions 768 --json \"Delhi is the capital of India\"\n  echo \"Delhi is the capital of India\" | minichain embed --dry-run";

#[derive(Debug, Parser)]
#[command(
    name = "minichain",
    about = "Prompt-templated LLM pipeline demos",
    version = minichain::LONG_VERSION,
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Render a prompt template and ask a chat model", after_help = CHAT_HELP_EXAMPLES)]
    Chat(ChatArgs),
    #[command(about = "Embed a text with a hosted embedding model", after_help = EMBED_HELP_EXAMPLES)]
    Embed(EmbedArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "minichain", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "minichain", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "minichain", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Chat(args) => chat::run(args).await,
        Commands::Embed(args) => embed::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
