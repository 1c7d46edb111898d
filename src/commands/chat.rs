use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use owo_colors::OwoColorize;
use serde_json::json;

use crate::chain::error::{Provider, is_api_key_present};
use crate::chain::huggingface::{
    ChatHuggingFace, DEFAULT_CHAT_MODEL, DEFAULT_TIMEOUT_SECS, HuggingFaceConfig,
};
use crate::chain::pipeline::ChatPipeline;
use crate::chain::prompt::{Bindings, MessageTemplate, PromptTemplate};
use crate::commands::{self, OutputMode};
use crate::config::{self, ProfileConfig};

/// System message used when neither flag nor profile supplies one.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. You answer all questions concisely and politely.";

#[derive(Debug, Args, Clone)]
pub struct ChatArgs {
    /// Human message template; read from stdin when omitted.
    prompt: Option<String>,
    /// System message template.
    #[arg(long)]
    system: Option<String>,
    /// Template variable binding. Repeatable.
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,
    /// Chat model identifier.
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    temperature: Option<f64>,
    #[arg(long)]
    max_tokens: Option<u32>,
    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,
    /// Profile name from the config file.
    #[arg(long)]
    profile: Option<String>,
    /// Print the rendered request as JSON without calling the backend.
    #[arg(long)]
    dry_run: bool,
    /// Shorthand for --output json.
    #[arg(long)]
    json: bool,
    #[arg(long, value_enum)]
    output: Option<OutputMode>,
    /// Also write the JSON body to a file.
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,
    /// Report token usage and latency on stderr.
    #[arg(long)]
    show_usage: bool,
    #[arg(long)]
    verbose: bool,
    /// Suppress stderr status output; fatal errors stay visible.
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug)]
struct ChatSettings {
    model: String,
    system: String,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    timeout_secs: u64,
    output: OutputMode,
    show_usage: bool,
}

/// Precedence: CLI flag, then `MC_*` env var, then profile, then default.
fn resolve_settings(args: &ChatArgs) -> Result<ChatSettings, String> {
    let profile = match &args.profile {
        Some(name) => config::load_profile(name)?,
        None => ProfileConfig::default(),
    };

    let model = args
        .model
        .clone()
        .or_else(|| commands::env_string("MC_CHAT_MODEL"))
        .or(profile.model)
        .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
    let system = args
        .system
        .clone()
        .or(profile.system)
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
    let temperature = match args.temperature {
        Some(value) => Some(value),
        None => commands::env_parsed::<f64>("MC_TEMPERATURE")?.or(profile.temperature),
    };
    let max_tokens = match args.max_tokens {
        Some(value) => Some(value),
        None => commands::env_parsed::<u32>("MC_MAX_TOKENS")?.or(profile.max_tokens),
    };
    let timeout_secs = match args.timeout {
        Some(value) => value,
        None => commands::env_parsed::<u64>("MC_TIMEOUT")?
            .or(profile.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    };
    let output = if args.json {
        OutputMode::Json
    } else if let Some(mode) = args.output {
        mode
    } else if let Some(raw) = profile.output.as_deref() {
        OutputMode::from_profile(raw)?
    } else {
        OutputMode::Text
    };
    let show_usage = args.show_usage || profile.show_usage.unwrap_or(false);

    Ok(ChatSettings {
        model,
        system,
        temperature,
        max_tokens,
        timeout_secs,
        output,
        show_usage,
    })
}

fn fmt_count(value: Option<u32>) -> String {
    value.map_or_else(|| "?".to_string(), |count| count.to_string())
}

pub async fn run(args: ChatArgs) -> Result<(), String> {
    let settings = resolve_settings(&args)?;

    let prompt_text = match &args.prompt {
        Some(text) => text.clone(),
        None => commands::read_stdin()?.trim_end().to_string(),
    };
    if prompt_text.is_empty() {
        return Err("No prompt provided. Pass it as an argument or on stdin.".to_string());
    }

    let mut bindings = Bindings::new();
    for raw in &args.vars {
        let (name, value) = commands::parse_var(raw)?;
        bindings.insert(name, value);
    }

    let template = PromptTemplate::from_messages(vec![
        MessageTemplate::system(settings.system.clone()),
        MessageTemplate::human(prompt_text),
    ]);

    if args.verbose && !args.quiet {
        eprintln!(
            "{} provider={} model={} api_key_present={}",
            "chat".dimmed(),
            Provider::Huggingface.as_str(),
            settings.model,
            is_api_key_present(Provider::Huggingface)
        );
    }

    if args.dry_run {
        let rendered = template.render(&bindings).map_err(|err| err.to_string())?;
        let body = json!({
            "dry_run": true,
            "provider": Provider::Huggingface.as_str(),
            "model": settings.model,
            "messages": rendered
                .iter()
                .map(|message| json!({"role": message.role.as_str(), "content": message.content}))
                .collect::<Vec<_>>(),
            "request": {
                "temperature": settings.temperature,
                "max_tokens": settings.max_tokens,
                "timeout_secs": settings.timeout_secs,
            },
            "output": settings.output.as_str(),
        })
        .to_string();

        if let Some(path) = &args.save {
            commands::save_body(path, &body)?;
        }
        println!("{body}");
        if settings.show_usage && !args.quiet {
            eprintln!("usage: unavailable latency_ms=0 (dry-run)");
        }
        return Ok(());
    }

    let mut backend_config =
        HuggingFaceConfig::from_env(settings.model.clone()).map_err(|err| err.to_string())?;
    backend_config.temperature = settings.temperature;
    backend_config.max_tokens = settings.max_tokens;
    backend_config.timeout_secs = settings.timeout_secs;
    let backend = ChatHuggingFace::new(backend_config).map_err(|err| err.to_string())?;
    let pipeline = ChatPipeline::new(template, backend);

    if !args.quiet {
        eprintln!("{}", "Generating response...".dimmed());
    }
    let started = Instant::now();
    let result = pipeline
        .invoke(&bindings)
        .await
        .map_err(|err| err.to_string())?;
    let latency_ms = started.elapsed().as_millis();

    let body = json!({
        "provider": Provider::Huggingface.as_str(),
        "model": settings.model,
        "content": result.content,
        "usage": result.usage.map(|usage| json!({
            "prompt_tokens": usage.prompt_tokens,
            "completion_tokens": usage.completion_tokens,
            "total_tokens": usage.total_tokens,
        })),
    })
    .to_string();

    if let Some(path) = &args.save {
        commands::save_body(path, &body)?;
    }
    match settings.output {
        OutputMode::Text => println!("{}", result.content),
        OutputMode::Json => println!("{body}"),
    }
    if settings.show_usage && !args.quiet {
        match result.usage {
            Some(usage) => eprintln!(
                "usage: prompt={} completion={} total={} latency_ms={latency_ms}",
                fmt_count(usage.prompt_tokens),
                fmt_count(usage.completion_tokens),
                fmt_count(usage.total_tokens),
            ),
            None => eprintln!("usage: unavailable latency_ms={latency_ms}"),
        }
    }

    Ok(())
}
