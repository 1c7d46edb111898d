use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;
use serde_json::json;

use crate::chain::backend::EmbeddingBackend;
use crate::chain::error::{Provider, is_api_key_present};
use crate::chain::google::{DEFAULT_EMBED_MODEL, GoogleConfig, GoogleEmbeddings};
use crate::chain::huggingface::DEFAULT_TIMEOUT_SECS;
use crate::commands::{self, OutputMode};
use crate::config::{self, ProfileConfig};

#[derive(Debug, Args, Clone)]
pub struct EmbedArgs {
    /// Text to embed; read from stdin when omitted.
    text: Option<String>,
    /// Embedding model identifier.
    #[arg(long)]
    model: Option<String>,
    /// Requested vector length; model default when omitted.
    #[arg(long)]
    dimensions: Option<u32>,
    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,
    /// Profile name from the config file.
    #[arg(long)]
    profile: Option<String>,
    /// Print the request as JSON without calling the backend.
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
    #[arg(long)]
    verbose: bool,
    /// Suppress stderr status output; fatal errors stay visible.
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug)]
struct EmbedSettings {
    model: String,
    dimensions: Option<u32>,
    timeout_secs: u64,
    output: OutputMode,
}

/// Precedence: CLI flag, then `MC_*` env var, then profile, then default.
fn resolve_settings(args: &EmbedArgs) -> Result<EmbedSettings, String> {
    let profile = match &args.profile {
        Some(name) => config::load_profile(name)?,
        None => ProfileConfig::default(),
    };

    let model = args
        .model
        .clone()
        .or_else(|| commands::env_string("MC_EMBED_MODEL"))
        .or(profile.embed_model)
        .unwrap_or_else(|| DEFAULT_EMBED_MODEL.to_string());
    let dimensions = match args.dimensions {
        Some(value) => Some(value),
        None => commands::env_parsed::<u32>("MC_DIMENSIONS")?.or(profile.dimensions),
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

    Ok(EmbedSettings {
        model,
        dimensions,
        timeout_secs,
        output,
    })
}

/// First few components, elided, for terminal-friendly text output.
fn preview(values: &[f64], limit: usize) -> String {
    let shown = values
        .iter()
        .take(limit)
        .map(|value| format!("{value:.6}"))
        .collect::<Vec<_>>()
        .join(", ");
    if values.len() > limit {
        format!("[{shown}, ...]")
    } else {
        format!("[{shown}]")
    }
}

pub async fn run(args: EmbedArgs) -> Result<(), String> {
    let settings = resolve_settings(&args)?;

    let text = match &args.text {
        Some(text) => text.clone(),
        None => commands::read_stdin()?.trim_end().to_string(),
    };
    if text.is_empty() {
        return Err("No text provided. Pass it as an argument or on stdin.".to_string());
    }

    if args.verbose && !args.quiet {
        eprintln!(
            "{} provider={} model={} api_key_present={}",
            "embed".dimmed(),
            Provider::Google.as_str(),
            settings.model,
            is_api_key_present(Provider::Google)
        );
    }

    if args.dry_run {
        let body = json!({
            "dry_run": true,
            "provider": Provider::Google.as_str(),
            "model": settings.model,
            "input": text,
            "request": {
                "output_dimensionality": settings.dimensions,
                "timeout_secs": settings.timeout_secs,
            },
            "output": settings.output.as_str(),
        })
        .to_string();

        if let Some(path) = &args.save {
            commands::save_body(path, &body)?;
        }
        println!("{body}");
        return Ok(());
    }

    let mut backend_config =
        GoogleConfig::from_env(settings.model.clone()).map_err(|err| err.to_string())?;
    backend_config.dimensions = settings.dimensions;
    backend_config.timeout_secs = settings.timeout_secs;
    let backend = GoogleEmbeddings::new(backend_config).map_err(|err| err.to_string())?;

    let result = backend.embed(&text).await.map_err(|err| err.to_string())?;

    let body = json!({
        "provider": Provider::Google.as_str(),
        "model": settings.model,
        "values": result.values,
        "dimensions": result.dimensionality(),
    })
    .to_string();

    if let Some(path) = &args.save {
        commands::save_body(path, &body)?;
    }
    match settings.output {
        OutputMode::Text => {
            println!("{}", preview(&result.values, 8));
            println!("Vector dimensions: {}", result.dimensionality());
        }
        OutputMode::Json => println!("{body}"),
    }

    Ok(())
}
