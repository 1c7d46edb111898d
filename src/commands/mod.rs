//! CLI command implementations.

use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;

/// Chat demonstration command.
pub mod chat;
/// Config file inspection command.
pub mod config;
/// Embedding demonstration command.
pub mod embed;

/// Stdout rendering mode shared by the chat and embed commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    pub(crate) fn from_profile(value: &str) -> Result<Self, String> {
        match value {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "Invalid profile output '{other}'. Supported values: text, json."
            )),
        }
    }
}

/// Reads a trimmed, non-empty environment variable.
pub(crate) fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Reads and parses an environment variable, with an explicit parse error.
pub(crate) fn env_parsed<T: FromStr>(name: &str) -> Result<Option<T>, String> {
    match env_string(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("Invalid {name} '{raw}'.")),
    }
}

/// Splits a `--var NAME=VALUE` argument.
pub(crate) fn parse_var(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("Invalid --var '{raw}'. Expected NAME=VALUE."))
}

/// Writes a result body to `--save PATH`, creating parent directories.
pub(crate) fn save_body(path: &Path, body: &str) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    fs::write(path, body)
        .map_err(|err| format!("Failed to write output file '{}': {err}", path.display()))
}

/// Reads the whole of stdin as the fallback input source.
pub(crate) fn read_stdin() -> Result<String, String> {
    io::read_to_string(io::stdin()).map_err(|err| format!("Failed to read stdin: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{OutputMode, parse_var};

    #[test]
    fn parse_var_splits_on_first_equals() {
        assert_eq!(
            parse_var("country=India").expect("should parse"),
            ("country".to_string(), "India".to_string())
        );
        assert_eq!(
            parse_var("formula=a=b").expect("should parse"),
            ("formula".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn parse_var_rejects_missing_equals_and_empty_name() {
        assert!(parse_var("country").is_err());
        assert!(parse_var("=India").is_err());
    }

    #[test]
    fn profile_output_values_are_restricted() {
        assert_eq!(
            OutputMode::from_profile("json").expect("should parse"),
            OutputMode::Json
        );
        let err = OutputMode::from_profile("yaml").expect_err("should reject");
        assert!(err.contains("Invalid profile output 'yaml'"));
    }
}
