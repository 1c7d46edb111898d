use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// One named profile from the config file; every field optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProfileConfig {
    pub model: Option<String>,
    pub embed_model: Option<String>,
    pub system: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub dimensions: Option<u32>,
    pub timeout: Option<u64>,
    pub output: Option<String>,
    pub show_usage: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, String> {
    let path = config_path()?;
    let raw = fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read config file '{}': {err}", path.display()))?;

    let config: ConfigFile = toml::from_str(&raw)
        .map_err(|err| format!("Failed to parse config file '{}': {err}", path.display()))?;

    let profiles = config.profiles.ok_or_else(|| {
        format!(
            "Config file '{}' does not contain a [profiles] section.",
            path.display()
        )
    })?;

    profiles.get(name).cloned().ok_or_else(|| {
        format!(
            "Profile '{}' not found in config file '{}'.",
            name,
            path.display()
        )
    })
}

/// Parses the config file, and optionally checks a single profile is usable.
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, String> {
    let path = config_path()?;
    let raw = fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read config file '{}': {err}", path.display()))?;

    let config: ConfigFile = toml::from_str(&raw)
        .map_err(|err| format!("Failed to parse config file '{}': {err}", path.display()))?;

    if let Some(name) = profile {
        let profiles = config.profiles.unwrap_or_default();
        let named = profiles.get(name).ok_or_else(|| {
            format!(
                "Profile '{}' not found in config file '{}'.",
                name,
                path.display()
            )
        })?;
        validate_output_field(named)?;
    } else if let Some(profiles) = &config.profiles {
        for entry in profiles.values() {
            validate_output_field(entry)?;
        }
    }

    Ok(path)
}

fn validate_output_field(profile: &ProfileConfig) -> Result<(), String> {
    match profile.output.as_deref() {
        None | Some("text") | Some("json") => Ok(()),
        Some(other) => Err(format!(
            "Invalid profile output '{other}'. Supported values: text, json."
        )),
    }
}

/// Resolves the config file location: `MC_CONFIG`, else XDG, else `~/.config`.
pub fn config_path() -> Result<PathBuf, String> {
    if let Ok(path) = env::var("MC_CONFIG") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("minichain").join("config.toml"));
        }
    }

    let home = env::var("HOME").map_err(|_| {
        "Cannot resolve config path: set MC_CONFIG or HOME/XDG_CONFIG_HOME.".to_string()
    })?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("minichain")
        .join("config.toml"))
}
