//! Minimal prompt-templated inference pipelines over hosted-model APIs.
//!
//! The crate binds named variables into a role-structured prompt, sends the
//! rendered prompt to a pluggable text-generation or embedding backend, and
//! normalizes the response into a uniform result shape. Two demonstration
//! commands drive it: `chat` against the Hugging Face router and `embed`
//! against Google Generative AI.

/// Prompt template, backends, and pipeline composition.
pub mod chain;
/// CLI command implementations.
pub mod commands;
/// Local TOML profile configuration.
pub mod config;

/// Version string with build metadata, shown by `--version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit: ",
    env!("MC_GIT_SHA"),
    ", built: ",
    env!("MC_BUILD_TS"),
    ")"
);
