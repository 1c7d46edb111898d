//! Prompt-templated inference pipeline building blocks.
//!
//! The module contains the role-tagged prompt template, the backend
//! capability traits, the hosted-model clients, and the pipeline composing
//! them, used by the CLI commands.

/// Backend capability traits and normalized result shapes.
pub mod backend;
/// Error taxonomy shared by every pipeline stage.
pub mod error;
/// Google Generative AI embedding client.
pub mod google;
/// Hugging Face chat-completions client.
pub mod huggingface;
/// Template-then-generate composition.
pub mod pipeline;
/// Role-tagged message templates and placeholder rendering.
pub mod prompt;
pub(crate) mod transport;
