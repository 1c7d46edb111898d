use async_trait::async_trait;

use crate::chain::error::ChainError;
use crate::chain::prompt::RenderedPrompt;

/// Token accounting reported by the chat collaborator, when available.
#[derive(Debug, Clone, Copy)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Generated-text result of one chat call.
#[derive(Debug, Clone)]
pub struct ChatResult {
    /// Natural language content of the assistant message.
    pub content: String,
    /// Usage accounting, absent when the collaborator omits it.
    pub usage: Option<Usage>,
}

/// Dense vector result of one embedding call.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResult {
    pub values: Vec<f64>,
}

impl EmbeddingResult {
    /// Number of vector components, fixed per backend configuration.
    pub fn dimensionality(&self) -> usize {
        self.values.len()
    }
}

/// Text-generation capability over a rendered message sequence.
///
/// One invocation performs exactly one outbound call and yields exactly one
/// result; no streaming, no retry, no state between calls.
#[async_trait]
pub trait ChatBackend {
    async fn invoke(&self, prompt: &RenderedPrompt) -> Result<ChatResult, ChainError>;
}

/// Embedding capability over a raw input string.
///
/// Vector length is constant across calls for a fixed configuration. Empty
/// input is passed through to the remote collaborator unmodified.
#[async_trait]
pub trait EmbeddingBackend {
    async fn embed(&self, text: &str) -> Result<EmbeddingResult, ChainError>;
}
