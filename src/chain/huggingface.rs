use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chain::backend::{ChatBackend, ChatResult, Usage};
use crate::chain::error::{CallFailure, ChainError, Provider};
use crate::chain::prompt::RenderedPrompt;
use crate::chain::transport::{self, RequestAuth};

const HF_CHAT_COMPLETIONS_URL: &str = "https://router.huggingface.co/v1/chat/completions";

/// Chat model used by the demonstration commands.
pub const DEFAULT_CHAT_MODEL: &str = "TinyLlama/TinyLlama-1.1B-Chat-v1.0";

/// Timeout applied when a configuration does not specify one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Validated configuration for [`ChatHuggingFace`].
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_token: String,
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

impl HuggingFaceConfig {
    pub fn new(api_token: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            model: model.into(),
            temperature: None,
            max_tokens: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Reads the credential from `HUGGINGFACEHUB_API_TOKEN`.
    ///
    /// Fails with [`ChainError::BackendUnavailable`] when the variable is
    /// unset or blank, before any network activity.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ChainError> {
        let provider = Provider::Huggingface;
        let key_env = provider.api_key_env();
        let api_token = env::var(key_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ChainError::BackendUnavailable {
                provider,
                reason: format!("{key_env} is not set in the environment"),
            })?;
        Ok(Self::new(api_token, model))
    }
}

/// Chat-completions client for the Hugging Face router.
#[derive(Debug, Clone)]
pub struct ChatHuggingFace {
    config: HuggingFaceConfig,
    client: reqwest::Client,
}

impl ChatHuggingFace {
    /// Validates the configuration and builds the HTTP transport.
    pub fn new(config: HuggingFaceConfig) -> Result<Self, ChainError> {
        let provider = Provider::Huggingface;
        if config.api_token.trim().is_empty() {
            return Err(ChainError::BackendUnavailable {
                provider,
                reason: "API token is empty".to_string(),
            });
        }
        let client = transport::build_client(config.timeout_secs).map_err(|source| {
            ChainError::BackendUnavailable {
                provider,
                reason: format!("failed to build HTTP client: {source}"),
            }
        })?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

fn wire_messages(prompt: &RenderedPrompt) -> Vec<WireMessage<'_>> {
    prompt
        .iter()
        .map(|message| WireMessage {
            role: message.role.as_str(),
            content: &message.content,
        })
        .collect()
}

#[async_trait]
impl ChatBackend for ChatHuggingFace {
    async fn invoke(&self, prompt: &RenderedPrompt) -> Result<ChatResult, ChainError> {
        let provider = Provider::Huggingface;
        let payload = ChatCompletionRequest {
            model: &self.config.model,
            messages: wire_messages(prompt),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = transport::post_json(
            &self.client,
            HF_CHAT_COMPLETIONS_URL,
            RequestAuth::Bearer(&self.config.api_token),
            &payload,
        )
        .await
        .map_err(|failure| ChainError::BackendCall { provider, failure })?;

        let body: ChatCompletionResponse =
            response.json().await.map_err(|source| ChainError::BackendCall {
                provider,
                failure: CallFailure::Request(source),
            })?;

        let content = body
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ChainError::BackendCall {
                provider,
                failure: CallFailure::MalformedResponse(
                    "response did not contain message content".to_string(),
                ),
            })?;
        let usage = body.usage.map(|usage| Usage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        });

        Ok(ChatResult { content, usage })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        ChatCompletionRequest, ChatCompletionResponse, ChatHuggingFace, HuggingFaceConfig,
        wire_messages,
    };
    use crate::chain::error::ChainError;
    use crate::chain::prompt::{MessageTemplate, PromptTemplate};

    #[test]
    fn empty_api_token_fails_construction() {
        let err = ChatHuggingFace::new(HuggingFaceConfig::new("", "some/model"))
            .expect_err("blank token should be rejected");
        match err {
            ChainError::BackendUnavailable { .. } => {}
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn request_payload_matches_chat_completions_wire_format() {
        let template = PromptTemplate::from_messages(vec![
            MessageTemplate::system("You are a helpful assistant."),
            MessageTemplate::human("What is the capital of India?"),
        ]);
        let prompt = template
            .render(&Default::default())
            .expect("no placeholders");

        let payload = ChatCompletionRequest {
            model: "TinyLlama/TinyLlama-1.1B-Chat-v1.0",
            messages: wire_messages(&prompt),
            temperature: Some(0.7),
            max_tokens: None,
        };

        let value = serde_json::to_value(&payload).expect("payload should serialize");
        assert_eq!(
            value,
            json!({
                "model": "TinyLlama/TinyLlama-1.1B-Chat-v1.0",
                "messages": [
                    {"role": "system", "content": "You are a helpful assistant."},
                    {"role": "user", "content": "What is the capital of India?"}
                ],
                "temperature": 0.7
            })
        );
    }

    #[test]
    fn response_payload_decodes_content_and_usage() {
        let raw = json!({
            "choices": [{"message": {"role": "assistant", "content": "New Delhi."}}],
            "usage": {"prompt_tokens": 21, "completion_tokens": 4, "total_tokens": 25}
        });

        let body: ChatCompletionResponse =
            serde_json::from_value(raw).expect("response should decode");
        assert_eq!(body.choices[0].message.content.as_deref(), Some("New Delhi."));
        let usage = body.usage.expect("usage should be present");
        assert_eq!(usage.total_tokens, Some(25));
    }
}
