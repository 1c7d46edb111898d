use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chain::backend::{EmbeddingBackend, EmbeddingResult};
use crate::chain::error::{CallFailure, ChainError, Provider};
use crate::chain::huggingface::DEFAULT_TIMEOUT_SECS;
use crate::chain::transport::{self, RequestAuth};

/// Embedding model used by the demonstration commands.
pub const DEFAULT_EMBED_MODEL: &str = "gemini-embedding-001";

fn embed_content_url(model: &str) -> String {
    format!("https://generativelanguage.googleapis.com/v1beta/models/{model}:embedContent")
}

/// Validated configuration for [`GoogleEmbeddings`].
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: String,
    pub model: String,
    /// Requested vector length; the model's native dimensionality when unset.
    pub dimensions: Option<u32>,
    pub timeout_secs: u64,
}

impl GoogleConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            dimensions: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Reads the credential from `GOOGLE_API_KEY`.
    ///
    /// Fails with [`ChainError::BackendUnavailable`] when the variable is
    /// unset or blank, before any network activity.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ChainError> {
        let provider = Provider::Google;
        let key_env = provider.api_key_env();
        let api_key = env::var(key_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ChainError::BackendUnavailable {
                provider,
                reason: format!("{key_env} is not set in the environment"),
            })?;
        Ok(Self::new(api_key, model))
    }
}

/// Text-embedding client for the Google Generative AI `embedContent` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleEmbeddings {
    config: GoogleConfig,
    url: String,
    client: reqwest::Client,
}

impl GoogleEmbeddings {
    /// Validates the configuration and builds the HTTP transport.
    pub fn new(config: GoogleConfig) -> Result<Self, ChainError> {
        let provider = Provider::Google;
        if config.api_key.trim().is_empty() {
            return Err(ChainError::BackendUnavailable {
                provider,
                reason: "API key is empty".to_string(),
            });
        }
        let client = transport::build_client(config.timeout_secs).map_err(|source| {
            ChainError::BackendUnavailable {
                provider,
                reason: format!("failed to build HTTP client: {source}"),
            }
        })?;
        let url = embed_content_url(&config.model);
        Ok(Self {
            config,
            url,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: ContentPayload<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimensionality: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ContentPayload<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingPayload,
}

#[derive(Debug, Deserialize)]
struct EmbeddingPayload {
    values: Vec<f64>,
}

impl<'a> EmbedContentRequest<'a> {
    fn new(config: &GoogleConfig, text: &'a str) -> Self {
        Self {
            model: format!("models/{}", config.model),
            content: ContentPayload {
                parts: vec![TextPart { text }],
            },
            output_dimensionality: config.dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingBackend for GoogleEmbeddings {
    async fn embed(&self, text: &str) -> Result<EmbeddingResult, ChainError> {
        let provider = Provider::Google;
        let payload = EmbedContentRequest::new(&self.config, text);

        let response = transport::post_json(
            &self.client,
            &self.url,
            RequestAuth::GoogleApiKey(&self.config.api_key),
            &payload,
        )
        .await
        .map_err(|failure| ChainError::BackendCall { provider, failure })?;

        let body: EmbedContentResponse =
            response.json().await.map_err(|source| ChainError::BackendCall {
                provider,
                failure: CallFailure::Request(source),
            })?;

        if body.embedding.values.is_empty() {
            return Err(ChainError::BackendCall {
                provider,
                failure: CallFailure::MalformedResponse(
                    "response did not contain embedding values".to_string(),
                ),
            });
        }

        Ok(EmbeddingResult {
            values: body.embedding.values,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        EmbedContentRequest, EmbedContentResponse, GoogleConfig, GoogleEmbeddings,
        embed_content_url,
    };
    use crate::chain::error::ChainError;

    #[test]
    fn empty_api_key_fails_construction() {
        let err = GoogleEmbeddings::new(GoogleConfig::new("", "gemini-embedding-001"))
            .expect_err("blank key should be rejected");
        match err {
            ChainError::BackendUnavailable { .. } => {}
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn embed_url_contains_the_model_id() {
        assert_eq!(
            embed_content_url("gemini-embedding-001"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-embedding-001:embedContent"
        );
    }

    #[test]
    fn request_payload_matches_embed_content_wire_format() {
        let mut config = GoogleConfig::new("key", "gemini-embedding-001");
        config.dimensions = Some(768);
        let payload = EmbedContentRequest::new(&config, "Delhi is the capital of India");

        let value = serde_json::to_value(&payload).expect("payload should serialize");
        assert_eq!(
            value,
            json!({
                "model": "models/gemini-embedding-001",
                "content": {"parts": [{"text": "Delhi is the capital of India"}]},
                "outputDimensionality": 768
            })
        );
    }

    #[test]
    fn dimensionality_is_omitted_when_unset() {
        let config = GoogleConfig::new("key", "gemini-embedding-001");
        let payload = EmbedContentRequest::new(&config, "text");
        let value = serde_json::to_value(&payload).expect("payload should serialize");
        assert!(value.get("outputDimensionality").is_none());
    }

    #[test]
    fn response_payload_decodes_vector_values() {
        let raw = json!({"embedding": {"values": [0.25, -0.5, 0.125]}});
        let body: EmbedContentResponse = serde_json::from_value(raw).expect("should decode");
        assert_eq!(body.embedding.values, vec![0.25, -0.5, 0.125]);
    }
}
