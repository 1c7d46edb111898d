use std::env;
use std::fmt;

use reqwest::StatusCode;

/// Remote hosted-model collaborators this crate talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Hugging Face router, chat completions.
    Huggingface,
    /// Google Generative AI, text embeddings.
    Google,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Huggingface => "huggingface",
            Self::Google => "google",
        }
    }

    /// Environment variable holding the provider's credential.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Huggingface => "HUGGINGFACEHUB_API_TOKEN",
            Self::Google => "GOOGLE_API_KEY",
        }
    }
}

/// Returns true when a non-empty credential is present in the environment.
pub fn is_api_key_present(provider: Provider) -> bool {
    env::var(provider.api_key_env())
        .ok()
        .is_some_and(|value| !value.trim().is_empty())
}

/// Failure surfaced by a remote collaborator during a single call.
#[derive(Debug)]
pub enum CallFailure {
    /// The request never produced an HTTP response (connect, timeout, body).
    Request(reqwest::Error),
    /// The collaborator answered with a non-success status.
    Api { status: StatusCode, body: String },
    /// The collaborator answered successfully but the payload was unusable.
    MalformedResponse(String),
}

/// Error taxonomy of the pipeline core.
///
/// All three kinds propagate to the caller unchanged; no retry or fallback
/// happens below this boundary.
#[derive(Debug)]
pub enum ChainError {
    /// A template placeholder had no matching binding at render time.
    MissingBinding { placeholder: String },
    /// The backend could not be constructed, before any network activity.
    BackendUnavailable { provider: Provider, reason: String },
    /// The outbound call to the remote collaborator failed.
    BackendCall {
        provider: Provider,
        failure: CallFailure,
    },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBinding { placeholder } => {
                write!(f, "missing binding '{placeholder}'")
            }
            Self::BackendUnavailable { provider, reason } => {
                write!(f, "{} backend unavailable: {reason}", provider.as_str())
            }
            Self::BackendCall { provider, failure } => match failure {
                CallFailure::Request(source) => {
                    write!(f, "{} request failed: {source}", provider.as_str())
                }
                CallFailure::Api { status, body } => {
                    write!(f, "{} API error {status}: {body}", provider.as_str())
                }
                CallFailure::MalformedResponse(detail) => {
                    write!(f, "{} response was malformed: {detail}", provider.as_str())
                }
            },
        }
    }
}

impl std::error::Error for ChainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BackendCall {
                failure: CallFailure::Request(source),
                ..
            } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChainError, Provider};

    #[test]
    fn missing_binding_names_the_placeholder() {
        let err = ChainError::MissingBinding {
            placeholder: "country".to_string(),
        };
        assert_eq!(err.to_string(), "missing binding 'country'");
    }

    #[test]
    fn backend_unavailable_names_the_provider() {
        let err = ChainError::BackendUnavailable {
            provider: Provider::Google,
            reason: "GOOGLE_API_KEY is not set in the environment".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("google backend unavailable"));
        assert!(text.contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn credential_env_names_match_providers() {
        assert_eq!(
            Provider::Huggingface.api_key_env(),
            "HUGGINGFACEHUB_API_TOKEN"
        );
        assert_eq!(Provider::Google.api_key_env(), "GOOGLE_API_KEY");
    }
}
