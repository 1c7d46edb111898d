use std::time::Duration;

use serde::Serialize;

use crate::chain::error::CallFailure;

/// Authentication scheme attached to an outbound request.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RequestAuth<'a> {
    /// `Authorization: Bearer <token>`.
    Bearer(&'a str),
    /// `x-goog-api-key: <key>` header used by Google Generative AI.
    GoogleApiKey(&'a str),
}

/// Builds the HTTP client with the single bounded wait applied to every call.
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Sends one JSON POST and maps failures into [`CallFailure`].
///
/// Exactly one request is sent; non-success statuses and transport errors
/// are reported to the caller without any retry.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    auth: RequestAuth<'_>,
    payload: &T,
) -> Result<reqwest::Response, CallFailure> {
    let request = client.post(url).json(payload);
    let request = match auth {
        RequestAuth::Bearer(token) => request.bearer_auth(token),
        RequestAuth::GoogleApiKey(key) => request.header("x-goog-api-key", key),
    };

    match request.send().await {
        Ok(response) => {
            if response.status().is_success() {
                return Ok(response);
            }
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(CallFailure::Api { status, body })
        }
        Err(source) => Err(CallFailure::Request(source)),
    }
}
