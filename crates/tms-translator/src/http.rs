use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tms_config::translator::ProviderConfig;

use crate::error::{ConfigurationError, ProviderError};

/// Shared request settings for one provider instance
#[derive(Clone)]
pub(crate) struct HttpTransport {
    pub(crate) client: reqwest::Client,
    max_retries: u32,
}

impl HttpTransport {
    pub(crate) fn new(config: &ProviderConfig) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("tms/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ConfigurationError::HttpClient)?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
        })
    }

    /// Build and send a request, re-building and re-sending right away on
    /// connect or timeout failures up to `max_retries` times. The response
    /// body is returned as text.
    pub(crate) async fn send<F>(&self, build: F) -> Result<(StatusCode, String), ProviderError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            match build().send().await {
                Ok(response) => return read_body(response).await,
                Err(e) if attempt < self.max_retries && (e.is_connect() || e.is_timeout()) => {
                    attempt += 1;
                    tracing::warn!(
                        "request failed ({}), retry {}/{}",
                        e.without_url(),
                        attempt,
                        self.max_retries
                    );
                }
                Err(e) => return Err(network_error(e)),
            }
        }
    }
}

/// Errors never carry the request URL
fn network_error(e: reqwest::Error) -> ProviderError {
    ProviderError::NetworkError(e.without_url())
}

async fn read_body(response: Response) -> Result<(StatusCode, String), ProviderError> {
    let status = response.status();
    let body = response.text().await.map_err(network_error)?;
    tracing::debug!("HTTP {} ({} bytes)", status, body.len());
    Ok((status, body))
}

#[derive(Deserialize)]
struct FlatError {
    message: Option<String>,
}

#[derive(Deserialize)]
struct NestedError {
    error: Option<FlatError>,
}

/// Pull a human-readable message out of an error body, if there is one
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(NestedError { error: Some(FlatError { message: Some(m) }) }) =
        serde_json::from_str(body)
    {
        return m;
    }
    if let Ok(FlatError { message: Some(m) }) = serde_json::from_str(body) {
        return m;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Unknown error".to_string()
    } else {
        trimmed.to_string()
    }
}
