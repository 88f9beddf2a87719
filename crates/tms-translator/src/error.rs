/// Failure while talking to an upstream translation service
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Authentication error")]
    AuthenticationError,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Quota exceeded")]
    QuotaExceeded,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Could not detect source language: {0}")]
    DetectionFailed(String),
}

/// Failure while constructing a provider
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{provider} credential missing, set {env_var}")]
    MissingCredential {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("Unsupported provider: {0}. Available: DeepL, Google Translate")]
    UnknownProvider(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
