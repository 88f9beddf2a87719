use serde::{Deserialize, Serialize};

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    0
}

/// Connection settings for one translation provider
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    /// Opaque credential handed to the provider. Empty means unset.
    #[serde(default)]
    pub api_key: String,
    /// Overrides the provider's built-in endpoint
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Immediate re-sends on connect/timeout failures, no backoff
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl ProviderConfig {
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: None,
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
        }
    }
}
