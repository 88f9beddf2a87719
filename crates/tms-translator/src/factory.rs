use std::fmt;
use std::str::FromStr;

use tms_config::translator::ProviderConfig;
use tms_config::{Config, DEEPL_AUTH_KEY, GOOGLE_TRANSLATE_API_KEY};

use crate::error::ConfigurationError;
use crate::{DeepLTranslator, GoogleTranslator, Translator};

/// Available translation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    DeepL,
    Google,
}

impl ProviderKind {
    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::DeepL, ProviderKind::Google]
    }

    /// Name shown to users and stored with each record
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::DeepL => "DeepL",
            ProviderKind::Google => "Google Translate",
        }
    }

    /// Environment variable holding this provider's credential
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            ProviderKind::DeepL => DEEPL_AUTH_KEY,
            ProviderKind::Google => GOOGLE_TRANSLATE_API_KEY,
        }
    }

    /// This provider's section of the application config
    pub fn config<'a>(&self, config: &'a Config) -> &'a ProviderConfig {
        match self {
            ProviderKind::DeepL => &config.deepl,
            ProviderKind::Google => &config.google,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deepl" => Ok(ProviderKind::DeepL),
            "google" | "google translate" | "google-translate" => Ok(ProviderKind::Google),
            _ => Err(ConfigurationError::UnknownProvider(s.to_string())),
        }
    }
}

/// Construct the provider for `kind`, failing if its credential is missing
pub fn create_translator(
    kind: ProviderKind,
    config: &ProviderConfig,
) -> Result<Box<dyn Translator>, ConfigurationError> {
    if !config.has_credential() {
        return Err(ConfigurationError::MissingCredential {
            provider: kind.display_name(),
            env_var: kind.credential_env_var(),
        });
    }

    tracing::debug!(
        "Creating {} translator (timeout {}s, {} retries)",
        kind,
        config.timeout_seconds,
        config.max_retries
    );

    let translator: Box<dyn Translator> = match kind {
        ProviderKind::DeepL => Box::new(DeepLTranslator::new(config)?),
        ProviderKind::Google => Box::new(GoogleTranslator::new(config)?),
    };

    Ok(translator)
}
