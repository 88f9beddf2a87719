mod catalog;
mod deepl;
mod error;
mod factory;
mod google;
mod http;

#[cfg(test)]
mod tests;

pub use catalog::{
    LanguageCatalog, default_source_index, default_target_language, source_language_options,
};
pub use deepl::DeepLTranslator;
pub use error::{ConfigurationError, ProviderError};
pub use factory::{ProviderKind, create_translator};
pub use google::GoogleTranslator;

pub type LanguageCode = String;

/// Source-language sentinel asking the provider to detect the language
pub const AUTO: &str = "auto";

/// Repeated calls spent on alternatives when the caller does not choose
pub const DEFAULT_ALTERNATIVES: usize = 3;

/// Whether a source-language argument requests detection
pub fn is_auto(source_lang: &str) -> bool {
    let source_lang = source_lang.trim();
    source_lang.is_empty() || source_lang.eq_ignore_ascii_case(AUTO)
}

/// Translation provider interface
///
/// Implementors supply the upstream primitives. `translate` and
/// `get_alternatives` carry the shared protocol: detect-then-translate for
/// `"auto"` requests, and best-effort alternative gathering that never fails.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Display name, stored as the record's provider
    fn name(&self) -> &str;

    /// Languages accepted as input. An empty catalog means only auto-detect.
    async fn source_languages(&self) -> Result<LanguageCatalog, ProviderError>;

    /// Languages accepted as output
    async fn target_languages(&self) -> Result<LanguageCatalog, ProviderError>;

    /// Detect the language of `text`
    async fn detect_language(&self, text: &str) -> Result<LanguageCode, ProviderError>;

    /// Single upstream translation call
    async fn translate_text(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<String, ProviderError>;

    fn alternatives_support(&self) -> AlternativesSupport {
        AlternativesSupport::Native
    }

    /// Translate with the default number of alternative attempts
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: &str,
    ) -> Result<TranslationOutcome, ProviderError> {
        self.translate_with_alternatives(text, target_lang, source_lang, DEFAULT_ALTERNATIVES)
            .await
    }

    /// Translate `text`, resolving `"auto"` into a detected code first.
    ///
    /// The returned `source_lang` is never the auto sentinel.
    async fn translate_with_alternatives(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: &str,
        alternatives: usize,
    ) -> Result<TranslationOutcome, ProviderError> {
        let resolved = if is_auto(source_lang) {
            tracing::debug!("[{}] detecting source language", self.name());
            let detected = self.detect_language(text).await?;
            if !is_resolved_language(&detected) {
                return Err(ProviderError::DetectionFailed(format!(
                    "{} returned '{}'",
                    self.name(),
                    detected
                )));
            }
            detected
        } else {
            source_lang.to_string()
        };

        tracing::debug!(
            "[{}] translating {} chars {} -> {}",
            self.name(),
            text.chars().count(),
            resolved,
            target_lang
        );
        let translated = self
            .translate_text(text, target_lang, Some(resolved.as_str()))
            .await?;

        let alternatives_note = match self.alternatives_support() {
            AlternativesSupport::Unsupported(placeholder) => placeholder.to_string(),
            AlternativesSupport::Native => {
                let alternatives: Vec<String> = self
                    .get_alternatives(text, target_lang, alternatives)
                    .await
                    .into_iter()
                    .filter(|alt| *alt != translated)
                    .collect();
                format_alternatives_note(&alternatives)
            }
        };

        Ok(TranslationOutcome {
            text: translated,
            source_lang: resolved,
            alternatives_note,
        })
    }

    /// Up to `count` distinct renderings from repeated translation calls.
    ///
    /// Never fails: upstream errors end up as an empty list.
    async fn get_alternatives(&self, text: &str, target_lang: &str, count: usize) -> Vec<String> {
        if let AlternativesSupport::Unsupported(_) = self.alternatives_support() {
            return Vec::new();
        }

        let mut alternatives: Vec<String> = Vec::new();
        for _ in 0..count {
            match self.translate_text(text, target_lang, None).await {
                Ok(candidate) => {
                    if !alternatives.contains(&candidate) {
                        alternatives.push(candidate);
                    }
                }
                Err(e) => {
                    tracing::warn!("[{}] alternatives unavailable: {}", self.name(), e);
                    return Vec::new();
                }
            }
        }

        alternatives
    }
}

/// Result of a full translate request
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOutcome {
    pub text: String,
    /// Code actually used as source; the detected one for auto requests
    pub source_lang: LanguageCode,
    /// Bullet list of alternatives, a provider placeholder, or empty
    pub alternatives_note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternativesSupport {
    Native,
    /// Placeholder note shown instead of alternatives
    Unsupported(&'static str),
}

/// Render alternatives as the note text stored with a record
pub fn format_alternatives_note(alternatives: &[String]) -> String {
    if alternatives.is_empty() {
        return String::new();
    }

    let bullets: Vec<String> = alternatives.iter().map(|alt| format!("• {alt}")).collect();
    format!("Alternative translations:\n{}", bullets.join("\n"))
}

fn is_resolved_language(code: &str) -> bool {
    let code = code.trim();
    !is_auto(code) && !code.eq_ignore_ascii_case("und")
}
