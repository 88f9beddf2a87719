use anyhow::bail;
use tms_store::NewTranslation;
use tms_translator::{
    LanguageCatalog, ProviderError, TranslationOutcome, Translator, default_source_index,
    default_target_language, is_auto, source_language_options,
};

/// Per-session state owned by the front end: the active provider, its
/// catalogs, and what the last translation left behind for saving.
pub struct Session {
    project: String,
    translator: Box<dyn Translator>,
    source_languages: LanguageCatalog,
    target_languages: LanguageCatalog,
    alternatives: usize,

    last_detected: Option<String>,
    pending_note: String,
    last_translation: Option<TranslationOutcome>,
}

impl Session {
    /// Bind `translator` to `project` and fetch its language catalogs
    pub async fn start(
        project: impl Into<String>,
        translator: Box<dyn Translator>,
        alternatives: usize,
    ) -> Result<Self, ProviderError> {
        let source_languages = translator.source_languages().await?;
        let target_languages = translator.target_languages().await?;
        tracing::debug!(
            "[{}] {} source / {} target languages",
            translator.name(),
            source_languages.len(),
            target_languages.len()
        );

        Ok(Self {
            project: project.into(),
            translator,
            source_languages,
            target_languages,
            alternatives,
            last_detected: None,
            pending_note: String::new(),
            last_translation: None,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn provider_name(&self) -> &str {
        self.translator.name()
    }

    pub fn source_languages(&self) -> &LanguageCatalog {
        &self.source_languages
    }

    pub fn target_languages(&self) -> &LanguageCatalog {
        &self.target_languages
    }

    pub fn default_target(&self) -> Option<&str> {
        default_target_language(&self.target_languages)
    }

    pub fn default_source(&self) -> &str {
        let options = source_language_options(&self.source_languages);
        let index = default_source_index(&self.source_languages);
        options.get(index).copied().unwrap_or(tms_translator::AUTO)
    }

    pub fn last_detected(&self) -> Option<&str> {
        self.last_detected.as_deref()
    }

    pub fn pending_note(&self) -> &str {
        &self.pending_note
    }

    pub async fn translate(
        &mut self,
        text: &str,
        target_lang: &str,
        source_lang: &str,
    ) -> Result<&TranslationOutcome, ProviderError> {
        let outcome = self
            .translator
            .translate_with_alternatives(text, target_lang, source_lang, self.alternatives)
            .await?;

        if is_auto(source_lang) {
            tracing::info!(
                "Detected source language: {}",
                self.source_languages.display_name(&outcome.source_lang)
            );
        }

        self.last_detected = Some(outcome.source_lang.clone());
        self.pending_note = outcome.alternatives_note.clone();
        Ok(self.last_translation.insert(outcome))
    }

    /// Source code to store: the explicit choice, or the one detected by the
    /// last translation. Never the auto sentinel.
    pub fn resolved_source_lang(&self, requested: &str) -> Option<String> {
        if is_auto(requested) {
            self.last_detected.clone()
        } else {
            Some(requested.to_string())
        }
    }

    /// Build the insert payload for the reviewed translation.
    ///
    /// `note` falls back to the pending alternatives note; an empty note is
    /// stored as NULL.
    pub fn prepare_record(
        &self,
        source_text: &str,
        translated_text: &str,
        source_lang: &str,
        target_lang: &str,
        note: Option<&str>,
    ) -> anyhow::Result<NewTranslation> {
        if source_text.trim().is_empty() || translated_text.trim().is_empty() {
            bail!("Please provide both source and target text");
        }

        let Some(source_lang) = self.resolved_source_lang(source_lang) else {
            bail!("Could not determine source language, select it explicitly or translate first");
        };

        let note = note.unwrap_or(&self.pending_note);

        Ok(NewTranslation {
            project: self.project.clone(),
            provider: self.provider_name().to_string(),
            source_text: source_text.to_string(),
            target_text: Some(translated_text.to_string()),
            source_lang: Some(source_lang),
            target_lang: Some(target_lang.to_string()),
            note: (!note.is_empty()).then(|| note.to_string()),
            user: None,
        })
    }
}
