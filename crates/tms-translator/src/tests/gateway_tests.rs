use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{
    AlternativesSupport, LanguageCatalog, LanguageCode, ProviderError, Translator,
    format_alternatives_note,
};

/// Scripted provider: pops one reply per translate call, then repeats `fallback`
struct ScriptedTranslator {
    detected: Result<&'static str, &'static str>,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: &'static str,
    support: AlternativesSupport,
    detect_calls: AtomicUsize,
    translate_calls: AtomicUsize,
    last_source: Mutex<Option<String>>,
}

impl ScriptedTranslator {
    fn new(detected: &'static str, fallback: &'static str) -> Self {
        Self {
            detected: Ok(detected),
            replies: Mutex::new(VecDeque::new()),
            fallback,
            support: AlternativesSupport::Native,
            detect_calls: AtomicUsize::new(0),
            translate_calls: AtomicUsize::new(0),
            last_source: Mutex::new(None),
        }
    }

    fn failing_detection(mut self, message: &'static str) -> Self {
        self.detected = Err(message);
        self
    }

    fn unsupported(mut self, placeholder: &'static str) -> Self {
        self.support = AlternativesSupport::Unsupported(placeholder);
        self
    }

    fn reply(self, reply: Result<&str, ProviderError>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(reply.map(str::to_string));
        self
    }

    fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }

    fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for ScriptedTranslator {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn source_languages(&self) -> Result<LanguageCatalog, ProviderError> {
        Ok(LanguageCatalog::new())
    }

    async fn target_languages(&self) -> Result<LanguageCatalog, ProviderError> {
        Ok(LanguageCatalog::new())
    }

    async fn detect_language(&self, _text: &str) -> Result<LanguageCode, ProviderError> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        match self.detected {
            Ok(code) => Ok(code.to_string()),
            Err(message) => Err(ProviderError::ApiError(message.to_string())),
        }
    }

    async fn translate_text(
        &self,
        _text: &str,
        _target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<String, ProviderError> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_source.lock().unwrap() = source_lang.map(str::to_string);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.to_string()))
    }

    fn alternatives_support(&self) -> AlternativesSupport {
        self.support
    }
}

#[tokio::test]
async fn test_auto_source_is_resolved_by_detection() {
    let translator = ScriptedTranslator::new("DE", "Hello");

    let outcome = translator.translate("Hallo", "EN-US", "auto").await.unwrap();

    assert_eq!(outcome.source_lang, "DE");
    assert_ne!(outcome.source_lang, "auto");
    assert_eq!(translator.detect_calls(), 1);
}

#[tokio::test]
async fn test_detected_code_is_passed_to_translation() {
    let translator = ScriptedTranslator::new("FR", "Hello").reply(Ok("Good morning"));

    let outcome = translator
        .translate_with_alternatives("Bonjour", "EN-GB", "auto", 0)
        .await
        .unwrap();

    assert_eq!(outcome.text, "Good morning");
    assert_eq!(
        translator.last_source.lock().unwrap().as_deref(),
        Some("FR")
    );
    assert_eq!(translator.translate_calls(), 1);
}

#[tokio::test]
async fn test_explicit_source_skips_detection() {
    let translator = ScriptedTranslator::new("DE", "Bonjour");

    let outcome = translator.translate("Hello", "FR", "EN").await.unwrap();

    assert_eq!(outcome.source_lang, "EN");
    assert_eq!(translator.detect_calls(), 0);
}

#[tokio::test]
async fn test_explicit_source_is_passed_through_as_given() {
    let translator = ScriptedTranslator::new("DE", "Bonjour");

    let outcome = translator.translate("Hello", "FR", "en-GB ").await.unwrap();

    assert_eq!(outcome.source_lang, "en-GB ");
    assert_eq!(
        translator.last_source.lock().unwrap().as_deref(),
        Some("en-GB ")
    );
}

#[tokio::test]
async fn test_empty_source_counts_as_auto() {
    let translator = ScriptedTranslator::new("JA", "Hello");

    let outcome = translator.translate("こんにちは", "EN-US", "").await.unwrap();

    assert_eq!(outcome.source_lang, "JA");
    assert_eq!(translator.detect_calls(), 1);
}

#[tokio::test]
async fn test_undefined_detection_aborts_before_translating() {
    let translator = ScriptedTranslator::new("und", "Hello");

    let err = translator.translate("???", "EN-US", "auto").await.unwrap_err();

    assert!(matches!(err, ProviderError::DetectionFailed(_)));
    assert_eq!(translator.translate_calls(), 0);
}

#[tokio::test]
async fn test_detection_failure_is_surfaced() {
    let translator = ScriptedTranslator::new("EN", "Hello").failing_detection("quota");

    let err = translator.translate("Hallo", "EN-US", "auto").await.unwrap_err();

    assert!(matches!(err, ProviderError::ApiError(ref m) if m == "quota"));
    assert_eq!(translator.translate_calls(), 0);
}

#[tokio::test]
async fn test_translation_failure_is_surfaced() {
    let translator = ScriptedTranslator::new("EN", "Hello")
        .reply(Err(ProviderError::AuthenticationError));

    let err = translator.translate("Hello", "FR", "EN").await.unwrap_err();

    assert!(matches!(err, ProviderError::AuthenticationError));
}

#[tokio::test]
async fn test_alternatives_are_distinct_and_ordered() {
    let translator = ScriptedTranslator::new("EN", "unused")
        .reply(Ok("Salut"))
        .reply(Ok("Bonjour"))
        .reply(Ok("Salut"))
        .reply(Ok("Coucou"));

    let alternatives = translator.get_alternatives("Hi", "FR", 4).await;

    assert_eq!(alternatives, vec!["Salut", "Bonjour", "Coucou"]);
    assert_eq!(translator.translate_calls(), 4);
}

#[tokio::test]
async fn test_alternatives_swallow_upstream_errors() {
    let translator = ScriptedTranslator::new("EN", "unused")
        .reply(Ok("Salut"))
        .reply(Err(ProviderError::RateLimitExceeded));

    let alternatives = translator.get_alternatives("Hi", "FR", 3).await;

    assert!(alternatives.is_empty());
}

#[tokio::test]
async fn test_huge_alternative_count_does_not_panic() {
    let translator =
        ScriptedTranslator::new("EN", "unused").reply(Err(ProviderError::RateLimitExceeded));

    let alternatives = translator.get_alternatives("hi", "fr", usize::MAX).await;

    assert!(alternatives.is_empty());
    assert_eq!(translator.translate_calls(), 1);
}

#[tokio::test]
async fn test_unsupported_alternatives_make_no_calls() {
    let translator = ScriptedTranslator::new("EN", "Bonjour").unsupported("not supported");

    assert!(translator.get_alternatives("Hi", "FR", 3).await.is_empty());
    assert_eq!(translator.translate_calls(), 0);

    let outcome = translator.translate("Hi", "FR", "EN").await.unwrap();
    assert_eq!(outcome.alternatives_note, "not supported");
    assert_eq!(translator.translate_calls(), 1);
}

#[tokio::test]
async fn test_note_excludes_primary_translation() {
    let translator = ScriptedTranslator::new("EN", "Bonjour")
        .reply(Ok("Bonjour"))
        .reply(Ok("Bonjour"))
        .reply(Ok("Salut"));

    let outcome = translator.translate("Hello", "FR", "EN").await.unwrap();

    assert_eq!(outcome.text, "Bonjour");
    assert_eq!(outcome.alternatives_note, "Alternative translations:\n• Salut");
}

#[tokio::test]
async fn test_note_is_empty_when_alternatives_match_primary() {
    let translator = ScriptedTranslator::new("EN", "Bonjour");

    let outcome = translator.translate("Hello", "FR", "EN").await.unwrap();

    assert_eq!(outcome.alternatives_note, "");
}

#[tokio::test]
async fn test_failed_alternatives_do_not_fail_translation() {
    let translator = ScriptedTranslator::new("EN", "unused")
        .reply(Ok("Bonjour"))
        .reply(Err(ProviderError::QuotaExceeded));

    let outcome = translator.translate("Hello", "FR", "EN").await.unwrap();

    assert_eq!(outcome.text, "Bonjour");
    assert_eq!(outcome.alternatives_note, "");
}

#[test]
fn test_format_alternatives_note() {
    assert_eq!(format_alternatives_note(&[]), "");
    assert_eq!(
        format_alternatives_note(&["a".to_string(), "b".to_string()]),
        "Alternative translations:\n• a\n• b"
    );
}
