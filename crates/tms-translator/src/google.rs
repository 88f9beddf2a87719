use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tms_config::translator::ProviderConfig;

use crate::error::{ConfigurationError, ProviderError};
use crate::http::{HttpTransport, error_message};
use crate::{AlternativesSupport, LanguageCatalog, LanguageCode, Translator};

const API_URL: &str = "https://translation.googleapis.com/language/translate/v2";

/// Sent as a header so the key never appears in request URLs
const API_KEY_HEADER: &str = "X-Goog-Api-Key";

const NO_ALTERNATIVES: &str = "Alternative translations not supported by Google Translate API v2.";

/// Google Cloud Translation (v2 REST, API key)
#[derive(Clone)]
pub struct GoogleTranslator {
    http: HttpTransport,
    api_key: String,
    api_url: String,
}

impl GoogleTranslator {
    pub fn new(config: &ProviderConfig) -> Result<Self, ConfigurationError> {
        let api_url = config.api_url.clone().unwrap_or_else(|| API_URL.to_string());

        Ok(Self {
            http: HttpTransport::new(config)?,
            api_key: config.api_key.trim().to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// v2 reports one shared list for both directions
    async fn languages(&self) -> Result<LanguageCatalog, ProviderError> {
        let url = format!("{}/languages", self.api_url);
        let request = || {
            self.http
                .client
                .get(&url)
                .header(API_KEY_HEADER, self.api_key.as_str())
                .query(&[("target", "en")])
        };

        let (status, body) = self.http.send(request).await?;
        check_status(status, &body)?;
        parse_languages(&body)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "Google Translate"
    }

    async fn source_languages(&self) -> Result<LanguageCatalog, ProviderError> {
        self.languages().await
    }

    async fn target_languages(&self) -> Result<LanguageCatalog, ProviderError> {
        self.languages().await
    }

    async fn detect_language(&self, text: &str) -> Result<LanguageCode, ProviderError> {
        let url = format!("{}/detect", self.api_url);
        let request = || {
            self.http
                .client
                .post(&url)
                .header(API_KEY_HEADER, self.api_key.as_str())
                .form(&[("q", text)])
        };

        let (status, body) = self.http.send(request).await?;
        check_status(status, &body)?;
        parse_detection(&body)
    }

    async fn translate_text(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<String, ProviderError> {
        let mut params = vec![("q", text), ("target", target_lang), ("format", "text")];
        if let Some(source) = source_lang {
            params.push(("source", source));
        }

        let request = || {
            self.http
                .client
                .post(&self.api_url)
                .header(API_KEY_HEADER, self.api_key.as_str())
                .form(&params)
        };

        let (status, body) = self.http.send(request).await?;
        check_status(status, &body)?;
        parse_translation(&body)
    }

    fn alternatives_support(&self) -> AlternativesSupport {
        AlternativesSupport::Unsupported(NO_ALTERNATIVES)
    }
}

fn check_status(status: StatusCode, body: &str) -> Result<(), ProviderError> {
    match status.as_u16() {
        200..=299 => Ok(()),
        401 | 403 => Err(ProviderError::AuthenticationError),
        429 => Err(ProviderError::RateLimitExceeded),
        _ => Err(ProviderError::ApiError(format!(
            "HTTP {}: {}",
            status,
            error_message(body)
        ))),
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct LanguagesData {
    languages: Vec<GoogleLanguage>,
}

#[derive(Deserialize)]
struct GoogleLanguage {
    language: String,
    name: Option<String>,
}

#[derive(Deserialize)]
struct DetectionsData {
    detections: Vec<Vec<Detection>>,
}

#[derive(Deserialize)]
struct Detection {
    language: String,
}

#[derive(Deserialize)]
struct TranslationsData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleTranslation {
    translated_text: String,
}

fn malformed(what: &str, e: serde_json::Error) -> ProviderError {
    ProviderError::MalformedResponse(format!("{}: {}", what, e))
}

fn parse_languages(body: &str) -> Result<LanguageCatalog, ProviderError> {
    let envelope: Envelope<LanguagesData> =
        serde_json::from_str(body).map_err(|e| malformed("languages", e))?;

    Ok(envelope
        .data
        .languages
        .into_iter()
        .map(|lang| {
            let name = lang.name.unwrap_or_else(|| lang.language.clone());
            (lang.language, name)
        })
        .collect())
}

fn parse_detection(body: &str) -> Result<LanguageCode, ProviderError> {
    let envelope: Envelope<DetectionsData> =
        serde_json::from_str(body).map_err(|e| malformed("detect", e))?;

    let language = envelope
        .data
        .detections
        .into_iter()
        .next()
        .and_then(|candidates| candidates.into_iter().next())
        .map(|detection| detection.language)
        .ok_or_else(|| ProviderError::MalformedResponse("No detection in response".to_string()))?;

    // "und" is Google's undefined-language answer
    if language == "und" {
        return Err(ProviderError::DetectionFailed(
            "Google could not reliably detect the source language".to_string(),
        ));
    }

    Ok(language)
}

fn parse_translation(body: &str) -> Result<String, ProviderError> {
    let envelope: Envelope<TranslationsData> =
        serde_json::from_str(body).map_err(|e| malformed("translate", e))?;

    envelope
        .data
        .translations
        .into_iter()
        .next()
        .map(|t| t.translated_text)
        .ok_or_else(|| ProviderError::MalformedResponse("No translation in response".to_string()))
}
