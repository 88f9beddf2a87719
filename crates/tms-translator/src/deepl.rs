use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tms_config::translator::ProviderConfig;

use crate::error::{ConfigurationError, ProviderError};
use crate::http::{HttpTransport, error_message};
use crate::{LanguageCatalog, LanguageCode, Translator};

const FREE_API_URL: &str = "https://api-free.deepl.com/v2";
const PRO_API_URL: &str = "https://api.deepl.com/v2";

/// Target used for the detection call; only the detected source is read back
const DETECTION_PIVOT: &str = "EN-US";

/// DeepL has no detection endpoint, so detection is a pivot translation
#[derive(Clone)]
pub struct DeepLTranslator {
    http: HttpTransport,
    api_key: String,
    api_url: String,
}

impl DeepLTranslator {
    pub fn new(config: &ProviderConfig) -> Result<Self, ConfigurationError> {
        let api_key = config.api_key.trim().to_string();
        let api_url = config
            .api_url
            .clone()
            .unwrap_or_else(|| default_api_url(&api_key).to_string());

        Ok(Self {
            http: HttpTransport::new(config)?,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn languages(&self, kind: &str) -> Result<LanguageCatalog, ProviderError> {
        let url = format!("{}/languages", self.api_url);
        let request = || {
            self.http
                .client
                .get(&url)
                .header("Authorization", self.auth_header())
                .query(&[("type", kind)])
        };

        let (status, body) = self.http.send(request).await?;
        check_status(status, &body)?;
        parse_languages(&body)
    }

    async fn translate_request(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<DeepLTranslation, ProviderError> {
        let mut params = vec![("text", text), ("target_lang", target_lang)];
        if let Some(source) = source_lang {
            params.push(("source_lang", source));
        }

        let url = format!("{}/translate", self.api_url);
        let request = || {
            self.http
                .client
                .post(&url)
                .header("Authorization", self.auth_header())
                .form(&params)
        };

        let (status, body) = self.http.send(request).await?;
        check_status(status, &body)?;
        parse_translation(&body)
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }
}

#[async_trait]
impl Translator for DeepLTranslator {
    fn name(&self) -> &str {
        "DeepL"
    }

    async fn source_languages(&self) -> Result<LanguageCatalog, ProviderError> {
        self.languages("source").await
    }

    async fn target_languages(&self) -> Result<LanguageCatalog, ProviderError> {
        self.languages("target").await
    }

    async fn detect_language(&self, text: &str) -> Result<LanguageCode, ProviderError> {
        let result = self.translate_request(text, DETECTION_PIVOT, None).await?;

        result.detected_source_language.ok_or_else(|| {
            ProviderError::MalformedResponse("No detected_source_language in response".to_string())
        })
    }

    async fn translate_text(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<String, ProviderError> {
        let result = self.translate_request(text, target_lang, source_lang).await?;
        Ok(result.text)
    }
}

/// Free-tier keys end in `:fx` and are only accepted by the free endpoint
fn default_api_url(api_key: &str) -> &'static str {
    if api_key.ends_with(":fx") {
        FREE_API_URL
    } else {
        PRO_API_URL
    }
}

fn check_status(status: StatusCode, body: &str) -> Result<(), ProviderError> {
    match status.as_u16() {
        200..=299 => Ok(()),
        403 => Err(ProviderError::AuthenticationError),
        429 => Err(ProviderError::RateLimitExceeded),
        456 => Err(ProviderError::QuotaExceeded),
        _ => Err(ProviderError::ApiError(format!(
            "HTTP {}: {}",
            status,
            error_message(body)
        ))),
    }
}

#[derive(Deserialize)]
struct DeepLLanguage {
    language: String,
    name: String,
}

#[derive(Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
    detected_source_language: Option<String>,
}

fn parse_languages(body: &str) -> Result<LanguageCatalog, ProviderError> {
    let languages: Vec<DeepLLanguage> = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("languages: {}", e)))?;

    Ok(languages
        .into_iter()
        .map(|lang| (lang.language, lang.name))
        .collect())
}

fn parse_translation(body: &str) -> Result<DeepLTranslation, ProviderError> {
    let response: DeepLResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("translate: {}", e)))?;

    response
        .translations
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedResponse("No translation in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_follows_key_tier() {
        assert_eq!(default_api_url("0000-1111:fx"), FREE_API_URL);
        assert_eq!(default_api_url("0000-1111"), PRO_API_URL);
    }

    #[test]
    fn test_explicit_url_wins() {
        let config = ProviderConfig {
            api_key: "key:fx".to_string(),
            api_url: Some("http://localhost:9000/v2/".to_string()),
            ..ProviderConfig::default()
        };
        let translator = DeepLTranslator::new(&config).unwrap();
        assert_eq!(translator.api_url, "http://localhost:9000/v2");
        assert_eq!(translator.auth_header(), "DeepL-Auth-Key key:fx");
    }

    #[test]
    fn test_parse_languages() {
        let body = r#"[
            {"language": "EN-GB", "name": "English (British)", "supports_formality": false},
            {"language": "ZH-HANS", "name": "Chinese (simplified)", "supports_formality": false}
        ]"#;
        let catalog = parse_languages(body).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("ZH-HANS"), Some("Chinese (simplified)"));
    }

    #[test]
    fn test_parse_translation_with_detection() {
        let body = r#"{"translations":[{"detected_source_language":"DE","text":"Hello"}]}"#;
        let result = parse_translation(body).unwrap();
        assert_eq!(result.text, "Hello");
        assert_eq!(result.detected_source_language.as_deref(), Some("DE"));
    }

    #[test]
    fn test_parse_translation_rejects_empty_list() {
        let err = parse_translation(r#"{"translations":[]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));

        let err = parse_translation("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn test_status_mapping() {
        assert!(check_status(StatusCode::OK, "").is_ok());
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, ""),
            Err(ProviderError::AuthenticationError)
        ));
        assert!(matches!(
            check_status(StatusCode::from_u16(456).unwrap(), ""),
            Err(ProviderError::QuotaExceeded)
        ));
        match check_status(StatusCode::BAD_REQUEST, r#"{"message":"Value for 'target_lang' not supported."}"#) {
            Err(ProviderError::ApiError(msg)) => assert!(msg.contains("target_lang")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
