// Language detection via the text analytics REST API

use super::{LanguageDetector, http_client, send_json};
use crate::config::endpoint_url;
use crate::error::{ConfigError, Service, ServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const LANGUAGES_ROUTE: &str = "text/analytics/v3.1/languages";

/// Code the service returns when it cannot tell the language
const UNKNOWN_LANGUAGE: &str = "(Unknown)";

/// Best-guess language of a piece of text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedLanguage {
    pub name: String,
    /// ISO 639-1 code
    pub iso6391_name: String,
    pub confidence_score: f64,
}

impl DetectedLanguage {
    pub fn new(name: impl Into<String>, code: impl Into<String>, confidence_score: f64) -> Self {
        Self {
            name: name.into(),
            iso6391_name: code.into(),
            confidence_score,
        }
    }

    pub fn code(&self) -> &str {
        &self.iso6391_name
    }
}

pub struct TextAnalyticsClient {
    client: reqwest::Client,
    endpoint: String,
    key: String,
}

impl TextAnalyticsClient {
    pub fn new(endpoint: &str, key: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client()?,
            endpoint: endpoint.to_string(),
            key: key.to_string(),
        })
    }
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    documents: Vec<Document<'a>>,
}

#[derive(Serialize)]
struct Document<'a> {
    id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectResponse {
    #[serde(default)]
    documents: Vec<DocumentResult>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentResult {
    detected_language: DetectedLanguage,
}

#[derive(Deserialize)]
struct DocumentError {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

fn detected_language(response: DetectResponse) -> Result<DetectedLanguage, ServiceError> {
    if let Some(failure) = response.errors.into_iter().next() {
        return Err(ServiceError::Detection(format!(
            "{} ({})",
            failure.error.message, failure.error.code
        )));
    }

    let language = response
        .documents
        .into_iter()
        .next()
        .map(|d| d.detected_language)
        .ok_or_else(|| ServiceError::parse(Service::LanguageDetection, "no documents in response"))?;

    if language.iso6391_name == UNKNOWN_LANGUAGE || language.iso6391_name.is_empty() {
        return Err(ServiceError::Detection(
            "could not determine the language of the input".to_string(),
        ));
    }

    Ok(language)
}

#[async_trait]
impl LanguageDetector for TextAnalyticsClient {
    async fn detect(&self, text: &str) -> Result<DetectedLanguage, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::EmptyInput);
        }

        let request = self
            .client
            .post(endpoint_url(&self.endpoint, LANGUAGES_ROUTE))
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(&DetectRequest {
                documents: vec![Document { id: "1", text }],
            });

        let response: DetectResponse = send_json(Service::LanguageDetection, request).await?;
        detected_language(response)
    }
}
