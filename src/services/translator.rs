// Translator - REST client for the text translation service

use super::{TextTranslator, http_client, send_json};
use crate::config::endpoint_url;
use crate::error::{ConfigError, Service, ServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const API_VERSION: &str = "3.0";

pub struct TranslatorClient {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    region: String,
}

impl TranslatorClient {
    pub fn new(endpoint: &str, key: &str, region: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client()?,
            endpoint: endpoint.to_string(),
            key: key.to_string(),
            region: region.to_string(),
        })
    }
}

/// Request body element. The service expects a batch, we always send one.
#[derive(Serialize)]
struct TranslateInput<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Deserialize)]
struct TranslationResult {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
}

/// Pull the first translation out of a decoded response
fn first_translation(results: Vec<TranslationResult>) -> Result<String, ServiceError> {
    let result = results
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::parse(Service::Translation, "empty result array"))?;

    result
        .translations
        .into_iter()
        .next()
        .map(|t| t.text)
        .ok_or_else(|| ServiceError::parse(Service::Translation, "empty `translations` array"))
}

#[async_trait]
impl TextTranslator for TranslatorClient {
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, ServiceError> {
        let request = self
            .client
            .post(endpoint_url(&self.endpoint, "translate"))
            .query(&[("api-version", API_VERSION), ("from", from), ("to", to)])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Ocp-Apim-Subscription-Region", &self.region)
            .json(&[TranslateInput { text }]);

        let results: Vec<TranslationResult> = send_json(Service::Translation, request).await?;
        first_translation(results)
    }
}
