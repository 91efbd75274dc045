// Clients for the hosted language services

mod knowledge;
mod language;
mod prediction;
mod translator;

pub use knowledge::{KbAnswer, QnaClient};
pub use language::{DetectedLanguage, TextAnalyticsClient};
pub use prediction::{EntityExtraction, LuisClient, Prediction, extract_entities};
pub use translator::TranslatorClient;

use crate::config::Settings;
use crate::error::{ConfigError, Service, ServiceError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Identifies the language a piece of text is written in
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Result<DetectedLanguage, ServiceError>;
}

/// Translates text between two ISO 639-1 languages
#[async_trait]
pub trait TextTranslator: Send + Sync {
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, ServiceError>;
}

/// Classifies an utterance into an intent and extracts entities
#[async_trait]
pub trait IntentPredictor: Send + Sync {
    async fn predict(&self, text: &str, slot: &str) -> Result<Prediction, ServiceError>;
}

/// Looks up the best answer for a question
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn answer(&self, question: &str) -> Result<KbAnswer, ServiceError>;
}

/// One long-lived client per remote service
#[derive(Clone)]
pub struct Services {
    pub detector: Arc<dyn LanguageDetector>,
    pub translator: Arc<dyn TextTranslator>,
    pub predictor: Arc<dyn IntentPredictor>,
    pub knowledge: Arc<dyn KnowledgeBase>,
}

impl Services {
    /// Build the HTTP clients from validated settings
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            detector: Arc::new(TextAnalyticsClient::new(
                &settings.cog_ser_endpoint,
                &settings.cog_ser_key,
            )?),
            translator: Arc::new(TranslatorClient::new(
                &settings.translator_endpoint,
                &settings.translator_key,
                &settings.location,
            )?),
            predictor: Arc::new(LuisClient::new(
                &settings.luis_endpoint,
                &settings.luis_key,
                settings.luis_app_id()?,
            )?),
            knowledge: Arc::new(QnaClient::new(
                &settings.querying_url,
                &settings.primary_query_endpoint_key,
                &settings.kb_id,
            )?),
        })
    }
}

pub(crate) fn http_client() -> Result<reqwest::Client, ConfigError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("kustbot/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Send a request and decode a JSON body, mapping transport, status and
/// shape failures onto [`ServiceError`].
pub(crate) async fn send_json<T: DeserializeOwned>(
    service: Service,
    request: reqwest::RequestBuilder,
) -> Result<T, ServiceError> {
    let started = Instant::now();
    let response = request
        .send()
        .await
        .map_err(|source| ServiceError::Network { service, source })?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|source| ServiceError::Network { service, source })?;

    debug!(
        %service,
        %status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "service call completed"
    );

    if !status.is_success() {
        return Err(ServiceError::Status {
            service,
            status,
            body: text,
        });
    }

    serde_json::from_str(&text).map_err(|e| ServiceError::parse(service, e.to_string()))
}
