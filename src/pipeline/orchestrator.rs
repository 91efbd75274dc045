// Orchestrator - runs one input line through the hosted services

use super::types::{NO_ANSWER_REPLY, TurnState, knowledge_query};
use crate::config::{DEFAULT_PIVOT_LANGUAGE, DEFAULT_SLOT, Settings};
use crate::error::{AtStage, ConfigError, ServiceError, Stage, TurnError};
use crate::services::{KbAnswer, Services, extract_entities};
use tracing::{debug, warn};

/// Sequences the remote calls for a turn. Holds no per-turn state.
pub struct Pipeline {
    services: Services,
    slot: String,
    pivot_language: String,
}

impl Pipeline {
    /// Pipeline with the default `Production` slot and English as pivot
    pub fn new(services: Services) -> Self {
        Self {
            services,
            slot: DEFAULT_SLOT.to_string(),
            pivot_language: DEFAULT_PIVOT_LANGUAGE.to_string(),
        }
    }

    /// Build HTTP clients for every service from validated settings
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::new(Services::from_settings(settings)?)
            .with_slot(settings.luis_slot.clone())
            .with_pivot_language(settings.pivot_language.clone()))
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    pub fn with_pivot_language(mut self, code: impl Into<String>) -> Self {
        self.pivot_language = code.into();
        self
    }

    pub fn pivot_language(&self) -> &str {
        &self.pivot_language
    }

    fn needs_translation(&self, code: &str) -> bool {
        !code.eq_ignore_ascii_case(&self.pivot_language)
    }

    /// Process one input line. Any failed remote call ends the turn early.
    pub async fn run_turn(&self, raw_input: &str) -> Result<TurnState, TurnError> {
        if raw_input.trim().is_empty() {
            return Err(TurnError::new(Stage::Detect, ServiceError::EmptyInput));
        }

        let language = self
            .services
            .detector
            .detect(raw_input)
            .await
            .at(Stage::Detect)?;
        let translate = self.needs_translation(language.code());
        debug!(
            language = language.code(),
            confidence = language.confidence_score,
            translate,
            "detected input language"
        );

        let pivot_input = if translate {
            self.services
                .translator
                .translate(raw_input, language.code(), &self.pivot_language)
                .await
                .at(Stage::TranslateIn)?
        } else {
            raw_input.to_string()
        };

        let prediction = self
            .services
            .predictor
            .predict(&pivot_input, &self.slot)
            .await
            .at(Stage::Predict)?;

        let extraction = extract_entities(&prediction.entities);
        if let Some(entity) = &extraction.skipped {
            warn!(
                entity = entity.as_str(),
                parsed = extraction.parsed,
                "entity extraction stopped at unparseable value"
            );
        }

        let query = knowledge_query(&prediction.top_intent, &pivot_input);
        debug!(intent = prediction.top_intent.as_str(), query, "querying knowledge base");
        let answer = self
            .services
            .knowledge
            .answer(query)
            .await
            .at(Stage::Answer)?;

        let answer_text = match &answer {
            KbAnswer::Found(text) => text.as_str(),
            KbAnswer::NoAnswer => NO_ANSWER_REPLY,
        };
        let reply = if translate {
            self.services
                .translator
                .translate(answer_text, &self.pivot_language, language.code())
                .await
                .at(Stage::TranslateOut)?
        } else {
            answer_text.to_string()
        };

        Ok(TurnState {
            raw_input: raw_input.to_string(),
            pivot_input,
            language,
            top_intent: prediction.top_intent,
            entities: extraction.entities,
            answer,
            reply,
        })
    }
}
