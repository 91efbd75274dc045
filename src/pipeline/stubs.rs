// In-memory service doubles for pipeline and session tests

use super::Pipeline;
use crate::error::ServiceError;
use crate::services::{
    DetectedLanguage, IntentPredictor, KbAnswer, KnowledgeBase, LanguageDetector, Prediction,
    Services, TextTranslator,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Failure = Box<dyn FnOnce() -> ServiceError + Send>;

pub(crate) struct StubDetector {
    code: String,
    calls: AtomicUsize,
}

impl StubDetector {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageDetector for StubDetector {
    async fn detect(&self, _text: &str) -> Result<DetectedLanguage, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(DetectedLanguage::new(self.code.clone(), self.code.clone(), 0.99))
    }
}

/// Prefixes the target code, e.g. `[sv] text`
#[derive(Default)]
pub(crate) struct RecordingTranslator {
    calls: Mutex<Vec<(String, String, String)>>,
    failure: Mutex<Option<Failure>>,
}

impl RecordingTranslator {
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Fail the next call only
    pub fn fail_with(&self, failure: impl FnOnce() -> ServiceError + Send + 'static) {
        *self.failure.lock().unwrap() = Some(Box::new(failure));
    }
}

#[async_trait]
impl TextTranslator for RecordingTranslator {
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), from.to_string(), to.to_string()));

        let failure = self.failure.lock().unwrap().take();
        match failure {
            Some(fail) => Err(fail()),
            None => Ok(format!("[{}] {}", to, text)),
        }
    }
}

pub(crate) struct StubPredictor {
    intent: String,
    /// Entities as JSON text, decoded on each call so key order is kept
    entities: String,
    queries: Mutex<Vec<String>>,
}

impl StubPredictor {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntentPredictor for StubPredictor {
    async fn predict(&self, text: &str, _slot: &str) -> Result<Prediction, ServiceError> {
        self.queries.lock().unwrap().push(text.to_string());
        Ok(Prediction {
            top_intent: self.intent.clone(),
            entities: serde_json::from_str(&self.entities).unwrap_or_default(),
        })
    }
}

pub(crate) struct StubKnowledge {
    answer: Option<String>,
    questions: Mutex<Vec<String>>,
}

impl StubKnowledge {
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeBase for StubKnowledge {
    async fn answer(&self, question: &str) -> Result<KbAnswer, ServiceError> {
        self.questions.lock().unwrap().push(question.to_string());
        Ok(match &self.answer {
            Some(answer) => KbAnswer::Found(answer.clone()),
            None => KbAnswer::NoAnswer,
        })
    }
}

pub(crate) struct StubServices {
    pub detector: Arc<StubDetector>,
    pub translator: Arc<RecordingTranslator>,
    pub predictor: Arc<StubPredictor>,
    pub knowledge: Arc<StubKnowledge>,
}

impl StubServices {
    pub fn new(language: &str, intent: &str, answer: &str) -> Self {
        Self {
            detector: Arc::new(StubDetector {
                code: language.to_string(),
                calls: AtomicUsize::new(0),
            }),
            translator: Arc::new(RecordingTranslator::default()),
            predictor: Arc::new(StubPredictor {
                intent: intent.to_string(),
                entities: "{}".to_string(),
                queries: Mutex::new(Vec::new()),
            }),
            knowledge: Arc::new(StubKnowledge {
                answer: Some(answer.to_string()),
                questions: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn without_answers(mut self) -> Self {
        self.knowledge = Arc::new(StubKnowledge {
            answer: None,
            questions: Mutex::new(Vec::new()),
        });
        self
    }

    pub fn with_entities(mut self, entities: &str) -> Self {
        self.predictor = Arc::new(StubPredictor {
            intent: self.predictor.intent.clone(),
            entities: entities.to_string(),
            queries: Mutex::new(Vec::new()),
        });
        self
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(Services {
            detector: self.detector.clone(),
            translator: self.translator.clone(),
            predictor: self.predictor.clone(),
            knowledge: self.knowledge.clone(),
        })
    }
}
