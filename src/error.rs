//! Error types for the chat pipeline

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Remote services the bot talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    LanguageDetection,
    Translation,
    Prediction,
    KnowledgeBase,
}

impl Service {
    pub fn as_str(&self) -> &str {
        match self {
            Service::LanguageDetection => "language detection",
            Service::Translation => "translation",
            Service::Prediction => "intent prediction",
            Service::KnowledgeBase => "knowledge base",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while loading settings or constructing clients.
/// Any of these aborts startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No settings file found (searched: {})", display_paths(.0))]
    NotFound(Vec<PathBuf>),

    #[error("Could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing setting: {0}")]
    Missing(&'static str),

    #[error("Setting {key} is not a valid URL: {value}")]
    InvalidUrl { key: &'static str, value: String },

    #[error("Setting {key} is not a valid GUID: {value}")]
    InvalidGuid { key: &'static str, value: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure of a single remote call
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Network error calling {service}: {source}")]
    Network {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned status {status}: {body}")]
    Status {
        service: Service,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Could not parse {service} response: {reason}")]
    Parse { service: Service, reason: String },

    #[error("Input text is empty")]
    EmptyInput,

    #[error("Language detection failed: {0}")]
    Detection(String),
}

impl ServiceError {
    pub fn parse(service: Service, reason: impl Into<String>) -> Self {
        ServiceError::Parse {
            service,
            reason: reason.into(),
        }
    }
}

/// Step of a turn in which a remote call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Detect,
    TranslateIn,
    Predict,
    Answer,
    TranslateOut,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Detect => "detecting language",
            Stage::TranslateIn => "translating input",
            Stage::Predict => "predicting intent",
            Stage::Answer => "querying knowledge base",
            Stage::TranslateOut => "translating reply",
        };
        f.write_str(name)
    }
}

/// Failure of one turn. Recoverable: the session reports it and prompts again.
#[derive(Error, Debug)]
#[error("Error while {stage}: {source}")]
pub struct TurnError {
    pub stage: Stage,
    #[source]
    pub source: ServiceError,
}

impl TurnError {
    pub fn new(stage: Stage, source: ServiceError) -> Self {
        Self { stage, source }
    }
}

/// Attach a pipeline stage to a service result
pub(crate) trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, TurnError>;
}

impl<T> AtStage<T> for Result<T, ServiceError> {
    fn at(self, stage: Stage) -> Result<T, TurnError> {
        self.map_err(|source| TurnError::new(stage, source))
    }
}
