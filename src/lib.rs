//! Kustbot - a console chat bot that answers questions in the user's own
//! language.
//!
//! Each line is pivoted through English: the language is detected, the text
//! translated if needed, classified into an intent, answered from a knowledge
//! base and the answer translated back.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod services;
pub mod session;

pub use config::Settings;
pub use error::{ConfigError, ServiceError, TurnError};
pub use pipeline::{Pipeline, TurnState};
pub use session::{Session, SessionSummary};
