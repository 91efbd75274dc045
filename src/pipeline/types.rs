// Core types for a single chat turn

use crate::services::{DetectedLanguage, KbAnswer};
use indexmap::IndexMap;

/// Intent label the predictor uses for unclassified input
pub const NONE_INTENT: &str = "None";

/// Reply used when the knowledge base has nothing to say
pub const NO_ANSWER_REPLY: &str = "No answer available.";

/// Everything learned about one input line. Created per turn and dropped
/// once the reply is printed.
#[derive(Debug, Clone)]
pub struct TurnState {
    pub raw_input: String,
    /// `raw_input` in the pivot language
    pub pivot_input: String,
    pub language: DetectedLanguage,
    pub top_intent: String,
    pub entities: IndexMap<String, Vec<String>>,
    /// Knowledge base answer, in the pivot language
    pub answer: KbAnswer,
    /// Final reply in the user's language
    pub reply: String,
}

impl TurnState {
    pub fn detected_language(&self) -> &str {
        self.language.code()
    }

    /// Raw answer text, falling back to the fixed no-answer reply
    pub fn answer_text(&self) -> &str {
        match &self.answer {
            KbAnswer::Found(text) => text,
            KbAnswer::NoAnswer => NO_ANSWER_REPLY,
        }
    }
}

/// Question to send to the knowledge base.
///
/// Unclassified input goes in verbatim as chit-chat, anything else is looked
/// up by its intent label.
pub fn knowledge_query<'a>(top_intent: &'a str, pivot_input: &'a str) -> &'a str {
    if top_intent == NONE_INTENT {
        pivot_input
    } else {
        top_intent
    }
}
