//! Input events, output updates and the UI-facing sink

use crate::results::Suggestion;
use serde::{Deserialize, Serialize};

/// Why the text of the input field changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    /// Typed by the user
    UserInput,
    /// Assigned by code, e.g. after picking a suggestion
    Programmatic,
    Other,
}

/// The input field's text after a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChanged {
    pub text: String,
    pub reason: ChangeReason,
}

impl TextChanged {
    pub fn new(text: impl Into<String>, reason: ChangeReason) -> Self {
        Self {
            text: text.into(),
            reason,
        }
    }

    pub fn user_input(text: impl Into<String>) -> Self {
        Self::new(text, ChangeReason::UserInput)
    }

    pub fn programmatic(text: impl Into<String>) -> Self {
        Self::new(text, ChangeReason::Programmatic)
    }
}

/// A new suggestion list for the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionUpdate {
    /// Query the suggestions answer
    pub query: String,
    /// Leaf related topics in response order; empty after a failure when
    /// the session clears on error
    pub suggestions: Vec<Suggestion>,
}

/// Receiver of suggestion updates, called on the context that drains the session
pub trait SuggestionSink {
    fn on_suggestions_updated(&mut self, update: SuggestionUpdate);
}

impl<F> SuggestionSink for F
where
    F: FnMut(SuggestionUpdate),
{
    fn on_suggestions_updated(&mut self, update: SuggestionUpdate) {
        self(update)
    }
}
