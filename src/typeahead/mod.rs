//! Typeahead pipeline
//!
//! Turns a stream of text-changed events into a stream of suggestion
//! updates. Input is filtered (user typing only, minimum trimmed length, no
//! consecutive duplicates), debounced, and queried with switch-to-latest
//! semantics: only the most recently issued query can ever reach the UI.

mod events;
mod session;

pub use crate::config::ErrorPolicy;
pub use events::{ChangeReason, SuggestionSink, SuggestionUpdate, TextChanged};
pub use session::{TypeaheadConfig, TypeaheadPipeline, TypeaheadSession};
