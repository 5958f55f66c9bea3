//! ddg-typeahead: live search suggestions from the DuckDuckGo Instant Answer API
//!
//! Keystrokes go in, suggestion lists come out. In between, input is
//! filtered and debounced, and only the most recently issued query is ever
//! allowed to update the UI.
//!
//! Data flow: [`typeahead::TypeaheadSession`] → [`SearchService::query_async`]
//! → [`query::QueryBuilder`] → [`network::ApiClient::fetch_async`] →
//! [`results::decode`] → [`typeahead::SuggestionUpdate`].

pub mod config;
pub mod error;
pub mod metrics;
pub mod network;
pub mod query;
pub mod results;
pub mod search;
pub mod typeahead;

pub use config::Settings;
pub use error::{Result, SearchError};
pub use network::{ApiClient, HttpApiClient};
pub use query::{QueryBuilder, QueryFlags, ResponseFormat};
pub use results::{RelatedTopic, SearchResult, Suggestion};
pub use search::SearchService;
pub use typeahead::{TypeaheadConfig, TypeaheadPipeline, TypeaheadSession};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
