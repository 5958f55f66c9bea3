//! Search orchestration module
//!
//! Ties query construction, transport and decoding together for a single
//! logical query.

mod service;

pub use service::SearchService;
