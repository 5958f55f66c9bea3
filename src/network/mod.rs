//! HTTP networking module
//!
//! Defines the transport capability the search service depends on and the
//! default reqwest-backed implementation.

mod client;
mod user_agent;

pub use client::{ApiClient, HttpApiClient};
pub use user_agent::{accept_json, user_agent};
