//! Query orchestration: build the URI, fetch the body, decode it

use crate::config::{ApiSettings, OutgoingSettings};
use crate::error::Result;
use crate::network::{ApiClient, HttpApiClient};
use crate::query::{QueryBuilder, QueryFlags, QueryRequest, RequestUri, ResponseFormat};
use crate::results::{decode, SearchResult};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Issues Instant Answer queries through an [`ApiClient`]
///
/// Flags, builder and client are fixed at construction; the service holds
/// no other state and can be cloned and shared across sessions.
#[derive(Clone)]
pub struct SearchService {
    flags: QueryFlags,
    builder: QueryBuilder,
    client: Arc<dyn ApiClient>,
}

impl SearchService {
    /// Create a service over the given transport
    pub fn new(flags: QueryFlags, client: impl ApiClient + 'static) -> Self {
        Self {
            flags,
            builder: QueryBuilder::new(),
            client: Arc::new(client),
        }
    }

    /// Create a service over the default reqwest transport
    pub fn with_default_client(flags: QueryFlags) -> Result<Self> {
        Ok(Self::new(flags, HttpApiClient::new()?))
    }

    /// Create a service from configuration
    pub fn from_settings(api: &ApiSettings, outgoing: &OutgoingSettings) -> Result<Self> {
        let client = HttpApiClient::with_settings(outgoing)?;
        Ok(Self::new(api.flags(), client).with_builder(api.query_builder()))
    }

    /// Replace the URI builder, e.g. to target another endpoint
    pub fn with_builder(mut self, builder: QueryBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn flags(&self) -> QueryFlags {
        self.flags
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    /// Blocking query decoded into a [`SearchResult`]
    pub fn query(&self, term: &str, app_name: &str) -> Result<SearchResult> {
        let body = self.text_query(term, app_name, ResponseFormat::Json)?;
        decode(&body)
    }

    /// Non-blocking query decoded into a [`SearchResult`]
    pub async fn query_async(&self, term: &str, app_name: &str) -> Result<SearchResult> {
        let body = self
            .text_query_async(term, app_name, ResponseFormat::Json)
            .await?;
        decode(&body)
    }

    /// Blocking query returning the raw response body
    pub fn text_query(&self, term: &str, app_name: &str, format: ResponseFormat) -> Result<String> {
        let uri = self.request_uri(term, app_name, format)?;
        self.client.fetch(uri.as_str())
    }

    /// Non-blocking query returning the raw response body
    pub async fn text_query_async(
        &self,
        term: &str,
        app_name: &str,
        format: ResponseFormat,
    ) -> Result<String> {
        let uri = self.request_uri(term, app_name, format)?;
        self.client.fetch_async(uri.as_str()).await
    }

    fn request_uri(&self, term: &str, app_name: &str, format: ResponseFormat) -> Result<RequestUri> {
        let request = QueryRequest::new(term, app_name, self.flags, format)?;
        let uri = self.builder.build_request(&request);
        debug!(%uri, "issuing query");
        Ok(uri)
    }
}

impl fmt::Debug for SearchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchService")
            .field("flags", &self.flags)
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}
