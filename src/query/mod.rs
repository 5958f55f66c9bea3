//! Request construction for the Instant Answer API
//!
//! Turns a search phrase, an application identity and a set of
//! response-shaping flags into a canonical request URI:
//!
//! `{scheme}://{endpoint}?q=..&t=..&format=json&no_redirect=0|1&no_html=0|1&skip_disambig=0|1`
//!
//! Construction is pure and deterministic. The term and application name are
//! percent-encoded, so no two differing requests share a URI.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default Instant Answer endpoint (host and path, no scheme)
pub const DEFAULT_ENDPOINT: &str = "api.duckduckgo.com/";

/// Boolean switches shaping the API response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryFlags {
    /// Use https rather than http
    pub secure: bool,
    /// Strip HTML from returned text
    pub no_html: bool,
    /// Do not follow !bang redirects
    pub no_redirects: bool,
    /// Leave out disambiguation results
    pub skip_disambiguation: bool,
}

impl Default for QueryFlags {
    fn default() -> Self {
        Self {
            secure: true,
            no_html: false,
            no_redirects: false,
            skip_disambiguation: false,
        }
    }
}

impl QueryFlags {
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn no_html(mut self, no_html: bool) -> Self {
        self.no_html = no_html;
        self
    }

    pub fn no_redirects(mut self, no_redirects: bool) -> Self {
        self.no_redirects = no_redirects;
        self
    }

    pub fn skip_disambiguation(mut self, skip: bool) -> Self {
        self.skip_disambiguation = skip;
        self
    }

    fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }
}

/// Response format requested from the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
}

impl ResponseFormat {
    /// Lower-cased wire token
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How spaces are written in encoded query values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceEncoding {
    /// RFC 3986 style, space becomes `%20`
    #[default]
    Percent,
    /// Form style, space becomes `+`
    Plus,
}

impl SpaceEncoding {
    fn encode(&self, value: &str) -> String {
        match self {
            SpaceEncoding::Percent => urlencoding::encode(value).into_owned(),
            SpaceEncoding::Plus => url::form_urlencoded::byte_serialize(value.as_bytes()).collect(),
        }
    }
}

/// A validated request for one query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryRequest {
    search_term: String,
    application_name: String,
    flags: QueryFlags,
    response_format: ResponseFormat,
}

impl QueryRequest {
    /// Validate and build a request.
    ///
    /// Fails with `InvalidArgument` when either string is empty or blank.
    pub fn new(
        search_term: impl Into<String>,
        application_name: impl Into<String>,
        flags: QueryFlags,
        response_format: ResponseFormat,
    ) -> Result<Self> {
        let search_term = search_term.into();
        let application_name = application_name.into();

        if search_term.trim().is_empty() {
            return Err(SearchError::invalid_argument(
                "search_term",
                "must not be empty or whitespace",
            ));
        }
        if application_name.trim().is_empty() {
            return Err(SearchError::invalid_argument(
                "application_name",
                "must not be empty or whitespace",
            ));
        }

        Ok(Self {
            search_term,
            application_name,
            flags,
            response_format,
        })
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn flags(&self) -> QueryFlags {
        self.flags
    }

    pub fn response_format(&self) -> ResponseFormat {
        self.response_format
    }
}

/// Fully encoded request URI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestUri(String);

impl RequestUri {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for RequestUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds request URIs against a fixed endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    endpoint: String,
    space_encoding: SpaceEncoding,
}

impl QueryBuilder {
    /// Builder for the public DuckDuckGo endpoint
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Builder for another host, e.g. a mock server.
    ///
    /// The endpoint is host plus path; a scheme prefix, if present, is
    /// dropped since the scheme comes from [`QueryFlags::secure`].
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let endpoint = endpoint
            .strip_prefix("https://")
            .or_else(|| endpoint.strip_prefix("http://"))
            .unwrap_or(&endpoint)
            .to_string();

        Self {
            endpoint,
            space_encoding: SpaceEncoding::default(),
        }
    }

    pub fn space_encoding(mut self, encoding: SpaceEncoding) -> Self {
        self.space_encoding = encoding;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Validate the inputs and build the URI for a JSON response
    pub fn build(&self, term: &str, app_name: &str, flags: QueryFlags) -> Result<RequestUri> {
        let request = QueryRequest::new(term, app_name, flags, ResponseFormat::Json)?;
        Ok(self.build_request(&request))
    }

    /// Build the URI for an already validated request
    pub fn build_request(&self, request: &QueryRequest) -> RequestUri {
        let flags = request.flags;
        let uri = format!(
            "{}://{}?q={}&t={}&format={}&no_redirect={}&no_html={}&skip_disambig={}",
            flags.scheme(),
            self.endpoint,
            self.space_encoding.encode(&request.search_term),
            self.space_encoding.encode(&request.application_name),
            request.response_format.as_str(),
            flag_bit(flags.no_redirects),
            flag_bit(flags.no_html),
            flag_bit(flags.skip_disambiguation),
        );

        RequestUri(uri)
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn flag_bit(flag: bool) -> u8 {
    u8::from(flag)
}
