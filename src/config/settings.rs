//! Settings structures for ddg-typeahead configuration

use crate::query::{QueryBuilder, QueryFlags, SpaceEncoding, DEFAULT_ENDPOINT};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "DDG_TYPEAHEAD_";

/// Main settings structure, mirrors settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub api: ApiSettings,
    pub typeahead: TypeaheadSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (DDG_TYPEAHEAD_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_from(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok());
    }

    /// Apply overrides from a key lookup; unparseable values are ignored
    pub fn merge_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DEBUG") {
            if let Ok(debug) = val.parse() {
                self.general.debug = debug;
            }
        }
        if let Some(val) = lookup("SECURE") {
            if let Ok(secure) = val.parse() {
                self.api.secure = secure;
            }
        }
        if let Some(val) = lookup("ENDPOINT") {
            self.api.endpoint = val;
        }
        if let Some(val) = lookup("APP_NAME") {
            self.api.app_name = val;
        }
        if let Some(val) = lookup("DEBOUNCE_MS") {
            if let Ok(ms) = val.parse() {
                self.typeahead.debounce_ms = ms;
            }
        }
        if let Some(val) = lookup("MIN_QUERY_LENGTH") {
            if let Ok(len) = val.parse() {
                self.typeahead.min_query_length = len;
            }
        }
    }

    /// Reject settings that cannot produce a valid query
    pub fn validate(&self) -> Result<()> {
        if self.api.endpoint.trim().is_empty() {
            bail!("api.endpoint must not be empty");
        }
        if self.api.app_name.trim().is_empty() {
            bail!("api.app_name must not be empty");
        }
        if self.typeahead.min_query_length == 0 {
            bail!("typeahead.min_query_length must be at least 1");
        }
        Ok(())
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
}

/// Instant Answer API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Host and path of the API, without scheme
    pub endpoint: String,
    /// Use https
    pub secure: bool,
    /// Strip HTML from returned text
    pub no_html: bool,
    /// Ignore redirects for !bang queries
    pub no_redirects: bool,
    /// Leave out disambiguation results
    pub skip_disambiguation: bool,
    /// Application identity for one-shot queries
    pub app_name: String,
    /// How spaces are encoded in query values
    pub space_encoding: SpaceEncoding,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            secure: true,
            no_html: false,
            no_redirects: false,
            skip_disambiguation: false,
            app_name: "ddg-typeahead".to_string(),
            space_encoding: SpaceEncoding::default(),
        }
    }
}

impl ApiSettings {
    pub fn flags(&self) -> QueryFlags {
        QueryFlags {
            secure: self.secure,
            no_html: self.no_html,
            no_redirects: self.no_redirects,
            skip_disambiguation: self.skip_disambiguation,
        }
    }

    pub fn query_builder(&self) -> QueryBuilder {
        QueryBuilder::with_endpoint(self.endpoint.clone()).space_encoding(self.space_encoding)
    }
}

/// What a failed query does to the displayed suggestions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Leave the previous list untouched
    #[default]
    KeepPrevious,
    /// Deliver an empty list
    Clear,
}

/// Typeahead pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeaheadSettings {
    /// Quiet period before a query is issued, in milliseconds
    pub debounce_ms: u64,
    /// Minimum trimmed length of a query, in characters
    pub min_query_length: usize,
    /// Behavior on query failure
    pub on_error: ErrorPolicy,
    /// Abort superseded requests instead of letting them finish unobserved
    pub abort_superseded: bool,
}

impl Default for TypeaheadSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            min_query_length: 3,
            on_error: ErrorPolicy::default(),
            abort_superseded: true,
        }
    }
}

impl TypeaheadSettings {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds, none or zero disables it
    pub request_timeout: Option<f64>,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Appended to the user agent
    pub useragent_suffix: Option<String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: Some(5.0),
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            useragent_suffix: None,
        }
    }
}

impl OutgoingSettings {
    /// Request timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout
            .filter(|secs| *secs > 0.0)
            .map(Duration::from_secs_f64)
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}
