//! Transport capability and the default reqwest implementation

use super::user_agent::{accept_json, user_agent};
use crate::config::OutgoingSettings;
use crate::error::{Result, SearchError};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::header::{ACCEPT, USER_AGENT};
use std::sync::Arc;
use tracing::debug;

/// Fetches raw response bodies
///
/// Implementations have no retry or timeout policy of their own; both
/// operations fail with `SearchError::Transport` on network errors and
/// non-2xx statuses.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Blocking fetch. Must not be called from inside an async task.
    fn fetch(&self, uri: &str) -> Result<String>;

    /// Non-blocking fetch, resolves once the whole body is received
    async fn fetch_async(&self, uri: &str) -> Result<String>;
}

#[async_trait]
impl<T: ApiClient + ?Sized> ApiClient for Arc<T> {
    fn fetch(&self, uri: &str) -> Result<String> {
        (**self).fetch(uri)
    }

    async fn fetch_async(&self, uri: &str) -> Result<String> {
        (**self).fetch_async(uri).await
    }
}

#[async_trait]
impl<T: ApiClient + ?Sized> ApiClient for Box<T> {
    fn fetch(&self, uri: &str) -> Result<String> {
        (**self).fetch(uri)
    }

    async fn fetch_async(&self, uri: &str) -> Result<String> {
        (**self).fetch_async(uri).await
    }
}

/// Applies the outgoing settings to either reqwest builder
macro_rules! configure {
    ($builder:expr, $settings:expr) => {{
        let settings: &OutgoingSettings = $settings;
        let mut builder = $builder
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        for proxy in proxies(settings)? {
            builder = builder.proxy(proxy);
        }
        builder
    }};
}

/// Plain GET transport over reqwest
#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    /// Built on first blocking call so async-only users never start its runtime
    blocking: Arc<OnceCell<reqwest::blocking::Client>>,
    settings: OutgoingSettings,
    user_agent: String,
}

impl HttpApiClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let client = configure!(reqwest::Client::builder(), settings).build()?;

        Ok(Self {
            client,
            blocking: Arc::new(OnceCell::new()),
            settings: settings.clone(),
            user_agent: user_agent(settings.useragent_suffix.as_deref()),
        })
    }

    /// Current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn blocking_client(&self) -> Result<&reqwest::blocking::Client> {
        self.blocking.get_or_try_init(|| {
            let builder = configure!(reqwest::blocking::Client::builder(), &self.settings)
                // the blocking builder has its own 30s default; a disabled timeout clears it
                .timeout(self.settings.timeout());
            Ok(builder.build()?)
        })
    }
}

/// Proxies for the outgoing settings; `all` takes precedence over per-scheme ones
fn proxies(settings: &OutgoingSettings) -> Result<Vec<reqwest::Proxy>> {
    if let Some(ref proxy_url) = settings.proxies.all {
        return Ok(vec![reqwest::Proxy::all(proxy_url)?]);
    }

    let mut proxies = Vec::new();
    if let Some(ref http) = settings.proxies.http {
        proxies.push(reqwest::Proxy::http(http)?);
    }
    if let Some(ref https) = settings.proxies.https {
        proxies.push(reqwest::Proxy::https(https)?);
    }
    Ok(proxies)
}

#[async_trait]
impl ApiClient for HttpApiClient {
    fn fetch(&self, uri: &str) -> Result<String> {
        debug!(uri, "blocking fetch");

        let response = self
            .blocking_client()?
            .get(uri)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, accept_json())
            .send()
            .map_err(|e| transport_error(uri, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(uri, status));
        }

        response.text().map_err(|e| transport_error(uri, e))
    }

    async fn fetch_async(&self, uri: &str) -> Result<String> {
        debug!(uri, "async fetch");

        let response = self
            .client
            .get(uri)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, accept_json())
            .send()
            .await
            .map_err(|e| transport_error(uri, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(uri, status));
        }

        response.text().await.map_err(|e| transport_error(uri, e))
    }
}

fn transport_error(uri: &str, err: reqwest::Error) -> SearchError {
    SearchError::transport(uri, err.status().map(|s| s.as_u16()), err.to_string())
}

fn status_error(uri: &str, status: reqwest::StatusCode) -> SearchError {
    SearchError::transport(uri, Some(status.as_u16()), format!("HTTP error: {}", status))
}
