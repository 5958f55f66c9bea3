#![allow(dead_code)]

use async_trait::async_trait;
use ddg_typeahead::{ApiClient, Result, SearchError};
use std::collections::HashMap;
use std::sync::{Mutex, Once};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

pub fn init_test_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub const CATS_BODY: &str = r#"{
    "Heading": "Cats",
    "Type": "D",
    "RelatedTopics": [
        {"Text": "Cats (disambiguation)", "FirstURL": "http://duckduckgo.com/Cats_(disambiguation)"},
        {"Topics": [{"Text": "", "FirstURL": ""}]}
    ],
    "Results": []
}"#;

pub fn query_param(uri: &str, key: &str) -> Option<String> {
    url::Url::parse(uri)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub fn body_for(term: &str) -> String {
    format!(
        r#"{{"Heading": "{term}", "RelatedTopics": [{{"Text": "{term} (topic)", "FirstURL": "https://duckduckgo.com/{term}"}}]}}"#
    )
}

/// Answers every request with the same body
pub struct FixedClient {
    body: String,
    uris: Mutex<Vec<String>>,
}

impl FixedClient {
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            uris: Mutex::new(Vec::new()),
        }
    }

    pub fn uris(&self) -> Vec<String> {
        self.uris.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiClient for FixedClient {
    fn fetch(&self, uri: &str) -> Result<String> {
        self.uris.lock().unwrap().push(uri.to_string());
        Ok(self.body.clone())
    }

    async fn fetch_async(&self, uri: &str) -> Result<String> {
        self.fetch(uri)
    }
}

/// Parks each request until the test completes it, so completion order is
/// under the test's control
#[derive(Default)]
pub struct ControlledClient {
    gates: Mutex<HashMap<String, oneshot::Sender<Result<String>>>>,
    issued: Mutex<Vec<String>>,
}

impl ControlledClient {
    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().unwrap().clone()
    }

    pub fn is_waiting(&self, term: &str) -> bool {
        self.gates.lock().unwrap().contains_key(term)
    }

    /// Complete the request for `term`; false if nobody is waiting anymore
    pub fn complete(&self, term: &str) -> bool {
        self.finish(term, Ok(body_for(term)))
    }

    pub fn fail(&self, term: &str, status: u16) -> bool {
        self.finish(
            term,
            Err(SearchError::transport(format!("stub://{term}"), Some(status), "stubbed failure")),
        )
    }

    fn finish(&self, term: &str, outcome: Result<String>) -> bool {
        match self.gates.lock().unwrap().remove(term) {
            Some(gate) => gate.send(outcome).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl ApiClient for ControlledClient {
    fn fetch(&self, _uri: &str) -> Result<String> {
        unreachable!("typeahead sessions only use the async path")
    }

    async fn fetch_async(&self, uri: &str) -> Result<String> {
        let term = query_param(uri, "q").unwrap_or_default();
        let (tx, rx) = oneshot::channel();
        self.issued.lock().unwrap().push(term.clone());
        self.gates.lock().unwrap().insert(term, tx);

        rx.await
            .unwrap_or_else(|_| Err(SearchError::transport(uri, None, "request abandoned")))
    }
}
