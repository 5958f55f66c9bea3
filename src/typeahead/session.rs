//! Session state machine
//!
//! One session is one tokio task driving a `select!` loop over four inputs:
//! cancellation, text-changed events, the debounce deadline and query
//! completions. Queries run in their own tasks and report back tagged with
//! the generation they were issued under; only a completion matching the
//! current in-flight generation is delivered.

use super::events::{ChangeReason, SuggestionSink, SuggestionUpdate, TextChanged};
use crate::config::{ErrorPolicy, TypeaheadSettings};
use crate::error::Result;
use crate::metrics::{PipelineMetrics, Suppression};
use crate::results::SearchResult;
use crate::search::SearchService;
use futures::channel::mpsc as input;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, trace, warn, Instrument};
use uuid::Uuid;

/// Pipeline tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeaheadConfig {
    /// Quiet period a qualifying input must survive before it is queried
    pub debounce_window: Duration,
    /// Minimum trimmed length in characters
    pub min_query_length: usize,
    pub on_error: ErrorPolicy,
    /// Abort the superseded request rather than only discarding its result
    pub abort_superseded: bool,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self::from(&TypeaheadSettings::default())
    }
}

impl From<&TypeaheadSettings> for TypeaheadConfig {
    fn from(settings: &TypeaheadSettings) -> Self {
        Self {
            debounce_window: settings.debounce_window(),
            min_query_length: settings.min_query_length,
            on_error: settings.on_error,
            abort_superseded: settings.abort_superseded,
        }
    }
}

impl TypeaheadConfig {
    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn min_query_length(mut self, len: usize) -> Self {
        self.min_query_length = len;
        self
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    pub fn abort_superseded(mut self, abort: bool) -> Self {
        self.abort_superseded = abort;
        self
    }
}

/// Factory for typeahead sessions sharing one search service
#[derive(Debug, Clone)]
pub struct TypeaheadPipeline {
    service: SearchService,
    config: TypeaheadConfig,
}

impl TypeaheadPipeline {
    pub fn new(service: SearchService, config: TypeaheadConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &TypeaheadConfig {
        &self.config
    }

    /// Start a session fed through [`TypeaheadSession::text_changed`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> TypeaheadSession {
        let (tx, rx) = input::unbounded();
        let mut session = self.attach(rx);
        session.input = Some(tx);
        session
    }

    /// Start a session reading events from `source`.
    ///
    /// When the source ends, a pending debounce and an in-flight query still
    /// complete, then the update stream ends. Must be called from within a
    /// tokio runtime.
    pub fn attach<S>(&self, source: S) -> TypeaheadSession
    where
        S: Stream<Item = TextChanged> + Send + Unpin + 'static,
    {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let metrics = Arc::new(PipelineMetrics::new());
        let id = Uuid::new_v4();

        let driver = SessionDriver {
            service: self.service.clone(),
            config: self.config.clone(),
            metrics: metrics.clone(),
            updates: updates_tx,
            cancel: cancel.clone(),
            completions_tx,
            completions_rx,
            last_qualifying: None,
            last_delivered: None,
            pending: None,
            in_flight: None,
            generation: 0,
            source_closed: false,
        };

        let span = info_span!("typeahead_session", %id);
        let task = tokio::spawn(driver.run(source).instrument(span));

        TypeaheadSession {
            id,
            input: None,
            updates: updates_rx,
            cancel,
            task: Some(task),
            metrics,
        }
    }
}

/// Handle to one running session
///
/// Dropping the handle cancels the session.
pub struct TypeaheadSession {
    id: Uuid,
    input: Option<input::UnboundedSender<TextChanged>>,
    updates: mpsc::UnboundedReceiver<SuggestionUpdate>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    metrics: Arc<PipelineMetrics>,
}

impl TypeaheadSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Feed one input event; false once input is finished or the session ended
    pub fn text_changed(&self, event: TextChanged) -> bool {
        match &self.input {
            Some(tx) => tx.unbounded_send(event).is_ok(),
            None => false,
        }
    }

    /// Shorthand for a user-typed change
    pub fn user_input(&self, text: impl Into<String>) -> bool {
        self.text_changed(TextChanged::user_input(text))
    }

    /// Detach the input source; outstanding work still completes
    pub fn finish_input(&mut self) {
        self.input.take();
    }

    /// Next update, `None` once the session has ended
    pub async fn next_update(&mut self) -> Option<SuggestionUpdate> {
        self.updates.recv().await
    }

    /// Hand every update to `sink` until the session ends.
    ///
    /// The sink runs on the caller's task, so a UI can drive this from the
    /// context that owns its widgets.
    pub async fn deliver_to<K>(&mut self, sink: &mut K)
    where
        K: SuggestionSink + ?Sized,
    {
        while let Some(update) = self.next_update().await {
            sink.on_suggestions_updated(update);
        }
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    /// Cancel the debounce timer and any in-flight query, then wait for the
    /// session task to stop. Nothing is delivered afterwards.
    pub async fn dispose(mut self) {
        self.cancel.cancel();
        self.updates.close();
        self.input.take();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(session = %self.id, error = %e, "session task ended abnormally");
            }
        }
    }
}

impl Drop for TypeaheadSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Pending {
    text: String,
    deadline: Instant,
}

struct InFlight {
    generation: u64,
    query: String,
    handle: JoinHandle<()>,
}

struct Completion {
    generation: u64,
    query: String,
    outcome: Result<SearchResult>,
    elapsed: Duration,
}

struct SessionDriver {
    service: SearchService,
    config: TypeaheadConfig,
    metrics: Arc<PipelineMetrics>,
    updates: mpsc::UnboundedSender<SuggestionUpdate>,
    cancel: CancellationToken,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    /// Text of the last event that passed the filters
    last_qualifying: Option<String>,
    /// Query behind the most recent delivered update
    last_delivered: Option<String>,
    pending: Option<Pending>,
    in_flight: Option<InFlight>,
    /// Issue counter, bumped per query
    generation: u64,
    source_closed: bool,
}

impl SessionDriver {
    async fn run<S>(mut self, mut source: S)
    where
        S: Stream<Item = TextChanged> + Unpin,
    {
        debug!("session started");
        let cancel = self.cancel.clone();

        loop {
            if self.source_closed && self.pending.is_none() && self.in_flight.is_none() {
                break;
            }

            let deadline = self.pending.as_ref().map(|p| p.deadline);

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("session cancelled");
                    break;
                }
                event = source.next(), if !self.source_closed => match event {
                    Some(event) => self.on_text_changed(event),
                    None => {
                        debug!("input source closed");
                        self.source_closed = true;
                    }
                },
                _ = wait_until(deadline) => self.on_debounce_elapsed(),
                Some(done) = self.completions_rx.recv() => self.on_completion(done),
            }
        }

        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
        }
        debug!("session ended");
    }

    fn on_text_changed(&mut self, event: TextChanged) {
        if event.reason != ChangeReason::UserInput {
            trace!(reason = ?event.reason, "ignoring non-user change");
            self.metrics.record_suppressed(Suppression::NotUserInput);
            return;
        }

        let text = event.text.trim();
        if text.is_empty() || text.chars().count() < self.config.min_query_length {
            self.metrics.record_suppressed(Suppression::TooShort);
            if self.pending.take().is_some() {
                debug!("short input cleared pending debounce");
                // Only a live query may suppress retyping: the one in
                // flight, else the one whose suggestions are shown.
                self.last_qualifying = self
                    .in_flight
                    .as_ref()
                    .map(|f| f.query.clone())
                    .or_else(|| self.last_delivered.clone());
            }
            return;
        }

        if self.last_qualifying.as_deref() == Some(text) {
            trace!(text, "ignoring unchanged input");
            self.metrics.record_suppressed(Suppression::Duplicate);
            return;
        }

        let text = text.to_string();
        self.last_qualifying = Some(text.clone());
        self.supersede_in_flight();

        debug!(query = %text, window = ?self.config.debounce_window, "debounce armed");
        self.pending = Some(Pending {
            text,
            deadline: Instant::now() + self.config.debounce_window,
        });
    }

    fn supersede_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(generation = in_flight.generation, "superseding in-flight query");
            self.metrics.record_superseded();
            if self.config.abort_superseded {
                in_flight.handle.abort();
            }
        }
    }

    fn on_debounce_elapsed(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        self.supersede_in_flight();
        self.generation += 1;
        let generation = self.generation;
        let query = pending.text;
        self.metrics.record_issued();

        debug!(%query, generation, "issuing query");

        let service = self.service.clone();
        let done = self.completions_tx.clone();
        let correlation_id = Uuid::new_v4().to_string();
        let issued = query.clone();
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let outcome = service.query_async(&query, &correlation_id).await;
            let _ = done.send(Completion {
                generation,
                query,
                outcome,
                elapsed: started.elapsed(),
            });
        });

        self.in_flight = Some(InFlight {
            generation,
            query: issued,
            handle,
        });
    }

    fn on_completion(&mut self, done: Completion) {
        let current = self.in_flight.as_ref().map(|f| f.generation);
        if current != Some(done.generation) {
            debug!(
                query = %done.query,
                generation = done.generation,
                "discarding stale result"
            );
            return;
        }

        self.in_flight = None;
        self.metrics.record_response_time(done.elapsed);

        match done.outcome {
            Ok(result) => {
                let suggestions = result.suggestions();
                info!(query = %done.query, count = suggestions.len(), "suggestions updated");
                self.deliver(SuggestionUpdate {
                    query: done.query,
                    suggestions,
                });
            }
            Err(err) => {
                self.metrics.record_error(&err);
                warn!(query = %done.query, error = %err, "query failed");
                if self.config.on_error == ErrorPolicy::Clear {
                    self.deliver(SuggestionUpdate {
                        query: done.query,
                        suggestions: Vec::new(),
                    });
                }
            }
        }
    }

    fn deliver(&mut self, update: SuggestionUpdate) {
        self.last_delivered = Some(update.query.clone());
        if self.updates.send(update).is_ok() {
            self.metrics.record_delivered();
        } else {
            debug!("update receiver dropped");
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
