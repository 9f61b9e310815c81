//! Session controller.
//!
//! Turns user intents (submit a URL, view the short URL's stats) into API
//! calls and applies each call's resolution to the owned [`UiState`].
//!
//! Calls run as spawned tokio tasks and report back through an internal
//! channel; the owner pumps resolutions with [`Controller::next_event`] +
//! [`Controller::handle_event`], or simply [`Controller::settle`]. A newer
//! dispatch aborts the in-flight call of the same lifecycle and only the
//! latest call's result is ever applied. Every call resolves exactly once:
//! a call that panics or is cancelled resolves as [`ApiError::Interrupted`].

pub mod display;
pub mod events;
pub mod state;
pub mod validation;

pub use display::display_short_url;
pub use events::{ApiEvent, Ticket};
pub use state::{StatsPhase, SubmitPhase, UiState};
pub use validation::{validate_url, ValidationError};

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::client::{ApiError, ApiResult, ShortenerApi};
use crate::clipboard::Clipboard;
use crate::models::{ShortenRequest, ShortenResponse};

/// Shown when the input is not an absolute URL
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL";

/// Shown for any failed shorten call, whatever the cause
pub const SHORTEN_FAILED_MESSAGE: &str = "Error shortening URL. Please try again.";

const EVENT_BUFFER: usize = 16;

pub struct Controller {
    api: Arc<dyn ShortenerApi>,
    state: UiState,
    display_domain: Option<String>,
    events_tx: mpsc::Sender<ApiEvent>,
    events_rx: mpsc::Receiver<ApiEvent>,
    submit_ticket: Ticket,
    stats_ticket: Ticket,
    submit_call: Option<AbortHandle>,
    stats_call: Option<AbortHandle>,
}

impl Controller {
    pub fn new(api: Arc<dyn ShortenerApi>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            api,
            state: UiState::new(),
            display_domain: None,
            events_tx,
            events_rx,
            submit_ticket: Ticket::default(),
            stats_ticket: Ticket::default(),
            submit_call: None,
            stats_call: None,
        }
    }

    pub fn with_display_domain(mut self, domain: Option<String>) -> Self {
        self.display_domain = domain;
        self
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Submit a URL for shortening.
    ///
    /// Invalid input sets the validation message and makes no call.
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, input: &str) -> Result<(), ValidationError> {
        self.dispatch_submit(input, None)
    }

    /// Submit a URL under a custom alias (`/shorten/custom`)
    pub fn submit_with_alias(&mut self, input: &str, alias: &str) -> Result<(), ValidationError> {
        self.dispatch_submit(input, Some(alias))
    }

    fn dispatch_submit(&mut self, input: &str, alias: Option<&str>) -> Result<(), ValidationError> {
        self.state.set_input(input);

        if let Err(err) = validate_url(input) {
            debug!(input, error = %err, "rejecting submission");
            self.state.reject_input(INVALID_URL_MESSAGE);
            return Err(err);
        }

        abort(self.submit_call.take());
        abort(self.stats_call.take());
        self.submit_ticket = self.submit_ticket.next();
        self.stats_ticket = self.stats_ticket.next();
        self.state.begin_submit();

        let request = match alias {
            Some(alias) => ShortenRequest::with_alias(input, alias),
            None => ShortenRequest::new(input),
        };
        info!(original_url = %request.original_url, custom_alias = ?request.custom_alias, "submitting URL");

        let api = Arc::clone(&self.api);
        let ticket = self.submit_ticket;
        let call = async move {
            match request.custom_alias.as_deref() {
                Some(alias) => api.create_custom_url(&request.original_url, alias).await,
                None => api.shorten(&request).await,
            }
        };
        self.submit_call = Some(self.spawn_call(call, move |result| ApiEvent::Shortened {
            ticket,
            result,
        }));

        Ok(())
    }

    /// Fetch stats for the current short URL.
    ///
    /// Returns false, without any call, when there is no short URL yet.
    pub fn refresh_stats(&mut self) -> bool {
        let Some(short_url) = self.state.short_url().map(str::to_string) else {
            debug!("no short URL to fetch stats for");
            return false;
        };

        abort(self.stats_call.take());
        self.stats_ticket = self.stats_ticket.next();
        self.state.begin_stats();

        let api = Arc::clone(&self.api);
        let ticket = self.stats_ticket;
        let call = async move { api.get_stats(&short_url).await };
        self.stats_call = Some(self.spawn_call(call, move |result| ApiEvent::StatsFetched {
            ticket,
            result,
        }));

        true
    }

    /// Run `call` on its own task and report its outcome as one event.
    ///
    /// The returned handle aborts the call only; the reporting task still
    /// resolves it as `Interrupted`, which `handle_event` drops as stale.
    fn spawn_call<F, E>(&self, call: F, into_event: E) -> AbortHandle
    where
        F: Future<Output = ApiResult<ShortenResponse>> + Send + 'static,
        E: FnOnce(ApiResult<ShortenResponse>) -> ApiEvent + Send + 'static,
    {
        let call = tokio::spawn(call);
        let handle = call.abort_handle();
        let events = self.events_tx.clone();

        tokio::spawn(async move {
            let result = call.await.unwrap_or_else(|err| Err(ApiError::Interrupted(err)));
            // The controller may have been dropped meanwhile
            let _ = events.send(into_event(result)).await;
        });

        handle
    }

    /// Apply one API resolution. Results of superseded calls are dropped.
    pub fn handle_event(&mut self, event: ApiEvent) {
        let latest = match event {
            ApiEvent::Shortened { .. } => self.submit_ticket,
            ApiEvent::StatsFetched { .. } => self.stats_ticket,
        };
        if event.ticket() != latest {
            debug!(ticket = ?event.ticket(), ?latest, "dropping superseded result");
            return;
        }

        match event {
            ApiEvent::Shortened { result, .. } => {
                self.submit_call = None;

                match result {
                    Ok(response) => {
                        info!(short_url = %response.short_url, "URL shortened");
                        self.state.complete_submit(response);
                        self.refresh_stats();
                    }
                    Err(err) => {
                        error!(error = %err, "Error shortening URL");
                        self.state.fail_submit(SHORTEN_FAILED_MESSAGE);
                    }
                }
            }
            ApiEvent::StatsFetched { result, .. } => {
                self.stats_call = None;

                match result {
                    Ok(response) => {
                        debug!(click_count = response.click_count, "stats loaded");
                        self.state.complete_stats(response);
                    }
                    Err(err) => {
                        warn!(error = %err, "Error fetching stats");
                        self.state.fail_stats();
                    }
                }
            }
        }
    }

    /// Wait for the next API resolution without applying it
    pub async fn next_event(&mut self) -> Option<ApiEvent> {
        self.events_rx.recv().await
    }

    /// Apply resolutions until no call is in flight
    pub async fn settle(&mut self) {
        while self.state.is_busy() {
            match self.events_rx.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    /// Short URL as it should be shown to the user
    pub fn display_short_url(&self) -> Option<String> {
        self.state
            .short_url()
            .map(|short_url| display_short_url(short_url, self.display_domain.as_deref()))
    }

    /// Copy the current short URL. Failures are logged only; state is untouched.
    pub fn copy_to_clipboard(&self, clipboard: &mut dyn Clipboard) -> bool {
        let Some(short_url) = self.state.short_url() else {
            debug!("nothing to copy");
            return false;
        };

        match clipboard.set_text(short_url) {
            Ok(()) => {
                info!(%short_url, "URL copied to clipboard");
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to copy URL to clipboard");
                false
            }
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        abort(self.submit_call.take());
        abort(self.stats_call.take());
    }
}

fn abort(call: Option<AbortHandle>) {
    if let Some(call) = call {
        call.abort();
    }
}
