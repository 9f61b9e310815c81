//! Session UI state and its two lifecycles.
//!
//! Fields are private; every mutation goes through a named transition so the
//! submit and stats lifecycles can be exercised on their own.

use crate::models::ShortenResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsPhase {
    #[default]
    Idle,
    Fetching,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    input_url: String,
    short_url: Option<String>,
    error_message: Option<String>,
    click_count: Option<u64>,
    submit_phase: SubmitPhase,
    stats_phase: StatsPhase,
    last_response: Option<ShortenResponse>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_url(&self) -> &str {
        &self.input_url
    }

    pub fn short_url(&self) -> Option<&str> {
        self.short_url.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn click_count(&self) -> Option<u64> {
        self.click_count
    }

    pub fn is_loading(&self) -> bool {
        self.submit_phase == SubmitPhase::Submitting
    }

    pub fn submit_phase(&self) -> SubmitPhase {
        self.submit_phase
    }

    pub fn stats_phase(&self) -> StatsPhase {
        self.stats_phase
    }

    /// Response of the last successful shorten or stats call
    pub fn last_response(&self) -> Option<&ShortenResponse> {
        self.last_response.as_ref()
    }

    /// Either lifecycle has a call in flight
    pub fn is_busy(&self) -> bool {
        self.submit_phase == SubmitPhase::Submitting || self.stats_phase == StatsPhase::Fetching
    }

    pub fn set_input(&mut self, input: &str) {
        self.input_url = input.to_string();
    }

    /// Input failed local validation; no request is made and the current
    /// short URL is left alone.
    pub fn reject_input(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
        if self.submit_phase != SubmitPhase::Submitting {
            self.submit_phase = SubmitPhase::Failed;
        }
    }

    /// A submission starts: results of the previous one are cleared.
    pub fn begin_submit(&mut self) {
        self.submit_phase = SubmitPhase::Submitting;
        self.short_url = None;
        self.error_message = None;
        self.click_count = None;
        self.last_response = None;
        self.stats_phase = StatsPhase::Idle;
    }

    pub fn complete_submit(&mut self, response: ShortenResponse) {
        self.submit_phase = SubmitPhase::Succeeded;
        self.short_url = Some(response.short_url.clone());
        self.error_message = None;
        self.last_response = Some(response);
    }

    pub fn fail_submit(&mut self, message: &str) {
        self.submit_phase = SubmitPhase::Failed;
        self.short_url = None;
        self.error_message = Some(message.to_string());
    }

    /// Returns false when there is no short URL to fetch stats for.
    pub fn begin_stats(&mut self) -> bool {
        if self.short_url.is_none() {
            return false;
        }
        self.stats_phase = StatsPhase::Fetching;
        true
    }

    pub fn complete_stats(&mut self, response: ShortenResponse) {
        self.stats_phase = StatsPhase::Loaded;
        self.click_count = Some(response.click_count);
        self.last_response = Some(response);
    }

    /// Stats are best-effort: a failure keeps whatever count was loaded before.
    pub fn fail_stats(&mut self) {
        self.stats_phase = StatsPhase::Failed;
    }
}
