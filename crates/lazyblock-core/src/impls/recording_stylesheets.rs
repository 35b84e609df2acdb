//! RecordingStylesheetFetcher - stylesheet リクエストを記録

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::domain::FetchError;
use crate::ports::StylesheetFetcher;

#[derive(Debug, Default)]
pub struct RecordingStylesheetFetcher {
    failing: HashSet<String>,
    latency: Option<Duration>,
    fetched: Mutex<Vec<String>>,
}

impl RecordingStylesheetFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make fetches of `href` fail.
    pub fn failing_on(mut self, href: impl Into<String>) -> Self {
        self.failing.insert(href.into());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl StylesheetFetcher for RecordingStylesheetFetcher {
    async fn fetch(&self, href: &str) -> Result<(), FetchError> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(href.to_string());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.contains(href) {
            return Err(FetchError::new(href, "stylesheet failed to load"));
        }
        Ok(())
    }
}
