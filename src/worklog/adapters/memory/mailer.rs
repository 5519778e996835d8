//! Mailer that records messages instead of delivering them.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::worklog::ports::{Mailer, MailerError, MailerResult, OutgoingMail};

/// Thread-safe recording mailer.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    state: Arc<RwLock<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    sent: Vec<OutgoingMail>,
    failing: bool,
    latency: Option<Duration>,
}

impl RecordingMailer {
    /// Creates a mailer with no recorded messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.state
            .read()
            .map(|state| state.sent.clone())
            .unwrap_or_default()
    }

    /// Makes subsequent sends fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut state) = self.state.write() {
            state.failing = failing;
        }
    }

    /// Delays every subsequent send by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut state) = self.state.write() {
            state.latency = latency;
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> MailerResult<()> {
        if mail.to().is_empty() {
            return Err(MailerError::NoRecipients);
        }
        let latency = self.state.read().ok().and_then(|state| state.latency);
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        let mut state = self
            .state
            .write()
            .map_err(|err| MailerError::transport(std::io::Error::other(err.to_string())))?;
        if state.failing {
            return Err(MailerError::transport(std::io::Error::other(
                "recording mailer set to fail",
            )));
        }
        state.sent.push(mail.clone());
        Ok(())
    }
}
