//! Mailer port for report delivery.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Result type for mail delivery.
pub type MailerResult<T> = Result<T, MailerError>;

/// A rendered report ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    to: Vec<String>,
    cc: Vec<String>,
    subject: String,
    html_body: String,
}

impl OutgoingMail {
    /// Creates a message without CC recipients.
    #[must_use]
    pub fn new(
        to: impl IntoIterator<Item = String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into_iter().collect(),
            cc: Vec::new(),
            subject: subject.into(),
            html_body: html_body.into(),
        }
    }

    /// Sets the CC recipients.
    #[must_use]
    pub fn with_cc(mut self, cc: impl IntoIterator<Item = String>) -> Self {
        self.cc = cc.into_iter().collect();
        self
    }

    /// Returns the primary recipients.
    #[must_use]
    pub fn to(&self) -> &[String] {
        &self.to
    }

    /// Returns the CC recipients.
    #[must_use]
    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the HTML body.
    #[must_use]
    pub fn html_body(&self) -> &str {
        &self.html_body
    }
}

/// Report delivery contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers one message.
    async fn send(&self, mail: &OutgoingMail) -> MailerResult<()>;
}

/// Errors returned by mailer implementations.
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    /// The message has no primary recipient.
    #[error("mail has no recipients")]
    NoRecipients,

    /// The delivery endpoint refused the message.
    #[error("mail relay rejected the message ({status}): {body}")]
    Rejected {
        /// HTTP status returned by the relay.
        status: u16,
        /// Response body returned by the relay.
        body: String,
    },

    /// The delivery endpoint could not be reached.
    #[error("mail transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl MailerError {
    /// Wraps a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
