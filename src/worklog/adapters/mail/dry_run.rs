//! Mailer that only logs what it would have sent.

use async_trait::async_trait;

use crate::worklog::ports::{Mailer, MailerError, MailerResult, OutgoingMail};

/// Logs each message at `info` and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunMailer;

#[async_trait]
impl Mailer for DryRunMailer {
    async fn send(&self, mail: &OutgoingMail) -> MailerResult<()> {
        if mail.to().is_empty() {
            return Err(MailerError::NoRecipients);
        }
        tracing::info!(
            to = ?mail.to(),
            cc = ?mail.cc(),
            subject = mail.subject(),
            body_bytes = mail.html_body().len(),
            "dry run: report not delivered"
        );
        tracing::debug!(body = mail.html_body(), "dry run report body");
        Ok(())
    }
}
