//! HTTP mail relay: posts rendered reports as JSON to a delivery endpoint.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::worklog::ports::{Mailer, MailerError, MailerResult, OutgoingMail};

/// Mailer that hands messages to an HTTP relay.
///
/// The relay receives `{ "to", "cc", "subject", "htmlBody" }` and is
/// expected to answer with a 2xx status once the message is queued.
#[derive(Debug, Clone)]
pub struct HttpRelayMailer {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    to: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    cc: &'a [String],
    subject: &'a str,
    html_body: &'a str,
}

impl HttpRelayMailer {
    /// Creates a relay mailer with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> MailerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MailerError::transport)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_token: None,
        })
    }

    /// Sends a bearer token with every request.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    async fn send(&self, mail: &OutgoingMail) -> MailerResult<()> {
        if mail.to().is_empty() {
            return Err(MailerError::NoRecipients);
        }

        let body = RelayRequest {
            to: mail.to(),
            cc: mail.cc(),
            subject: mail.subject(),
            html_body: mail.html_body(),
        };

        tracing::info!(
            endpoint = %self.endpoint,
            recipients = mail.to().len(),
            cc = mail.cc().len(),
            subject = mail.subject(),
            "posting report to mail relay"
        );

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(MailerError::transport)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(MailerError::Rejected { status, body: text });
        }
        Ok(())
    }
}
