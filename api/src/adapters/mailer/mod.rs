//! Outbound mail adapters

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::ports::Notifier;
use crate::error::NotificationError;

/// Transactional mail over an HTTP JSON API
pub struct HttpMailer {
    http: Client,
    api_url: String,
    api_token: String,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_token: String, from: String) -> Self {
        Self {
            http: Client::new(),
            api_url,
            api_token,
            from,
        }
    }
}

#[derive(Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&MailRequest {
                from: &self.from,
                to,
                subject,
                text: body,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(NotificationError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Notifier that only logs, used when no mail API is configured
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotificationError> {
        tracing::info!(to = %to, subject = %subject, "Mail delivery disabled, message dropped");
        Ok(())
    }
}

/// Either mail backend, chosen at startup
pub enum Mailer {
    Http(HttpMailer),
    Log(LogNotifier),
}

#[async_trait]
impl Notifier for Mailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        match self {
            Mailer::Http(m) => m.send(to, subject, body).await,
            Mailer::Log(m) => m.send(to, subject, body).await,
        }
    }
}
