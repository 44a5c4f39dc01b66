//! Operator email notifications for recorded RSVPs.
//!
//! Supported providers:
//! - `console`: logs the notice (development)
//! - `smtp`: sends via an SMTP relay with STARTTLS
//! - `sendgrid`: uses the SendGrid v3 HTTP API

use async_trait::async_trait;
use domain::services::{NotificationResult, RsvpNotice, RsvpNotifier};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::{fmt, str::FromStr, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::NotificationConfig;
use crate::middleware::metrics::record_notification;

const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

/// Errors that can occur while delivering a notice.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email provider not configured: {0}")]
    NotConfigured(String),

    #[error("Unknown email provider: {0}")]
    UnknownProvider(String),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Timed out after {0} ms")]
    Timeout(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProvider {
    Console,
    Smtp,
    SendGrid,
}

impl FromStr for EmailProvider {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "smtp" => Ok(Self::Smtp),
            "sendgrid" => Ok(Self::SendGrid),
            other => Err(EmailError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Console => "console",
            Self::Smtp => "smtp",
            Self::SendGrid => "sendgrid",
        };
        f.write_str(name)
    }
}

/// Sends each recorded RSVP to the operator's inbox.
#[derive(Clone)]
pub struct EmailNotifier {
    config: Arc<NotificationConfig>,
    http: reqwest::Client,
}

impl EmailNotifier {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms.max(1))
    }

    /// Primary provider first, then the fallback when it differs.
    fn providers(&self) -> Vec<Result<EmailProvider, EmailError>> {
        let mut providers = vec![self.config.provider.parse::<EmailProvider>()];
        if let Some(fallback) = self
            .config
            .fallback_provider
            .as_deref()
            .filter(|f| !f.trim().is_empty())
        {
            let fallback = fallback.parse::<EmailProvider>();
            let duplicate = matches!(
                (&providers[0], &fallback),
                (Ok(a), Ok(b)) if a == b
            );
            if !duplicate {
                providers.push(fallback);
            }
        }
        providers
    }

    async fn send_with(&self, provider: EmailProvider, notice: &RsvpNotice) -> Result<(), EmailError> {
        let attempt = async {
            match provider {
                EmailProvider::Console => self.send_console(notice),
                EmailProvider::Smtp => self.send_smtp(notice).await,
                EmailProvider::SendGrid => self.send_sendgrid(notice).await,
            }
        };

        tokio::time::timeout(self.timeout(), attempt)
            .await
            .map_err(|_| EmailError::Timeout(self.config.timeout_ms))?
    }

    fn send_console(&self, notice: &RsvpNotice) -> Result<(), EmailError> {
        info!(
            to = %self.config.notify_email,
            from = %self.config.sender_email,
            subject = %notice.subject(),
            "RSVP notification (console provider)"
        );
        debug!(body = %notice.body(), "RSVP notification body");
        Ok(())
    }

    fn build_message(&self, notice: &RsvpNotice) -> Result<Message, EmailError> {
        let from = Mailbox::new(
            Some(self.config.sender_name.clone()),
            self.config.sender_email.parse()?,
        );
        let to: Mailbox = self.config.notify_email.parse()?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(notice.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(notice.body())
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    async fn send_smtp(&self, notice: &RsvpNotice) -> Result<(), EmailError> {
        if self.config.smtp_host.trim().is_empty() {
            return Err(EmailError::NotConfigured("smtp_host is empty".to_string()));
        }

        let message = self.build_message(notice)?;

        let mut transport =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port)
                .timeout(Some(self.timeout()));

        if !self.config.smtp_username.is_empty() {
            transport = transport.credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ));
        }

        transport.build().send(message).await?;
        info!(code = %notice.code, "RSVP notification sent via SMTP");
        Ok(())
    }

    async fn send_sendgrid(&self, notice: &RsvpNotice) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured(
                "sendgrid_api_key is empty".to_string(),
            ));
        }

        let body = serde_json::json!({
            "personalizations": [{ "to": [{ "email": self.config.notify_email }] }],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": notice.subject(),
            "content": [{ "type": "text/plain", "value": notice.body() }]
        });

        let response = self
            .http
            .post(SENDGRID_ENDPOINT)
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(code = %notice.code, "RSVP notification sent via SendGrid");
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(EmailError::SendFailed(format!(
                "SendGrid returned {}: {}",
                status, text
            )))
        }
    }
}

#[async_trait]
impl RsvpNotifier for EmailNotifier {
    async fn notify(&self, notice: &RsvpNotice) -> NotificationResult {
        if !self.config.enabled {
            debug!(code = %notice.code, "Notifications disabled, skipping");
            record_notification(NotificationResult::Skipped.as_str());
            return NotificationResult::Skipped;
        }

        let mut failures = Vec::new();
        for provider in self.providers() {
            let outcome = match provider {
                Ok(provider) => self
                    .send_with(provider, notice)
                    .await
                    .map_err(|e| format!("{}: {}", provider, e)),
                Err(e) => Err(e.to_string()),
            };

            match outcome {
                Ok(()) => {
                    record_notification(NotificationResult::Sent.as_str());
                    return NotificationResult::Sent;
                }
                Err(reason) => {
                    warn!(code = %notice.code, error = %reason, "RSVP notification attempt failed");
                    failures.push(reason);
                }
            }
        }

        let result = NotificationResult::Failed(failures.join("; "));
        record_notification(result.as_str());
        result
    }
}
