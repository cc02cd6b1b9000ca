//! Email service for student account and application notices.
//!
//! Supports multiple email providers:
//! - `console`: Logs emails (development, and whenever email is disabled)
//! - `smtp`: Sends via an SMTP relay with STARTTLS
//! - `sendgrid`: Uses the SendGrid v3 API

use crate::config::EmailConfig;
use domain::services::{AccountNotice, NoticeKind};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: String,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    http: reqwest::Client,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }

    /// Check if email service is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Render a notice into a plain-text message.
    pub fn render(&self, notice: &AccountNotice) -> EmailMessage {
        let name = &notice.recipient_name;
        let detail = notice.detail.as_deref().unwrap_or("your program");
        let portal = if self.config.base_url.is_empty() {
            String::new()
        } else {
            format!(" at {}", self.config.base_url)
        };

        let (subject, intro) = match notice.kind {
            NoticeKind::AccountApproved => (
                "Your ScholarSync account has been approved".to_string(),
                format!(
                    "Your account has been approved. You can now log in{} and apply to scholarship programs.",
                    portal
                ),
            ),
            NoticeKind::AccountRejected => (
                "Your ScholarSync registration was not approved".to_string(),
                "We were unable to approve your registration. Please contact the scholarship office if you believe this is a mistake.".to_string(),
            ),
            NoticeKind::ExpiryWarning => (
                "Your ScholarSync account will expire soon".to_string(),
                format!(
                    "Your account is nearing the end of its active period. It will be deactivated in about a month and deleted a month after that. Please log in{} and download any documents you want to keep.",
                    portal
                ),
            ),
            NoticeKind::ApplicationApproved => (
                format!("Your application for {} has been approved", detail),
                format!(
                    "Congratulations! Your application for {} has been approved. Log in{} to read the remarks from the scholarship office.",
                    detail, portal
                ),
            ),
            NoticeKind::ApplicationRejected => (
                format!("Update on your application for {}", detail),
                format!(
                    "Your application for {} was not approved. Log in{} to read the remarks from the scholarship office.",
                    detail, portal
                ),
            ),
        };

        let body_text = format!(
            "Hi {name},\n\n{intro}\n\nBest regards,\n{sender}",
            name = name,
            intro = intro,
            sender = self.config.sender_name
        );

        EmailMessage {
            to: notice.recipient_email.clone(),
            to_name: Some(name.clone()).filter(|n| !n.is_empty()),
            subject,
            body_text,
        }
    }

    /// Send an email message through the configured provider.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, logging only"
            );
            return self.send_console(message).await;
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "smtp" => self.send_smtp(message).await,
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured(format!(
                    "unknown provider {}",
                    provider
                )))
            }
        }
    }

    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            "Email (console provider)"
        );
        debug!(body_text = %message.body_text, "Email body");
        Ok(())
    }

    fn mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, EmailError> {
        let address = address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(address.to_string()))?;
        Ok(Mailbox::new(name.map(str::to_string), address))
    }

    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.smtp_host.is_empty() {
            return Err(EmailError::NotConfigured("smtp_host is empty".into()));
        }

        let email = Message::builder()
            .from(Self::mailbox(
                Some(&self.config.sender_name),
                &self.config.sender_email,
            )?)
            .to(Self::mailbox(message.to_name.as_deref(), &message.to)?)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body_text.clone())
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| EmailError::NotConfigured(e.to_string()))?
                .port(self.config.smtp_port);
        if !self.config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ));
        }

        builder
            .build()
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(format!("SMTP delivery failed: {}", e)))?;

        info!(
            to = %message.to,
            subject = %message.subject,
            "Email sent via SMTP"
        );
        Ok(())
    }

    fn sendgrid_body(&self, message: &EmailMessage) -> serde_json::Value {
        let mut recipient = serde_json::json!({ "email": message.to });
        if let Some(name) = &message.to_name {
            recipient["name"] = serde_json::json!(name);
        }

        serde_json::json!({
            "personalizations": [{ "to": [recipient] }],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": [{
                "type": "text/plain",
                "value": message.body_text
            }]
        })
    }

    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured(
                "sendgrid_api_key is empty".into(),
            ));
        }

        let response = self
            .http
            .post(SENDGRID_URL)
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&self.sendgrid_body(&message))
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(
                to = %message.to,
                subject = %message.subject,
                "Email sent via SendGrid"
            );
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_body, "SendGrid API error");
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }
}
