//! # mail-adapters
//!
//! SMTP implementation of the [`MailSender`] port, built on lettre's async
//! transport. Every message goes out as a multipart/alternative pair of
//! plain text and HTML.

use async_trait::async_trait;
use domains::error::{Error, Result};
use domains::ports::{Mail, MailSender};
use lettre::message::header::{HeaderName, HeaderValue};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};

/// Connection settings for the SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Sender address used when a message carries no explicit `from`.
    pub default_from: String,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    default_from: String,
}

impl SmtpMailer {
    /// Builds a STARTTLS relay client. Connection setup is lazy; the first
    /// `send` performs the actual handshake.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|err| {
                tracing::error!(error = %err, host = %config.host, "smtp relay setup failed");
                Error::internal("smtp relay setup failed")
            })?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().to_string(),
            ))
            .build();
        Ok(SmtpMailer {
            transport,
            default_from: config.default_from.clone(),
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, mail: Mail) -> Result<()> {
        let message = build_message(&mail, &self.default_from)?;
        self.transport.send(message).await.map_err(|err| {
            tracing::error!(error = %err, "mail dispatch failed");
            Error::internal("mail dispatch failed")
        })?;
        tracing::debug!(to = ?mail.to, subject = %mail.subject, "mail dispatched");
        Ok(())
    }
}

fn build_message(mail: &Mail, default_from: &str) -> Result<Message> {
    let from = parse_mailbox("from", mail.from.as_deref().unwrap_or(default_from))?;
    let mut builder = Message::builder().from(from).subject(mail.subject.clone());
    for to in &mail.to {
        builder = builder.to(parse_mailbox("to", to)?);
    }

    let mut message = builder
        .multipart(MultiPart::alternative_plain_html(
            mail.body_plain.clone(),
            mail.body_html.clone(),
        ))
        .map_err(|err| {
            tracing::error!(error = %err, "message assembly failed");
            Error::internal("message assembly failed")
        })?;

    for (name, value) in &mail.extra_headers {
        let name = HeaderName::new_from_ascii(name.clone())
            .map_err(|_| Error::invalid_field("header", "bad value"))?;
        message
            .headers_mut()
            .insert_raw(HeaderValue::new(name, value.clone()));
    }
    Ok(message)
}

fn parse_mailbox(field: &str, raw: &str) -> Result<Mailbox> {
    raw.parse::<Mailbox>()
        .map_err(|_| Error::invalid_field(field, "bad address"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> Mail {
        Mail {
            from: None,
            to: vec!["guest@example.com".to_string()],
            subject: "Upcoming Event Reminder".to_string(),
            body_plain: "plain body".to_string(),
            body_html: "<p>html body</p>".to_string(),
            extra_headers: vec![("X-PM-Message-Stream".to_string(), "broadcast".to_string())],
        }
    }

    #[test]
    fn missing_from_falls_back_to_default() {
        let message = build_message(&mail(), "noreply@example.com").unwrap();
        let rendered = String::from_utf8(message.formatted()).unwrap();
        assert!(rendered.contains("From: noreply@example.com"));
        assert!(rendered.contains("To: guest@example.com"));
    }

    #[test]
    fn explicit_from_wins() {
        let mut mail = mail();
        mail.from = Some("host@example.com".to_string());
        let message = build_message(&mail, "noreply@example.com").unwrap();
        let rendered = String::from_utf8(message.formatted()).unwrap();
        assert!(rendered.contains("From: host@example.com"));
    }

    #[test]
    fn extra_headers_and_both_bodies_present() {
        let message = build_message(&mail(), "noreply@example.com").unwrap();
        let rendered = String::from_utf8(message.formatted()).unwrap();
        assert!(rendered.contains("X-PM-Message-Stream: broadcast"));
        assert!(rendered.contains("plain body"));
        assert!(rendered.contains("<p>html body</p>"));
        assert!(rendered.contains("multipart/alternative"));
    }

    #[test]
    fn bad_recipient_rejected() {
        let mut mail = mail();
        mail.to = vec!["not an address".to_string()];
        let err = build_message(&mail, "noreply@example.com").unwrap_err();
        assert!(err.to_string().contains("to"));
    }
}
