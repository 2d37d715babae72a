//! Mailer traits and SMTP implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::{ContentDisposition, ContentTransferEncoding, ContentType};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::PoolConfig;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;

use super::{Attachment, Email, MailError};

/// Something that can open authenticated sessions against a relay.
///
/// Implement this to swap the SMTP backend out, e.g. for a recording mailer in tests.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    type Session: MailSession;

    /// Connect and authenticate. Fails before any message is accepted.
    async fn open_session(&self, login: &Login) -> Result<Self::Session, MailError>;
}

/// One authenticated relay session, used sequentially for a whole batch.
#[async_trait]
pub trait MailSession: Send {
    /// Send one message through the session.
    async fn send(&mut self, email: &Email) -> Result<(), MailError>;

    /// Release the session. Sends after this fail.
    async fn close(&mut self);
}

/// Username/password pair presented to the relay.
#[derive(Clone)]
pub struct Login {
    pub username: String,
    pub password: String,
}

impl Login {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain connection upgraded with STARTTLS.
    #[default]
    Starttls,
    /// Implicit TLS from the first byte.
    Tls,
    /// No encryption at all. Only for local relays.
    None,
}

/// Configuration for the SMTP relay.
#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    /// SMTP server hostname.
    #[serde(default = "default_host")]
    pub host: String,

    /// SMTP server port (default: 587).
    #[serde(default = "default_port")]
    pub port: u16,

    /// TLS mode (default: starttls).
    #[serde(default)]
    pub tls: TlsMode,

    /// Connection timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls: TlsMode::default(),
            timeout: default_timeout(),
        }
    }
}

fn default_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_port() -> u16 {
    587
}

fn default_timeout() -> u64 {
    10
}

/// SMTP-based mailer using lettre.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: MailerConfig,
}

impl SmtpMailer {
    /// Create a mailer from explicit configuration.
    pub fn from_config(config: MailerConfig) -> Result<Self, MailError> {
        if config.host.trim().is_empty() {
            return Err(MailError::Config("smtp host is empty".into()));
        }
        Ok(Self { config })
    }

    fn transport(&self, login: &Login) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let config = &self.config;
        let builder = match config.tls {
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailError::Transport(e.to_string()))?,
            TlsMode::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::Transport(e.to_string()))?,
        };

        Ok(builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout)))
            .credentials(Credentials::new(
                login.username.clone(),
                login.password.clone(),
            ))
            .pool_config(PoolConfig::new().max_size(1))
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    type Session = SmtpSession;

    async fn open_session(&self, login: &Login) -> Result<SmtpSession, MailError> {
        let transport = self.transport(login)?;

        // Connecting runs EHLO, STARTTLS and AUTH, so a bad login surfaces here.
        match transport.test_connection().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(MailError::Transport(format!(
                    "relay {}:{} did not respond",
                    self.config.host, self.config.port
                )))
            }
            Err(e) if e.is_permanent() => return Err(MailError::AuthRejected(e.to_string())),
            Err(e) => return Err(MailError::Transport(e.to_string())),
        }

        tracing::debug!(
            host = %self.config.host,
            port = self.config.port,
            user = %login.username,
            "smtp session open"
        );
        Ok(SmtpSession {
            transport: Some(transport),
        })
    }
}

/// Session over a single pooled SMTP connection.
pub struct SmtpSession {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

#[async_trait]
impl MailSession for SmtpSession {
    async fn send(&mut self, email: &Email) -> Result<(), MailError> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| MailError::Transport("session already closed".into()))?;
        let message = build_message(email)?;

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }

    async fn close(&mut self) {
        if self.transport.take().is_some() {
            tracing::debug!("smtp session closed");
        }
    }
}

/// Build a lettre Message from our Email type.
fn build_message(email: &Email) -> Result<Message, MailError> {
    let from: Mailbox = email
        .from
        .parse()
        .map_err(|_| MailError::InvalidAddress(email.from.clone()))?;

    let mut builder = Message::builder().from(from);

    for to in &email.to {
        let mailbox: Mailbox = to
            .parse()
            .map_err(|_| MailError::InvalidAddress(to.clone()))?;
        builder = builder.to(mailbox);
    }

    builder = builder.subject(&email.subject);

    let mut body = MultiPart::mixed().singlepart(SinglePart::plain(email.text.clone()));
    for attachment in &email.attachments {
        body = body.singlepart(attachment_part(attachment)?);
    }

    builder
        .multipart(body)
        .map_err(|e| MailError::Build(e.to_string()))
}

fn attachment_part(attachment: &Attachment) -> Result<SinglePart, MailError> {
    let content_type = ContentType::parse(&attachment.content_type)
        .map_err(|e| MailError::Build(format!("{}: {e}", attachment.content_type)))?;

    Ok(SinglePart::builder()
        .header(content_type)
        .header(ContentTransferEncoding::Base64)
        .header(ContentDisposition::attachment(&attachment.filename))
        .body(attachment.data.clone()))
}
