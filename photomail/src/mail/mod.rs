//! Outbound mail: message values and the relay session they are sent through.
//!
//! The pipeline only needs two things from a mail backend: open one
//! authenticated session per batch and push messages through it in order.
//! [`Mailer`] and [`MailSession`] capture that, [`SmtpMailer`] implements it
//! on top of [lettre](https://lettre.rs).
//!
//! ```ignore
//! let mailer = SmtpMailer::from_config(config.smtp.clone())?;
//! let mut session = mailer.open_session(&Login::new(sender, password)).await?;
//!
//! let email = Email::builder()
//!     .from(sender)
//!     .to("guest@example.com")
//!     .subject("Your Photos")
//!     .text("Hello Ada,\n\nPlease find your photos attached.")
//!     .attach(Attachment::from_file_name("EVT0042.jpg", bytes))
//!     .build()?;
//! session.send(&email).await?;
//! session.close().await;
//! ```

mod mailer;
mod message;

pub use mailer::{Login, MailSession, Mailer, MailerConfig, SmtpMailer, SmtpSession, TlsMode};
pub use message::{Attachment, Email, EmailBuilder};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mailer config: {0}")]
    Config(String),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("relay rejected login: {0}")]
    AuthRejected(String),

    #[error("SMTP error: {0}")]
    Transport(String),
}
