//! Email message types and builder.

use super::MailError;

/// A file carried by an [`Email`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Name presented to the recipient in `Content-Disposition`.
    pub filename: String,
    /// MIME type of `data`.
    pub content_type: String,
    /// Raw file content; encoded as base64 on the wire.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Create an attachment, guessing the content type from the file name.
    pub fn from_file_name(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();
        Self {
            filename,
            content_type,
            data,
        }
    }
}

/// A complete email message ready to send.
#[derive(Debug, Clone)]
pub struct Email {
    /// Sender address.
    pub from: String,
    /// Primary recipients, used verbatim.
    pub to: Vec<String>,
    /// Email subject line.
    pub subject: String,
    /// Plain text body.
    pub text: String,
    /// Files attached after the body, in order.
    pub attachments: Vec<Attachment>,
}

impl Email {
    /// Create a new email builder.
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }
}

/// Builder for constructing [`Email`] instances.
#[derive(Debug, Default)]
pub struct EmailBuilder {
    from: Option<String>,
    to: Vec<String>,
    subject: Option<String>,
    text: Option<String>,
    attachments: Vec<Attachment>,
}

impl EmailBuilder {
    /// Set the sender address (required).
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    /// Add a primary recipient.
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set plain text body content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append an attachment.
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Build the email, validating required fields.
    pub fn build(self) -> Result<Email, MailError> {
        if self.to.is_empty() {
            return Err(MailError::Build("at least one recipient required".into()));
        }

        let from = self
            .from
            .ok_or_else(|| MailError::Build("from address required".into()))?;

        let subject = self
            .subject
            .ok_or_else(|| MailError::Build("subject required".into()))?;

        let text = self
            .text
            .ok_or_else(|| MailError::Build("body required".into()))?;

        Ok(Email {
            from,
            to: self.to,
            subject,
            text,
            attachments: self.attachments,
        })
    }
}
