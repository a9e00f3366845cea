//! Outbound message composition
//!
//! Produces the raw payload handed to [`crate::MailboxSession::send_message`]:
//! the RFC 822 message encoded with the store's URL-safe base64 alphabet,
//! without padding.
//!
//! Messages without attachments are written as a literal header block and
//! body. Messages with attachments are built as `multipart/mixed` with
//! lettre. All validation (addresses, attachment files) happens before
//! anything is built.

mod address;

pub use address::{AddressField, is_valid_address, split_addresses, validate_list};

use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use std::path::{Path, PathBuf};

use crate::content::encode_body;
use crate::error::{MailboxError, Result};

/// Body content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyFormat {
    #[default]
    Plain,
    Html,
}

impl BodyFormat {
    /// `Content-Type` header value for a body in this format
    pub fn content_type(&self) -> &'static str {
        match self {
            BodyFormat::Plain => "text/plain; charset=utf-8",
            BodyFormat::Html => "text/html; charset=utf-8",
        }
    }
}

/// A message to be sent
///
/// Recipient fields are comma-separated lists.
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessage {
    pub format: BodyFormat,
    /// Sender header; when absent the store uses the account address
    pub from: Option<String>,
    pub to: String,
    pub cc: String,
    pub bcc: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

impl OutgoingMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn html(mut self) -> Self {
        self.format = BodyFormat::Html;
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = cc.into();
        self
    }

    pub fn bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc = bcc.into();
        self
    }

    pub fn attach(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }

    pub fn is_multipart(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Check recipients and attachment files
    pub fn validate(&self) -> Result<()> {
        validate_list(AddressField::To, &self.to)?;
        validate_list(AddressField::Cc, &self.cc)?;
        validate_list(AddressField::Bcc, &self.bcc)?;

        if let Some(missing) = self.attachments.iter().find(|p| !p.is_file()) {
            return Err(MailboxError::AttachmentNotFound(missing.clone()));
        }
        Ok(())
    }
}

/// Compose the raw, URL-safe base64 encoded payload for a message
pub fn compose(message: &OutgoingMessage) -> Result<String> {
    message.validate()?;

    let bytes = if message.is_multipart() {
        compose_multipart(message)?
    } else {
        compose_simple(message).into_bytes()
    };

    Ok(encode_body(&bytes))
}

/// Literal header block shared by both modes, without the terminating blank line
fn header_block(message: &OutgoingMessage) -> String {
    let mut raw = String::new();
    if let Some(from) = &message.from {
        raw.push_str(&format!("From: {}\r\n", from));
    }
    raw.push_str(&format!("To: {}\r\n", message.to));
    if !message.cc.trim().is_empty() {
        raw.push_str(&format!("Cc: {}\r\n", message.cc));
    }
    if !message.bcc.trim().is_empty() {
        raw.push_str(&format!("Bcc: {}\r\n", message.bcc));
    }
    raw.push_str(&format!("Subject: {}\r\n", message.subject));
    raw
}

fn compose_simple(message: &OutgoingMessage) -> String {
    let mut raw = header_block(message);
    raw.push_str(&format!("Content-Type: {}\r\n", message.format.content_type()));
    raw.push_str("\r\n");
    raw.push_str(&message.body);
    raw
}

// The store fills in the sender, so only the MIME body comes from lettre
fn compose_multipart(message: &OutgoingMessage) -> Result<Vec<u8>> {
    let text = match message.format {
        BodyFormat::Plain => SinglePart::plain(message.body.clone()),
        BodyFormat::Html => SinglePart::html(message.body.clone()),
    };

    let mut mixed = MultiPart::mixed().singlepart(text);
    for path in &message.attachments {
        mixed = mixed.singlepart(attachment_part(path)?);
    }

    let mut raw = header_block(message).into_bytes();
    raw.extend_from_slice(b"MIME-Version: 1.0\r\n");
    raw.extend_from_slice(&mixed.formatted());
    Ok(raw)
}

fn attachment_part(path: &Path) -> Result<SinglePart> {
    let content = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MailboxError::AttachmentNotFound(path.to_path_buf()),
        _ => MailboxError::Io(e),
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    let content_type = ContentType::parse(guess_mime_type(path))
        .map_err(|e| MailboxError::Compose(e.to_string()))?;

    Ok(Attachment::new(filename).body(content, content_type))
}

/// Content type for an attachment, from its file extension
fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "zip" => "application/zip",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::decode_body;
    use tempfile::tempdir;

    fn decoded(raw: &str) -> String {
        String::from_utf8(decode_body(raw).unwrap()).unwrap()
    }

    #[test]
    fn test_simple_plain_message() {
        let message = OutgoingMessage::new("a@b.com", "Hello", "Body text").cc("c@d.com");
        let raw = compose(&message).unwrap();

        assert!(!raw.contains('+') && !raw.contains('/') && !raw.contains('='));
        assert_eq!(
            decoded(&raw),
            "To: a@b.com\r\nCc: c@d.com\r\nSubject: Hello\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\r\nBody text"
        );
    }

    #[test]
    fn test_simple_html_message() {
        let raw = compose(&OutgoingMessage::new("a@b.com", "Hi", "<p>x</p>").html()).unwrap();
        let text = decoded(&raw);
        assert!(text.contains("Content-Type: text/html; charset=utf-8\r\n\r\n<p>x</p>"));
        assert!(!text.contains("Cc:"));
        assert!(!text.contains("Bcc:"));
    }

    #[test]
    fn test_invalid_address_names_offender_and_field() {
        let err = compose(&OutgoingMessage::new("a@b.com,bad-address", "s", "b")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid email address 'bad-address' in To field"
        );

        let err = compose(&OutgoingMessage::new("a@b.com", "s", "b").bcc("oops")).unwrap_err();
        assert!(matches!(
            err,
            MailboxError::InvalidAddress { field: AddressField::Bcc, .. }
        ));
    }

    #[test]
    fn test_missing_attachment() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.pdf");
        let err = compose(&OutgoingMessage::new("a@b.com", "s", "b").attach(&missing)).unwrap_err();
        assert!(matches!(err, MailboxError::AttachmentNotFound(p) if p == missing));
    }

    #[test]
    fn test_multipart_message() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "attached notes").unwrap();

        let message = OutgoingMessage::new("a@b.com", "Files", "See attached")
            .from("me@example.com")
            .bcc("hidden@example.com")
            .attach(&path);
        let text = decoded(&compose(&message).unwrap());

        assert!(text.starts_with("From: me@example.com\r\nTo: a@b.com\r\n"));
        assert!(text.contains("MIME-Version: 1.0\r\n"));
        assert!(text.contains("multipart/mixed"));
        assert!(text.contains("Bcc: hidden@example.com"));
        assert!(text.contains("Subject: Files"));
        assert!(text.contains("See attached"));
        assert!(text.contains("filename=\"notes.txt\""));
    }

    #[test]
    fn test_multipart_without_sender() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let message = OutgoingMessage::new("a@b.com", "s", "b").cc("c@d.com").attach(&path);
        let text = decoded(&compose(&message).unwrap());

        assert!(text.starts_with("To: a@b.com\r\nCc: c@d.com\r\nSubject: s\r\n"));
        assert!(!text.contains("From:"));
        assert!(text.contains("multipart/mixed"));
        assert!(text.contains("image/png"));
        assert!(text.contains("filename=\"photo.png\""));
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type(Path::new("a.PDF")), "application/pdf");
        assert_eq!(guess_mime_type(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(guess_mime_type(Path::new("blob")), "application/octet-stream");
    }
}
