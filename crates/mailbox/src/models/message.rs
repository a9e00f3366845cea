//! Message model representing a stored mail message and its MIME tree

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::LabelId;

/// Unique identifier for a message (store-assigned, opaque)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How much of a message to fetch from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fidelity {
    /// Id, timestamp and labels only
    Minimal,
    /// Complete MIME tree
    Full,
}

impl Fidelity {
    /// Format parameter understood by the Gmail API
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Fidelity::Minimal => "minimal",
            Fidelity::Full => "full",
        }
    }
}

/// Email header (name-value pair)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Body of a MIME part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartBody {
    /// Body data carried inline, URL-safe base64 encoded
    Inline(String),
    /// Body stored separately; fetch it with the attachment id
    Attachment { attachment_id: String, size: u64 },
}

impl PartBody {
    /// Inline encoded data, if any
    pub fn inline_data(&self) -> Option<&str> {
        match self {
            PartBody::Inline(data) => Some(data),
            PartBody::Attachment { .. } => None,
        }
    }
}

/// One node of a message's MIME tree
///
/// A part with a filename is an attachment; a part without one is inline
/// content. Children are kept in their original order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimePart {
    pub mime_type: String,
    pub filename: Option<String>,
    pub headers: Vec<Header>,
    pub body: Option<PartBody>,
    pub parts: Vec<MimePart>,
}

impl MimePart {
    /// Create an empty part of the given MIME type
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            filename: None,
            headers: Vec::new(),
            body: None,
            parts: Vec::new(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// Set an inline body from already-encoded data
    pub fn with_data(mut self, encoded: impl Into<String>) -> Self {
        self.body = Some(PartBody::Inline(encoded.into()));
        self
    }

    /// Set an inline body, encoding the given bytes
    pub fn with_content(self, content: impl AsRef<[u8]>) -> Self {
        let encoded = crate::content::encode_body(content.as_ref());
        self.with_data(encoded)
    }

    pub fn with_attachment_id(mut self, attachment_id: impl Into<String>, size: u64) -> Self {
        self.body = Some(PartBody::Attachment {
            attachment_id: attachment_id.into(),
            size,
        });
        self
    }

    pub fn with_part(mut self, part: MimePart) -> Self {
        self.parts.push(part);
        self
    }

    /// Whether this part is an attachment (has a non-empty filename)
    pub fn is_attachment(&self) -> bool {
        self.filename.as_deref().is_some_and(|f| !f.is_empty())
    }
}

/// A message snapshot fetched from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Store message ID
    pub id: MessageId,
    /// Store-assigned internal timestamp (milliseconds since epoch)
    pub internal_date: i64,
    /// Label IDs currently applied (unordered)
    pub label_ids: Vec<LabelId>,
    /// Short preview provided by the store
    pub snippet: Option<String>,
    /// MIME tree; absent for minimal fetches
    pub payload: Option<MimePart>,
}

impl Message {
    /// Create a new message builder
    pub fn builder(id: impl Into<MessageId>) -> MessageBuilder {
        MessageBuilder::new(id.into())
    }

    /// Whether the message currently carries a label
    pub fn has_label(&self, label: &str) -> bool {
        self.label_ids.iter().any(|l| l.as_str() == label)
    }

    /// Look up a top-level header by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Internal timestamp as a UTC datetime
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.internal_date).single()
    }
}

/// Builder for creating Message instances
pub struct MessageBuilder {
    id: MessageId,
    internal_date: i64,
    label_ids: Vec<LabelId>,
    snippet: Option<String>,
    payload: Option<MimePart>,
}

impl MessageBuilder {
    fn new(id: MessageId) -> Self {
        Self {
            id,
            internal_date: 0,
            label_ids: Vec::new(),
            snippet: None,
            payload: None,
        }
    }

    pub fn internal_date(mut self, internal_date: i64) -> Self {
        self.internal_date = internal_date;
        self
    }

    pub fn labels<I, L>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<LabelId>,
    {
        self.label_ids = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn payload(mut self, payload: MimePart) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn build(self) -> Message {
        Message {
            id: self.id,
            internal_date: self.internal_date,
            label_ids: self.label_ids,
            snippet: self.snippet,
            payload: self.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let msg = Message::builder("m1")
            .payload(MimePart::new("text/plain").with_header("SUBJECT", "Hello"))
            .build();

        assert_eq!(msg.header("subject"), Some("Hello"));
        assert_eq!(msg.header("From"), None);
    }

    #[test]
    fn test_header_without_payload() {
        let msg = Message::builder("m1").build();
        assert_eq!(msg.header("Subject"), None);
    }

    #[test]
    fn test_has_label() {
        let msg = Message::builder("m1").labels(["INBOX", "UNREAD"]).build();
        assert!(msg.has_label("UNREAD"));
        assert!(!msg.has_label("SPAM"));
    }

    #[test]
    fn test_is_attachment_requires_non_empty_filename() {
        assert!(MimePart::new("application/pdf").with_filename("a.pdf").is_attachment());
        assert!(!MimePart::new("text/plain").with_filename("").is_attachment());
        assert!(!MimePart::new("text/plain").is_attachment());
    }

    #[test]
    fn test_received_at() {
        let msg = Message::builder("m1").internal_date(1_700_000_000_000).build();
        assert_eq!(msg.received_at().unwrap().timestamp(), 1_700_000_000);
    }
}
