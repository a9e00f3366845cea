//! In-memory session implementation
//!
//! A deterministic fake store used by tests. Queries are not parsed: each
//! query string maps to a registered list of message IDs, and the empty query
//! matches every stored message. Every call is recorded so tests can assert
//! on the exact traffic an operation generated.

use anyhow::{Context, Result, anyhow, bail};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{MailboxSession, MessagePage};
use crate::models::{Fidelity, LabelId, Message, MessageId, UserLabel};

/// A call made against the in-memory session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    List { query: String, page_token: Option<String> },
    Get { id: MessageId, fidelity: Fidelity },
    GetAttachment { message_id: MessageId, attachment_id: String },
    Modify { id: MessageId, add: Vec<LabelId>, remove: Vec<LabelId> },
    Trash(MessageId),
    Untrash(MessageId),
    Send,
    ListLabels,
    CreateLabel(String),
    UpdateLabel(LabelId),
    DeleteLabel(LabelId),
}

/// In-memory implementation of MailboxSession
pub struct InMemorySession {
    messages: RwLock<Vec<Message>>,
    queries: RwLock<HashMap<String, Vec<MessageId>>>,
    attachments: RwLock<HashMap<(MessageId, String), String>>,
    labels: RwLock<Vec<UserLabel>>,
    sent: RwLock<Vec<String>>,
    calls: RwLock<Vec<SessionCall>>,
    page_size: usize,
    label_seq: AtomicUsize,
    disposals: AtomicUsize,
}

impl InMemorySession {
    /// Create an empty store holding the usual system labels
    pub fn new() -> Self {
        let labels = [
            LabelId::INBOX,
            LabelId::SPAM,
            LabelId::TRASH,
            LabelId::UNREAD,
            LabelId::STARRED,
            LabelId::SENT,
        ]
        .into_iter()
        .map(|id| UserLabel::system(id, id))
        .collect();

        Self {
            messages: RwLock::new(Vec::new()),
            queries: RwLock::new(HashMap::new()),
            attachments: RwLock::new(HashMap::new()),
            labels: RwLock::new(labels),
            sent: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
            page_size: 100,
            label_seq: AtomicUsize::new(1),
            disposals: AtomicUsize::new(0),
        }
    }

    /// Set how many IDs each listing page returns
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Store a message (full fidelity)
    pub fn add_message(&self, message: Message) {
        let mut messages = self.messages.write().unwrap();
        messages.retain(|m| m.id != message.id);
        messages.push(message);
    }

    /// Register the IDs a query resolves to, in listing order
    pub fn add_query<I, M>(&self, query: impl Into<String>, ids: I)
    where
        I: IntoIterator<Item = M>,
        M: Into<MessageId>,
    {
        self.queries
            .write()
            .unwrap()
            .insert(query.into(), ids.into_iter().map(Into::into).collect());
    }

    /// Store an attachment body (URL-safe base64 encoded)
    pub fn add_attachment(
        &self,
        message_id: impl Into<MessageId>,
        attachment_id: impl Into<String>,
        encoded: impl Into<String>,
    ) {
        self.attachments
            .write()
            .unwrap()
            .insert((message_id.into(), attachment_id.into()), encoded.into());
    }

    /// Store a label definition as-is
    pub fn add_label(&self, label: UserLabel) {
        self.labels.write().unwrap().push(label);
    }

    /// Current state of a stored message
    pub fn message(&self, id: &str) -> Option<Message> {
        self.messages
            .read()
            .unwrap()
            .iter()
            .find(|m| m.id.as_str() == id)
            .cloned()
    }

    /// Current label definitions
    pub fn labels(&self) -> Vec<UserLabel> {
        self.labels.read().unwrap().clone()
    }

    /// Raw payloads passed to `send_message`
    pub fn sent_messages(&self) -> Vec<String> {
        self.sent.read().unwrap().clone()
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Number of `modify_message` calls made for one message
    pub fn modify_count(&self, id: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, SessionCall::Modify { id: m, .. } if m.as_str() == id))
            .count()
    }

    /// Number of times `dispose` was called
    pub fn dispose_count(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }

    fn record(&self, call: SessionCall) {
        self.calls.write().unwrap().push(call);
    }

    fn update_labels(&self, id: &MessageId, add: &[LabelId], remove: &[LabelId]) -> Result<()> {
        let mut messages = self.messages.write().unwrap();
        let message = messages
            .iter_mut()
            .find(|m| &m.id == id)
            .with_context(|| format!("Message {} not found", id))?;

        message.label_ids.retain(|l| !remove.contains(l));
        for label in add {
            if !message.label_ids.contains(label) {
                message.label_ids.push(label.clone());
            }
        }
        Ok(())
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl MailboxSession for InMemorySession {
    fn list_messages(&self, query: &str, page_token: Option<&str>) -> Result<MessagePage> {
        self.record(SessionCall::List {
            query: query.to_string(),
            page_token: page_token.map(str::to_string),
        });

        let ids: Vec<MessageId> = match self.queries.read().unwrap().get(query) {
            Some(ids) => ids.clone(),
            None if query.is_empty() => self
                .messages
                .read()
                .unwrap()
                .iter()
                .map(|m| m.id.clone())
                .collect(),
            None => Vec::new(),
        };

        let offset = match page_token {
            Some(token) if !token.is_empty() => token
                .parse::<usize>()
                .with_context(|| format!("Invalid page token: {}", token))?,
            _ => 0,
        };

        let end = (offset + self.page_size).min(ids.len());
        let page = ids.get(offset..end).unwrap_or_default().to_vec();
        let next_page_token = (end < ids.len()).then(|| end.to_string());

        Ok(MessagePage {
            ids: page,
            next_page_token,
        })
    }

    fn get_message(&self, id: &MessageId, fidelity: Fidelity) -> Result<Message> {
        self.record(SessionCall::Get {
            id: id.clone(),
            fidelity,
        });

        let mut message = self
            .message(id.as_str())
            .with_context(|| format!("Message {} not found", id))?;
        if fidelity == Fidelity::Minimal {
            message.payload = None;
        }
        Ok(message)
    }

    fn get_attachment(&self, message_id: &MessageId, attachment_id: &str) -> Result<String> {
        self.record(SessionCall::GetAttachment {
            message_id: message_id.clone(),
            attachment_id: attachment_id.to_string(),
        });

        self.attachments
            .read()
            .unwrap()
            .get(&(message_id.clone(), attachment_id.to_string()))
            .cloned()
            .with_context(|| format!("Attachment {} of message {} not found", attachment_id, message_id))
    }

    fn modify_message(&self, id: &MessageId, add: &[LabelId], remove: &[LabelId]) -> Result<()> {
        self.record(SessionCall::Modify {
            id: id.clone(),
            add: add.to_vec(),
            remove: remove.to_vec(),
        });
        self.update_labels(id, add, remove)
    }

    fn trash_message(&self, id: &MessageId) -> Result<()> {
        self.record(SessionCall::Trash(id.clone()));
        self.update_labels(id, &[LabelId::TRASH.into()], &[LabelId::INBOX.into()])
    }

    fn untrash_message(&self, id: &MessageId) -> Result<()> {
        self.record(SessionCall::Untrash(id.clone()));
        self.update_labels(id, &[], &[LabelId::TRASH.into()])
    }

    fn send_message(&self, raw: &str) -> Result<()> {
        self.record(SessionCall::Send);
        self.sent.write().unwrap().push(raw.to_string());
        Ok(())
    }

    fn list_labels(&self) -> Result<Vec<UserLabel>> {
        self.record(SessionCall::ListLabels);
        Ok(self.labels())
    }

    fn create_label(&self, label: &UserLabel) -> Result<UserLabel> {
        self.record(SessionCall::CreateLabel(label.name.clone()));

        let mut labels = self.labels.write().unwrap();
        if labels.iter().any(|l| l.name == label.name) {
            bail!("Label name exists or conflicts: {}", label.name);
        }

        let seq = self.label_seq.fetch_add(1, Ordering::SeqCst);
        let created = UserLabel {
            id: LabelId::new(format!("Label_{}", seq)),
            ..label.clone()
        };
        labels.push(created.clone());
        Ok(created)
    }

    fn update_label(&self, label: &UserLabel) -> Result<UserLabel> {
        self.record(SessionCall::UpdateLabel(label.id.clone()));

        let mut labels = self.labels.write().unwrap();
        let existing = labels
            .iter_mut()
            .find(|l| l.id == label.id)
            .with_context(|| format!("Label {} not found", label.id.as_str()))?;
        *existing = label.clone();
        Ok(label.clone())
    }

    fn delete_label(&self, id: &LabelId) -> Result<()> {
        self.record(SessionCall::DeleteLabel(id.clone()));

        let mut labels = self.labels.write().unwrap();
        let index = labels
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| anyhow!("Label {} not found", id.as_str()))?;
        if labels[index].is_system() {
            bail!("Invalid delete request: {} is a system label", id.as_str());
        }
        labels.remove(index);
        Ok(())
    }

    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(ids: &[&str]) -> InMemorySession {
        let session = InMemorySession::new().with_page_size(2);
        for (i, id) in ids.iter().enumerate() {
            session.add_message(
                Message::builder(*id)
                    .internal_date(i as i64)
                    .labels([LabelId::INBOX])
                    .build(),
            );
        }
        session
    }

    #[test]
    fn test_pagination_tokens() {
        let session = store_with(&["a", "b", "c"]);

        let first = session.list_messages("", None).unwrap();
        assert_eq!(first.ids.len(), 2);
        assert_eq!(first.next_page_token.as_deref(), Some("2"));

        let second = session.list_messages("", Some("2")).unwrap();
        assert_eq!(second.ids, vec![MessageId::new("c")]);
        assert_eq!(second.next_page_token, None);
    }

    #[test]
    fn test_unregistered_query_matches_nothing() {
        let session = store_with(&["a"]);
        let page = session.list_messages("from:nobody", None).unwrap();
        assert!(page.ids.is_empty());
    }

    #[test]
    fn test_minimal_fetch_strips_payload() {
        let session = InMemorySession::new();
        session.add_message(
            Message::builder("a")
                .payload(crate::models::MimePart::new("text/plain"))
                .build(),
        );

        let minimal = session.get_message(&"a".into(), Fidelity::Minimal).unwrap();
        assert!(minimal.payload.is_none());
        let full = session.get_message(&"a".into(), Fidelity::Full).unwrap();
        assert!(full.payload.is_some());
    }

    #[test]
    fn test_trash_and_untrash_labels() {
        let session = store_with(&["a"]);
        session.trash_message(&"a".into()).unwrap();
        let msg = session.message("a").unwrap();
        assert!(msg.has_label(LabelId::TRASH));
        assert!(!msg.has_label(LabelId::INBOX));

        session.untrash_message(&"a".into()).unwrap();
        let msg = session.message("a").unwrap();
        assert!(!msg.has_label(LabelId::TRASH));
        assert!(!msg.has_label(LabelId::INBOX));
    }

    #[test]
    fn test_system_label_cannot_be_deleted() {
        let session = InMemorySession::new();
        assert!(session.delete_label(&LabelId::new(LabelId::INBOX)).is_err());
    }
}
