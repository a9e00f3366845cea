//! Session trait definitions

use anyhow::Result;

use crate::models::{Fidelity, LabelId, Message, MessageId, UserLabel};

/// One page of a message listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePage {
    pub ids: Vec<MessageId>,
    /// Token for the next page; `None` or empty when the listing is exhausted
    pub next_page_token: Option<String>,
}

/// Authenticated handle to a message store
///
/// Calls are blocking and issued one at a time.
pub trait MailboxSession: Send + Sync {
    /// List one page of message IDs matching a query (passed verbatim)
    fn list_messages(&self, query: &str, page_token: Option<&str>) -> Result<MessagePage>;

    /// Fetch a message at the given fidelity
    fn get_message(&self, id: &MessageId, fidelity: Fidelity) -> Result<Message>;

    /// Fetch an attachment body, still URL-safe base64 encoded
    fn get_attachment(&self, message_id: &MessageId, attachment_id: &str) -> Result<String>;

    /// Add and remove labels on one message
    fn modify_message(&self, id: &MessageId, add: &[LabelId], remove: &[LabelId]) -> Result<()>;

    /// Move a message to trash
    fn trash_message(&self, id: &MessageId) -> Result<()>;

    /// Move a message out of trash
    fn untrash_message(&self, id: &MessageId) -> Result<()>;

    /// Send a message given its URL-safe base64 encoded RFC 822 form
    fn send_message(&self, raw: &str) -> Result<()>;

    /// List all labels, system and user
    fn list_labels(&self) -> Result<Vec<UserLabel>>;

    /// Create a label; the returned label carries the store-assigned ID
    fn create_label(&self, label: &UserLabel) -> Result<UserLabel>;

    /// Replace an existing label definition (matched by ID)
    fn update_label(&self, label: &UserLabel) -> Result<UserLabel>;

    /// Delete a label by ID
    fn delete_label(&self, id: &LabelId) -> Result<()>;

    /// Release pooled resources; the session stays usable and reconnects lazily
    fn dispose(&self) {}
}
