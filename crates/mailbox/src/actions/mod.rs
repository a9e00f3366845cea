//! Label mutation actions
//!
//! Provides the action handler for read/unread, trash, spam and custom label
//! changes, applied either to the latest match of a query or to every match.

mod handler;

pub use handler::ActionHandler;

/// Fixed label deltas behind the named actions
pub mod policy {
    use crate::models::{LabelDelta, LabelId};

    /// Mark read: remove UNREAD
    pub fn mark_read() -> LabelDelta {
        LabelDelta::new().remove(LabelId::UNREAD)
    }

    /// Mark unread: add UNREAD
    pub fn mark_unread() -> LabelDelta {
        LabelDelta::new().add(LabelId::UNREAD)
    }

    /// Report spam: add SPAM, remove INBOX
    pub fn spam() -> LabelDelta {
        LabelDelta::new().add(LabelId::SPAM).remove(LabelId::INBOX)
    }

    /// Not spam: add INBOX, remove SPAM
    pub fn unspam() -> LabelDelta {
        LabelDelta::new().add(LabelId::INBOX).remove(LabelId::SPAM)
    }

    /// Applied after untrash; the store does not restore INBOX itself
    pub fn restore_inbox() -> LabelDelta {
        LabelDelta::new().add(LabelId::INBOX)
    }
}
