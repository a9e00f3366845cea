//! Action handler for label mutations
//!
//! Single-target actions resolve the query with minimal fetches, pick the
//! latest match and change only that message. Bulk actions change every
//! match. A failure on any message aborts the rest of a bulk action.

use log::info;

use super::policy;
use crate::error::Result;
use crate::models::{LabelDelta, MessageId};
use crate::query::{latest_id, resolve_ids};
use crate::session::MailboxSession;

/// Handler for label mutations against one session
pub struct ActionHandler<'a> {
    session: &'a dyn MailboxSession,
}

impl<'a> ActionHandler<'a> {
    /// Create a new action handler
    pub fn new(session: &'a dyn MailboxSession) -> Self {
        Self { session }
    }

    /// Apply a label delta to the latest message matching `query`
    ///
    /// Returns whether a message was found and changed. An empty delta is
    /// rejected before the session is touched.
    pub fn modify_latest(&self, query: &str, delta: &LabelDelta) -> Result<bool> {
        delta.validate()?;

        let Some(id) = latest_id(self.session, query)? else {
            return Ok(false);
        };
        self.apply(&id, delta)?;
        Ok(true)
    }

    /// Apply a label delta to every message matching `query`
    ///
    /// Returns the number of messages changed.
    pub fn modify_all(&self, query: &str, delta: &LabelDelta) -> Result<usize> {
        delta.validate()?;

        let ids = resolve_ids(self.session, query)?;
        for id in &ids {
            self.apply(id, delta)?;
        }

        if !ids.is_empty() {
            info!("Modified {} messages matching {:?}", ids.len(), query);
        }
        Ok(ids.len())
    }

    /// Mark the latest match as read
    pub fn mark_read(&self, query: &str) -> Result<bool> {
        self.modify_latest(query, &policy::mark_read())
    }

    /// Mark the latest match as unread
    pub fn mark_unread(&self, query: &str) -> Result<bool> {
        self.modify_latest(query, &policy::mark_unread())
    }

    /// Move the latest match to spam
    pub fn spam(&self, query: &str) -> Result<bool> {
        self.modify_latest(query, &policy::spam())
    }

    /// Move the latest match from spam back to the inbox
    pub fn unspam(&self, query: &str) -> Result<bool> {
        self.modify_latest(query, &policy::unspam())
    }

    /// Mark every match as read
    pub fn mark_all_read(&self, query: &str) -> Result<usize> {
        self.modify_all(query, &policy::mark_read())
    }

    /// Mark every match as unread
    pub fn mark_all_unread(&self, query: &str) -> Result<usize> {
        self.modify_all(query, &policy::mark_unread())
    }

    /// Move every match to spam
    pub fn spam_all(&self, query: &str) -> Result<usize> {
        self.modify_all(query, &policy::spam())
    }

    /// Move every match from spam back to the inbox
    pub fn unspam_all(&self, query: &str) -> Result<usize> {
        self.modify_all(query, &policy::unspam())
    }

    /// Move the latest match to trash
    pub fn trash(&self, query: &str) -> Result<bool> {
        let Some(id) = latest_id(self.session, query)? else {
            return Ok(false);
        };
        self.trash_one(&id)?;
        Ok(true)
    }

    /// Restore the latest match from trash into the inbox
    pub fn untrash(&self, query: &str) -> Result<bool> {
        let Some(id) = latest_id(self.session, query)? else {
            return Ok(false);
        };
        self.untrash_one(&id)?;
        Ok(true)
    }

    /// Move every match to trash
    pub fn trash_all(&self, query: &str) -> Result<usize> {
        let ids = resolve_ids(self.session, query)?;
        for id in &ids {
            self.trash_one(id)?;
        }
        Ok(ids.len())
    }

    /// Restore every match from trash into the inbox
    pub fn untrash_all(&self, query: &str) -> Result<usize> {
        let ids = resolve_ids(self.session, query)?;
        for id in &ids {
            self.untrash_one(id)?;
        }
        Ok(ids.len())
    }

    fn apply(&self, id: &MessageId, delta: &LabelDelta) -> Result<()> {
        info!(
            "Modifying message {} (+{:?} -{:?})",
            id, delta.add, delta.remove
        );
        self.session
            .modify_message(id, &delta.add_ids(), &delta.remove_ids())?;
        Ok(())
    }

    fn trash_one(&self, id: &MessageId) -> Result<()> {
        info!("Trashing message {}", id);
        self.session.trash_message(id)?;
        Ok(())
    }

    fn untrash_one(&self, id: &MessageId) -> Result<()> {
        info!("Untrashing message {}", id);
        self.session.untrash_message(id)?;
        self.apply(id, &policy::restore_inbox())
    }
}
