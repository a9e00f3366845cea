//! Mailbox facade
//!
//! [`Mailbox`] owns a session and exposes every engine operation as a method.
//! With [`SessionPolicy::DisposeAfterCall`] the session is disposed when each
//! call returns, errors included. Validation still runs before any store
//! request.

use log::info;
use std::collections::BTreeMap;
use std::path::Path;

use crate::actions::ActionHandler;
use crate::compose::{OutgoingMessage, compose};
use crate::content::{ensure_directory, resolve_text, save_attachments, save_attachments_bulk};
use crate::error::Result;
use crate::labels::{self, LabelUpdate, NewLabel};
use crate::models::{Fidelity, LabelDelta, Message, MessageId, UserLabel};
use crate::query::{fetch_all, find_latest, resolve_ids};
use crate::session::MailboxSession;

/// What happens to the session after each call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPolicy {
    /// Keep pooled resources between calls
    #[default]
    Keep,
    /// Dispose the session when every call ends
    DisposeAfterCall,
}

/// Disposes the session on drop when the policy asks for it
struct CallGuard<'a> {
    session: &'a dyn MailboxSession,
    policy: SessionPolicy,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        if self.policy == SessionPolicy::DisposeAfterCall {
            self.session.dispose();
        }
    }
}

/// Query-and-modify engine over one mailbox session
pub struct Mailbox<S: MailboxSession> {
    session: S,
    policy: SessionPolicy,
}

impl<S: MailboxSession> Mailbox<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            policy: SessionPolicy::Keep,
        }
    }

    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Run one operation under the session policy
    fn call<T>(&self, op: impl FnOnce(&dyn MailboxSession) -> Result<T>) -> Result<T> {
        let guard = CallGuard {
            session: &self.session,
            policy: self.policy,
        };
        op(guard.session)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of messages matching a query
    pub fn count(&self, query: &str) -> Result<usize> {
        self.call(|s| Ok(resolve_ids(s, query)?.len()))
    }

    /// IDs of every message matching a query, in store order
    pub fn message_ids(&self, query: &str) -> Result<Vec<MessageId>> {
        self.call(|s| resolve_ids(s, query))
    }

    /// Every message matching a query at the given fidelity
    pub fn messages(&self, query: &str, fidelity: Fidelity) -> Result<Vec<Message>> {
        self.call(|s| {
            let ids = resolve_ids(s, query)?;
            fetch_all(s, &ids, fidelity)
        })
    }

    /// The most recent matching message, fetched in full
    pub fn latest_message(&self, query: &str) -> Result<Option<Message>> {
        self.call(|s| find_latest(s, query))
    }

    /// Readable body text of the most recent matching message
    pub fn latest_body(&self, query: &str) -> Result<Option<String>> {
        self.call(|s| match find_latest(s, query)? {
            Some(message) => resolve_text(&message),
            None => Ok(None),
        })
    }

    /// Subject of the most recent matching message
    pub fn latest_subject(&self, query: &str) -> Result<Option<String>> {
        self.call(|s| {
            Ok(find_latest(s, query)?
                .and_then(|m| m.header("Subject").map(str::to_string)))
        })
    }

    // ========================================================================
    // Attachments
    // ========================================================================

    /// Save the attachments of the most recent matching message into `dir`
    ///
    /// `dir` must already exist. Returns the number of files written.
    pub fn save_latest_attachments(&self, query: &str, dir: &Path) -> Result<usize> {
        self.call(|s| {
            ensure_directory(dir)?;
            match find_latest(s, query)? {
                Some(message) => save_attachments(s, &message, dir),
                None => Ok(0),
            }
        })
    }

    /// Save the attachments of every matching message, one subdirectory per message
    pub fn save_all_attachments(
        &self,
        query: &str,
        dir: &Path,
    ) -> Result<BTreeMap<MessageId, usize>> {
        self.call(|s| {
            ensure_directory(dir)?;
            let ids = resolve_ids(s, query)?;
            let messages = fetch_all(s, &ids, Fidelity::Full)?;
            save_attachments_bulk(s, &messages, dir)
        })
    }

    // ========================================================================
    // Label mutations
    // ========================================================================

    pub fn modify_latest(&self, query: &str, delta: &LabelDelta) -> Result<bool> {
        self.call(|s| ActionHandler::new(s).modify_latest(query, delta))
    }

    pub fn modify_all(&self, query: &str, delta: &LabelDelta) -> Result<usize> {
        self.call(|s| ActionHandler::new(s).modify_all(query, delta))
    }

    pub fn mark_read(&self, query: &str) -> Result<bool> {
        self.call(|s| ActionHandler::new(s).mark_read(query))
    }

    pub fn mark_unread(&self, query: &str) -> Result<bool> {
        self.call(|s| ActionHandler::new(s).mark_unread(query))
    }

    pub fn trash(&self, query: &str) -> Result<bool> {
        self.call(|s| ActionHandler::new(s).trash(query))
    }

    pub fn untrash(&self, query: &str) -> Result<bool> {
        self.call(|s| ActionHandler::new(s).untrash(query))
    }

    pub fn spam(&self, query: &str) -> Result<bool> {
        self.call(|s| ActionHandler::new(s).spam(query))
    }

    pub fn unspam(&self, query: &str) -> Result<bool> {
        self.call(|s| ActionHandler::new(s).unspam(query))
    }

    pub fn mark_all_read(&self, query: &str) -> Result<usize> {
        self.call(|s| ActionHandler::new(s).mark_all_read(query))
    }

    pub fn mark_all_unread(&self, query: &str) -> Result<usize> {
        self.call(|s| ActionHandler::new(s).mark_all_unread(query))
    }

    pub fn trash_all(&self, query: &str) -> Result<usize> {
        self.call(|s| ActionHandler::new(s).trash_all(query))
    }

    pub fn untrash_all(&self, query: &str) -> Result<usize> {
        self.call(|s| ActionHandler::new(s).untrash_all(query))
    }

    pub fn spam_all(&self, query: &str) -> Result<usize> {
        self.call(|s| ActionHandler::new(s).spam_all(query))
    }

    pub fn unspam_all(&self, query: &str) -> Result<usize> {
        self.call(|s| ActionHandler::new(s).unspam_all(query))
    }

    // ========================================================================
    // Outbound
    // ========================================================================

    /// Compose and send a message
    ///
    /// Addresses and attachment files are validated before the session is
    /// used; the store fills in the sender when `from` is unset.
    pub fn send(&self, message: OutgoingMessage) -> Result<()> {
        self.call(|s| {
            let raw = compose(&message)?;
            s.send_message(&raw)?;
            info!("Sent message {:?} to {}", message.subject, message.to);
            Ok(())
        })
    }

    // ========================================================================
    // Label registry
    // ========================================================================

    pub fn labels(&self) -> Result<Vec<UserLabel>> {
        self.call(labels::list_labels)
    }

    pub fn find_label(&self, name: &str) -> Result<Option<UserLabel>> {
        self.call(|s| labels::find_label(s, name))
    }

    pub fn create_label(&self, label: NewLabel) -> Result<UserLabel> {
        self.call(|s| labels::create_label(s, label))
    }

    /// Update the user label named `name`; `None` when there is no such label
    pub fn update_label(&self, name: &str, update: LabelUpdate) -> Result<Option<UserLabel>> {
        self.call(|s| labels::update_label(s, name, update))
    }

    /// Delete the label named `name`; `false` when there is no such label
    pub fn delete_label(&self, name: &str) -> Result<bool> {
        self.call(|s| labels::delete_label(s, name))
    }
}
