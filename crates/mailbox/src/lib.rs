//! Mailbox crate - query-and-modify engine for Gmail-style message stores
//!
//! This crate turns search queries into concrete messages and acts on them:
//! - Query cursor and two-pass message materialization (minimal, then full)
//! - Latest-message selection by internal timestamp
//! - MIME body resolution and attachment extraction
//! - Idempotent label mutations (read/unread, trash, spam, custom deltas)
//! - Outbound message composition (simple and multipart)
//! - Label registry CRUD
//!
//! Everything runs against the [`MailboxSession`] trait. [`GmailSession`] talks
//! to the Gmail REST API with blocking HTTP; [`InMemorySession`] is a fake
//! store for tests.

pub mod actions;
pub mod compose;
pub mod config;
pub mod content;
pub mod error;
pub mod gmail;
pub mod labels;
pub mod models;
pub mod query;
pub mod service;
pub mod session;

pub use actions::{ActionHandler, policy};
pub use compose::{AddressField, BodyFormat, OutgoingMessage, compose};
pub use config::{GmailCredentials, SessionConfig};
pub use content::{decode_body, encode_body, resolve_text, save_attachments, save_attachments_bulk};
pub use error::{MailboxError, Result};
pub use gmail::{AccessTokenSource, GmailSession, StaticToken, StoredToken};
pub use labels::{
    LabelUpdate, NewLabel, create_label, delete_label, find_label, list_labels, update_label,
};
pub use models::{
    Fidelity, Header, LabelColor, LabelDelta, LabelId, LabelListVisibility, LabelType,
    Message, MessageId, MessageListVisibility, MimePart, PartBody, UserLabel,
};
pub use query::{fetch_all, find_latest, resolve_ids, select_latest};
pub use service::{Mailbox, SessionPolicy};
pub use session::{InMemorySession, MailboxSession, MessagePage, SessionCall};
