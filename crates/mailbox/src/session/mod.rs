//! Mailbox session abstraction and implementations
//!
//! Every engine operation runs against a [`MailboxSession`]. The trait-based
//! design allows swapping between the Gmail REST session and an in-memory
//! fake used by tests.

mod memory;
mod traits;

pub use memory::{InMemorySession, SessionCall};
pub use traits::{MailboxSession, MessagePage};
