//! Error taxonomy for engine operations
//!
//! "Not found" is never an error: operations report it as `None`, `false`
//! or a zero count. Validation errors are raised before any session call.

use std::path::PathBuf;

use crate::compose::AddressField;

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, MailboxError>;

/// Errors returned by engine operations
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("Label delta must add or remove at least one label")]
    EmptyLabelDelta,

    #[error("Label name must not be empty")]
    EmptyLabelName,

    #[error("Invalid email address '{address}' in {field} field")]
    InvalidAddress { field: AddressField, address: String },

    #[error("Attachment file not found: {}", .0.display())]
    AttachmentNotFound(PathBuf),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to decode message data: {0}")]
    Decode(String),

    #[error("Failed to compose message: {0}")]
    Compose(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session error: {0:#}")]
    Session(#[from] anyhow::Error),
}

impl MailboxError {
    /// Whether this error was raised by input validation
    ///
    /// Validation errors are always raised before the session is touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MailboxError::EmptyLabelDelta
                | MailboxError::EmptyLabelName
                | MailboxError::InvalidAddress { .. }
                | MailboxError::AttachmentNotFound(_)
                | MailboxError::DirectoryNotFound(_)
        )
    }
}
