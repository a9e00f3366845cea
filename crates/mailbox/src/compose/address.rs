//! Recipient address validation

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{MailboxError, Result};

/// Structural check on a bare address: local part, `@`, dotted domain
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("valid email address regex")
});

/// Recipient header an address came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    To,
    Cc,
    Bcc,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddressField::To => "To",
            AddressField::Cc => "Cc",
            AddressField::Bcc => "Bcc",
        })
    }
}

/// Split a comma-separated recipient list into trimmed, non-empty entries
pub fn split_addresses(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Whether an entry is a structurally valid address
///
/// Accepts `user@example.com` and `Name <user@example.com>`.
pub fn is_valid_address(entry: &str) -> bool {
    let entry = entry.trim();
    let bare = match (entry.rfind('<'), entry.rfind('>')) {
        (Some(start), Some(end)) if start < end && end == entry.len() - 1 => &entry[start + 1..end],
        (None, None) => entry,
        _ => return false,
    };
    EMAIL_PATTERN.is_match(bare.trim())
}

/// Validate every entry of a recipient list
///
/// A blank `To` list is itself invalid; blank `Cc`/`Bcc` lists are skipped.
pub fn validate_list(field: AddressField, list: &str) -> Result<()> {
    let entries = split_addresses(list);
    if entries.is_empty() && field == AddressField::To {
        return Err(MailboxError::InvalidAddress {
            field,
            address: list.trim().to_string(),
        });
    }

    match entries.into_iter().find(|entry| !is_valid_address(entry)) {
        Some(bad) => Err(MailboxError::InvalidAddress {
            field,
            address: bad.to_string(),
        }),
        None => Ok(()),
    }
}
