//! Attachment extraction to the filesystem
//!
//! Only direct children of the top-level part are considered; each one with a
//! non-empty filename is written to `<dir>/<filename>`, replacing any existing
//! file. Concurrent writers to the same directory race (last writer wins).

use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::decode_body;
use crate::error::{MailboxError, Result};
use crate::models::{Message, MessageId, MimePart, PartBody};
use crate::session::MailboxSession;

/// Fail unless `dir` is an existing directory
pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(MailboxError::DirectoryNotFound(dir.to_path_buf()))
    }
}

/// Save the attachments of one fully fetched message into `dir`
///
/// Returns the number of files written.
pub fn save_attachments(
    session: &dyn MailboxSession,
    message: &Message,
    dir: &Path,
) -> Result<usize> {
    ensure_directory(dir)?;
    write_attachments(session, message, dir)
}

/// Save the attachments of several fully fetched messages
///
/// Each message gets its own subdirectory named after its ID, created when its
/// first attachment is written. Messages without attachments are left out of
/// the returned counts.
pub fn save_attachments_bulk(
    session: &dyn MailboxSession,
    messages: &[Message],
    dir: &Path,
) -> Result<BTreeMap<MessageId, usize>> {
    ensure_directory(dir)?;

    let mut counts = BTreeMap::new();
    for message in messages {
        let target = dir.join(safe_file_name(message.id.as_str()));
        let written = write_attachments(session, message, &target)?;
        if written > 0 {
            counts.insert(message.id.clone(), written);
        }
    }
    Ok(counts)
}

fn attachment_parts(message: &Message) -> impl Iterator<Item = &MimePart> {
    message
        .payload
        .iter()
        .flat_map(|payload| payload.parts.iter())
        .filter(|part| part.is_attachment())
}

/// Write every attachment of `message` into `dir`, creating `dir` on first write
fn write_attachments(session: &dyn MailboxSession, message: &Message, dir: &Path) -> Result<usize> {
    let mut written = 0;

    for part in attachment_parts(message) {
        let Some(bytes) = attachment_bytes(session, message, part)? else {
            continue;
        };

        if written == 0 && !dir.is_dir() {
            fs::create_dir_all(dir)?;
        }

        let path = attachment_path(dir, part);
        fs::write(&path, &bytes)?;
        info!(
            "Saved attachment {} ({} bytes) from message {}",
            path.display(),
            bytes.len(),
            message.id
        );
        written += 1;
    }

    Ok(written)
}

fn attachment_bytes(
    session: &dyn MailboxSession,
    message: &Message,
    part: &MimePart,
) -> Result<Option<Vec<u8>>> {
    let encoded = match &part.body {
        Some(PartBody::Attachment { attachment_id, .. }) => {
            session.get_attachment(&message.id, attachment_id)?
        }
        Some(PartBody::Inline(data)) => data.clone(),
        None => {
            warn!(
                "Attachment part {:?} of message {} has no body; skipping",
                part.filename, message.id
            );
            return Ok(None);
        }
    };

    decode_body(&encoded).map(Some)
}

fn attachment_path(dir: &Path, part: &MimePart) -> PathBuf {
    dir.join(safe_file_name(part.filename.as_deref().unwrap_or_default()))
}

/// Strip directory components so a name cannot escape the target directory
fn safe_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "attachment".to_string())
}
