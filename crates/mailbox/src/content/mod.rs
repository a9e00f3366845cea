//! Message content: body text resolution and attachment extraction

mod attachments;
mod body;

pub use attachments::{ensure_directory, save_attachments, save_attachments_bulk};
pub use body::{decode_body, encode_body, resolve_text};
