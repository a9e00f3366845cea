//! Query resolution
//!
//! Turns a search query into message IDs, materializes messages at a chosen
//! fidelity and picks the most recent one.

mod cursor;
mod select;

pub use cursor::resolve_ids;
pub use select::{fetch_all, find_latest, latest_id, select_latest};
