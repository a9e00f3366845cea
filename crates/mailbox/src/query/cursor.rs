//! Paginated message listing

use log::debug;

use crate::error::Result;
use crate::models::MessageId;
use crate::session::MailboxSession;

/// Resolve a query to every matching message ID
///
/// Pages are requested until the store returns no next-page token (absent or
/// empty). IDs keep page arrival order; callers needing recency order must
/// sort explicitly. A store that never stops handing out tokens keeps this
/// looping.
pub fn resolve_ids(session: &dyn MailboxSession, query: &str) -> Result<Vec<MessageId>> {
    let mut ids = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = session.list_messages(query, page_token.as_deref())?;
        pages += 1;
        ids.extend(page.ids);

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    debug!("Query {:?} resolved to {} ids over {} pages", query, ids.len(), pages);
    Ok(ids)
}
