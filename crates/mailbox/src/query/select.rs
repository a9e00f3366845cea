//! Message materialization and latest-message selection
//!
//! Selection is two-pass: every candidate is fetched at minimal fidelity
//! (id, timestamp, labels), and only the chosen message is fetched in full.

use log::debug;

use super::resolve_ids;
use crate::error::{MailboxError, Result};
use crate::models::{Fidelity, Message, MessageId};
use crate::session::MailboxSession;

/// Fetch each message at the given fidelity, preserving input order
pub fn fetch_all(
    session: &dyn MailboxSession,
    ids: &[MessageId],
    fidelity: Fidelity,
) -> Result<Vec<Message>> {
    ids.iter()
        .map(|id| session.get_message(id, fidelity).map_err(MailboxError::from))
        .collect()
}

/// Pick the message with the greatest internal timestamp
///
/// Returns `None` for empty input. Among equal timestamps no particular
/// winner is guaranteed.
pub fn select_latest(messages: &[Message]) -> Option<&Message> {
    messages.iter().max_by_key(|m| m.internal_date)
}

/// ID of the most recent message matching a query, using minimal fetches only
pub fn latest_id(session: &dyn MailboxSession, query: &str) -> Result<Option<MessageId>> {
    let ids = resolve_ids(session, query)?;
    if ids.is_empty() {
        return Ok(None);
    }

    let candidates = fetch_all(session, &ids, Fidelity::Minimal)?;
    Ok(select_latest(&candidates).map(|m| m.id.clone()))
}

/// The most recent message matching a query, fetched in full
pub fn find_latest(session: &dyn MailboxSession, query: &str) -> Result<Option<Message>> {
    let Some(id) = latest_id(session, query)? else {
        debug!("No message matches {:?}", query);
        return Ok(None);
    };

    debug!("Latest match for {:?} is {}", query, id);
    Ok(Some(session.get_message(&id, Fidelity::Full)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MimePart;
    use crate::session::{InMemorySession, SessionCall};

    fn message(id: &str, internal_date: i64) -> Message {
        Message::builder(id)
            .internal_date(internal_date)
            .payload(MimePart::new("text/plain").with_content(id))
            .build()
    }

    fn session_with(dates: &[(&str, i64)]) -> InMemorySession {
        let session = InMemorySession::new();
        for (id, date) in dates {
            session.add_message(message(id, *date));
        }
        session.add_query("q", dates.iter().map(|(id, _)| *id));
        session
    }

    #[test]
    fn test_select_latest_picks_max_timestamp() {
        let messages = vec![message("a", 10), message("b", 30), message("c", 20)];
        assert_eq!(select_latest(&messages).unwrap().id.as_str(), "b");
    }

    #[test]
    fn test_select_latest_empty() {
        assert!(select_latest(&[]).is_none());
    }

    #[test]
    fn test_selected_timestamp_dominates_all() {
        let messages: Vec<Message> = [5, 99, -3, 42, 0, 98]
            .iter()
            .enumerate()
            .map(|(i, d)| message(&format!("m{}", i), *d))
            .collect();

        let latest = select_latest(&messages).unwrap();
        assert!(messages.iter().all(|m| latest.internal_date >= m.internal_date));
    }

    #[test]
    fn test_find_latest_fetches_full_only_for_winner() {
        let session = session_with(&[("a", 10), ("b", 30), ("c", 20)]);

        let latest = find_latest(&session, "q").unwrap().unwrap();
        assert_eq!(latest.id.as_str(), "b");
        assert!(latest.payload.is_some());

        let full_fetches: Vec<SessionCall> = session
            .calls()
            .into_iter()
            .filter(|c| matches!(c, SessionCall::Get { fidelity: Fidelity::Full, .. }))
            .collect();
        assert_eq!(
            full_fetches,
            vec![SessionCall::Get {
                id: MessageId::new("b"),
                fidelity: Fidelity::Full
            }]
        );

        let minimal_fetches = session
            .calls()
            .iter()
            .filter(|c| matches!(c, SessionCall::Get { fidelity: Fidelity::Minimal, .. }))
            .count();
        assert_eq!(minimal_fetches, 3);
    }

    #[test]
    fn test_find_latest_no_match() {
        let session = InMemorySession::new();
        assert!(find_latest(&session, "q").unwrap().is_none());
        assert_eq!(session.call_count(), 1);
    }

    #[test]
    fn test_fetch_all_preserves_order() {
        let session = session_with(&[("a", 3), ("b", 1), ("c", 2)]);
        let ids: Vec<MessageId> = ["c", "a"].into_iter().map(MessageId::from).collect();

        let messages = fetch_all(&session, &ids, Fidelity::Minimal).unwrap();
        let got: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(got, vec!["c", "a"]);
        assert!(messages.iter().all(|m| m.payload.is_none()));
    }
}
