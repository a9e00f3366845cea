//! Body decoding and text resolution
//!
//! The store transports bodies as URL-safe base64. Some transports also turn
//! `+` into a space; spaces are restored to `+` before decoding.

use base64::alphabet;
use base64::engine::general_purpose::{self, GeneralPurpose};
use base64::engine::DecodePaddingMode;
use base64::prelude::*;

use crate::error::{MailboxError, Result};
use crate::models::{Message, MimePart, PartBody};

const TEXT_PLAIN: &str = "text/plain";
const TEXT_HTML: &str = "text/html";

/// Standard alphabet, accepting input with or without padding
const STANDARD_ANY_PAD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    general_purpose::PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode URL-safe base64 body data, repairing spaces to `+`
pub fn decode_body(data: &str) -> Result<Vec<u8>> {
    let repaired: String = data
        .chars()
        .map(|c| match c {
            '-' | ' ' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    STANDARD_ANY_PAD
        .decode(repaired)
        .map_err(|e| MailboxError::Decode(e.to_string()))
}

/// Encode bytes with the store's URL-safe alphabet, without padding
pub fn encode_body(bytes: &[u8]) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Resolve the human-readable text of a fully fetched message
///
/// A top-level `text/plain` or `text/html` part is used as-is. Otherwise the
/// direct children are scanned (one level only) for a `text/plain` part with
/// data, then a `text/html` one. Nothing suitable yields `None`; data that
/// fails to decode is an error.
pub fn resolve_text(message: &Message) -> Result<Option<String>> {
    let Some(payload) = &message.payload else {
        return Ok(None);
    };

    if payload.mime_type == TEXT_PLAIN || payload.mime_type == TEXT_HTML {
        return decode_text(payload);
    }

    let chosen = find_child_with_data(payload, TEXT_PLAIN)
        .or_else(|| find_child_with_data(payload, TEXT_HTML));

    match chosen {
        Some(part) => decode_text(part),
        None => Ok(None),
    }
}

fn find_child_with_data<'a>(payload: &'a MimePart, mime_type: &str) -> Option<&'a MimePart> {
    payload.parts.iter().find(|p| {
        p.mime_type == mime_type
            && p.body
                .as_ref()
                .and_then(PartBody::inline_data)
                .is_some_and(|d| !d.is_empty())
    })
}

fn decode_text(part: &MimePart) -> Result<Option<String>> {
    let Some(data) = part.body.as_ref().and_then(PartBody::inline_data) else {
        return Ok(None);
    };

    let bytes = decode_body(data)?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_with(payload: MimePart) -> Message {
        Message::builder("m1").payload(payload).build()
    }

    #[test]
    fn test_decode_url_safe() {
        // "Hello, World!" in base64url
        assert_eq!(decode_body("SGVsbG8sIFdvcmxkIQ").unwrap(), b"Hello, World!");
        assert_eq!(decode_body("SGVsbG8sIFdvcmxkIQ==").unwrap(), b"Hello, World!");
    }

    #[test]
    fn test_decode_repairs_spaces() {
        // "???>>>" is "Pz8/Pj4+" in standard base64
        let corrupted = BASE64_STANDARD.encode("???>>>").replace('+', " ");
        assert!(corrupted.contains(' '));
        assert_eq!(decode_body(&corrupted).unwrap(), b"???>>>");
    }

    #[test]
    fn test_decode_failure_is_an_error() {
        let err = decode_body("not*base64!").unwrap_err();
        assert!(matches!(err, MailboxError::Decode(_)));
    }

    #[test]
    fn test_round_trip_printable_text() {
        let samples = [
            "plain ascii",
            "???>>> needs + and / in standard base64",
            "Grüße, 你好, 🎉 emoji",
            "line one\r\nline two\ttabbed",
            "",
        ];

        for text in samples {
            let msg = message_with(MimePart::new("text/plain").with_data(encode_body(text.as_bytes())));
            assert_eq!(resolve_text(&msg).unwrap().as_deref(), Some(text));
        }
    }

    #[test]
    fn test_top_level_html_used_directly() {
        let msg = message_with(MimePart::new("text/html").with_content("<p>hi</p>"));
        assert_eq!(resolve_text(&msg).unwrap().as_deref(), Some("<p>hi</p>"));
    }

    #[test]
    fn test_prefers_plain_child() {
        let msg = message_with(
            MimePart::new("multipart/alternative")
                .with_part(MimePart::new("text/html").with_content("<b>html</b>"))
                .with_part(MimePart::new("text/plain").with_content("plain")),
        );
        assert_eq!(resolve_text(&msg).unwrap().as_deref(), Some("plain"));
    }

    #[test]
    fn test_falls_back_to_html_when_plain_empty() {
        let msg = message_with(
            MimePart::new("multipart/alternative")
                .with_part(MimePart::new("text/plain").with_data(""))
                .with_part(MimePart::new("text/html").with_content("<b>html</b>")),
        );
        assert_eq!(resolve_text(&msg).unwrap().as_deref(), Some("<b>html</b>"));
    }

    #[test]
    fn test_does_not_recurse_past_one_level() {
        let msg = message_with(
            MimePart::new("multipart/mixed").with_part(
                MimePart::new("multipart/alternative")
                    .with_part(MimePart::new("text/plain").with_content("nested")),
            ),
        );
        assert_eq!(resolve_text(&msg).unwrap(), None);
    }

    #[test]
    fn test_no_payload() {
        let msg = Message::builder("m1").build();
        assert_eq!(resolve_text(&msg).unwrap(), None);
    }

    #[test]
    fn test_corrupt_child_is_an_error() {
        let msg = message_with(
            MimePart::new("multipart/alternative")
                .with_part(MimePart::new("text/plain").with_data("%%%")),
        );
        assert!(matches!(resolve_text(&msg), Err(MailboxError::Decode(_))));
    }
}
