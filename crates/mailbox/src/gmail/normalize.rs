//! Gmail API response normalization
//!
//! Converts Gmail API resources to domain models and back.

use super::api;
use crate::models::{
    Header, LabelColor, LabelId, LabelListVisibility, LabelType, Message, MessageId,
    MessageListVisibility, MimePart, PartBody, UserLabel,
};

/// Normalize a Gmail API message to a domain Message
pub fn normalize_message(gmail_msg: api::GmailMessage) -> Message {
    // Internal date is milliseconds since epoch, serialized as a string
    let internal_date = gmail_msg
        .internal_date
        .as_deref()
        .and_then(|d| d.parse::<i64>().ok())
        .unwrap_or(0);

    Message {
        id: MessageId::new(gmail_msg.id),
        internal_date,
        label_ids: gmail_msg
            .label_ids
            .unwrap_or_default()
            .into_iter()
            .map(LabelId::from)
            .collect(),
        snippet: gmail_msg.snippet,
        payload: gmail_msg.payload.map(normalize_part),
    }
}

/// Normalize a (possibly nested) message part
pub fn normalize_part(part: api::MessagePart) -> MimePart {
    let body = part.body.and_then(|b| match (b.attachment_id, b.data) {
        (Some(attachment_id), _) if !attachment_id.is_empty() => Some(PartBody::Attachment {
            attachment_id,
            size: b.size.unwrap_or(0),
        }),
        (_, Some(data)) => Some(PartBody::Inline(data)),
        _ => None,
    });

    MimePart {
        mime_type: part.mime_type.unwrap_or_default(),
        filename: part.filename.filter(|f| !f.is_empty()),
        headers: part
            .headers
            .unwrap_or_default()
            .into_iter()
            .map(|h| Header::new(h.name, h.value))
            .collect(),
        body,
        parts: part
            .parts
            .unwrap_or_default()
            .into_iter()
            .map(normalize_part)
            .collect(),
    }
}

/// Normalize a Gmail label resource
pub fn normalize_label(label: api::Label) -> UserLabel {
    let label_type = match label.label_type.as_deref() {
        Some("system") => LabelType::System,
        _ => LabelType::User,
    };

    let color = label.color.and_then(|c| match (c.background_color, c.text_color) {
        (Some(background), Some(text)) => Some(LabelColor { background, text }),
        _ => None,
    });

    UserLabel {
        id: LabelId::new(label.id.unwrap_or_default()),
        name: label.name.unwrap_or_default(),
        label_type,
        color,
        label_list_visibility: label
            .label_list_visibility
            .as_deref()
            .and_then(LabelListVisibility::from_api_str),
        message_list_visibility: label
            .message_list_visibility
            .as_deref()
            .and_then(MessageListVisibility::from_api_str),
    }
}

/// Convert a domain label into the Gmail request shape
///
/// The ID and type are left out; the store owns both.
pub fn label_to_api(label: &UserLabel) -> api::Label {
    api::Label {
        id: None,
        name: Some(label.name.clone()),
        label_type: None,
        label_list_visibility: label
            .label_list_visibility
            .map(|v| v.as_api_str().to_string()),
        message_list_visibility: label
            .message_list_visibility
            .map(|v| v.as_api_str().to_string()),
        color: label.color.as_ref().map(|c| api::LabelColor {
            background_color: Some(c.background.clone()),
            text_color: Some(c.text.clone()),
        }),
    }
}
