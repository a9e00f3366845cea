//! Gmail API integration
//!
//! This module provides:
//! - Access token sources (static or refreshed from a stored token file)
//! - A blocking Gmail REST session implementing [`crate::MailboxSession`]
//! - Response normalization to domain models

mod auth;
mod client;
mod normalize;

pub use auth::{AccessTokenSource, StaticToken, StoredToken};
pub use client::GmailSession;
pub use normalize::{label_to_api, normalize_label, normalize_message, normalize_part};

/// Gmail API wire types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// Response from listing messages
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListMessagesResponse {
        pub messages: Option<Vec<MessageRef>>,
        pub next_page_token: Option<String>,
        pub result_size_estimate: Option<u32>,
    }

    /// Reference to a message in a listing
    #[derive(Debug, Deserialize)]
    pub struct MessageRef {
        pub id: String,
    }

    /// Message resource; `payload` is absent for `format=minimal`
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GmailMessage {
        pub id: String,
        pub label_ids: Option<Vec<String>>,
        pub snippet: Option<String>,
        pub internal_date: Option<String>,
        pub payload: Option<MessagePart>,
    }

    /// Email header (name-value pair)
    #[derive(Debug, Deserialize, Serialize)]
    pub struct Header {
        pub name: String,
        pub value: String,
    }

    /// Part body: inline data or a reference to a separately stored attachment
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessagePartBody {
        pub attachment_id: Option<String>,
        pub size: Option<u64>,
        pub data: Option<String>,
    }

    /// Message part (recursive for multipart messages)
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessagePart {
        pub mime_type: Option<String>,
        pub filename: Option<String>,
        pub headers: Option<Vec<Header>>,
        pub body: Option<MessagePartBody>,
        pub parts: Option<Vec<MessagePart>>,
    }

    /// Request body for modifying a message's labels
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ModifyMessageRequest {
        pub add_label_ids: Vec<String>,
        pub remove_label_ids: Vec<String>,
    }

    /// Request body for sending a raw message
    #[derive(Debug, Serialize)]
    pub struct SendMessageRequest {
        pub raw: String,
    }

    /// Label color pair
    #[derive(Debug, Clone, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LabelColor {
        pub background_color: Option<String>,
        pub text_color: Option<String>,
    }

    /// Label resource
    #[derive(Debug, Clone, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Label {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub id: Option<String>,
        pub name: Option<String>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub label_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub label_list_visibility: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub message_list_visibility: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub color: Option<LabelColor>,
    }

    /// Response from listing labels
    #[derive(Debug, Deserialize)]
    pub struct ListLabelsResponse {
        pub labels: Option<Vec<Label>>,
    }

    /// Response from fetching an attachment
    #[derive(Debug, Deserialize)]
    pub struct AttachmentResponse {
        pub data: Option<String>,
    }
}
