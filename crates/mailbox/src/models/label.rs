//! Label models: label ids, label definitions and label deltas

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{MailboxError, Result};

/// Unique identifier for a label (e.g., "INBOX", "Label_123")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LabelId(pub String);

impl LabelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Well-known system labels
    pub const INBOX: &'static str = "INBOX";
    pub const SPAM: &'static str = "SPAM";
    pub const TRASH: &'static str = "TRASH";
    pub const UNREAD: &'static str = "UNREAD";
    pub const STARRED: &'static str = "STARRED";
    pub const SENT: &'static str = "SENT";
}

impl From<String> for LabelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LabelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Whether a label is built into the store or managed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    System,
    #[default]
    User,
}

/// Visibility of a label in the label list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelListVisibility {
    #[default]
    #[serde(rename = "labelShow")]
    Show,
    #[serde(rename = "labelShowIfUnread")]
    ShowIfUnread,
    #[serde(rename = "labelHide")]
    Hide,
}

impl LabelListVisibility {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            LabelListVisibility::Show => "labelShow",
            LabelListVisibility::ShowIfUnread => "labelShowIfUnread",
            LabelListVisibility::Hide => "labelHide",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "labelShow" => Some(LabelListVisibility::Show),
            "labelShowIfUnread" => Some(LabelListVisibility::ShowIfUnread),
            "labelHide" => Some(LabelListVisibility::Hide),
            _ => None,
        }
    }
}

/// Visibility of messages carrying a label in the message list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageListVisibility {
    #[default]
    Show,
    Hide,
}

impl MessageListVisibility {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            MessageListVisibility::Show => "show",
            MessageListVisibility::Hide => "hide",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "show" => Some(MessageListVisibility::Show),
            "hide" => Some(MessageListVisibility::Hide),
            _ => None,
        }
    }
}

/// Background/text color pair (hex strings such as "#000000")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelColor {
    pub background: String,
    pub text: String,
}

impl LabelColor {
    pub fn new(background: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            background: background.into(),
            text: text.into(),
        }
    }
}

/// A label definition as known to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLabel {
    /// Store label ID; empty until the store has created the label
    pub id: LabelId,
    pub name: String,
    pub label_type: LabelType,
    pub color: Option<LabelColor>,
    pub label_list_visibility: Option<LabelListVisibility>,
    pub message_list_visibility: Option<MessageListVisibility>,
}

impl UserLabel {
    /// Create a user label with default visibility
    pub fn new(id: impl Into<LabelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            label_type: LabelType::User,
            color: None,
            label_list_visibility: None,
            message_list_visibility: None,
        }
    }

    /// Create a system label
    pub fn system(id: impl Into<LabelId>, name: impl Into<String>) -> Self {
        Self {
            label_type: LabelType::System,
            ..Self::new(id, name)
        }
    }

    pub fn is_system(&self) -> bool {
        self.label_type == LabelType::System
    }
}

/// Set-delta of labels applied atomically to one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDelta {
    pub add: BTreeSet<LabelId>,
    pub remove: BTreeSet<LabelId>,
}

impl LabelDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, label: impl Into<LabelId>) -> Self {
        self.add.insert(label.into());
        self
    }

    pub fn remove(mut self, label: impl Into<LabelId>) -> Self {
        self.remove.insert(label.into());
        self
    }

    /// Build a delta from label id lists
    pub fn from_lists<A, R>(add: A, remove: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<LabelId>,
        R: IntoIterator,
        R::Item: Into<LabelId>,
    {
        Self {
            add: add.into_iter().map(Into::into).collect(),
            remove: remove.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    /// Reject a delta that neither adds nor removes anything
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(MailboxError::EmptyLabelDelta);
        }
        Ok(())
    }

    pub fn add_ids(&self) -> Vec<LabelId> {
        self.add.iter().cloned().collect()
    }

    pub fn remove_ids(&self) -> Vec<LabelId> {
        self.remove.iter().cloned().collect()
    }
}
