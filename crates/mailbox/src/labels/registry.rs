use log::info;

use crate::error::{MailboxError, Result};
use crate::models::{
    LabelColor, LabelId, LabelListVisibility, LabelType, MessageListVisibility, UserLabel,
};
use crate::session::MailboxSession;

/// Definition of a label to create
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLabel {
    pub name: String,
    pub color: Option<LabelColor>,
    pub label_list_visibility: LabelListVisibility,
    pub message_list_visibility: MessageListVisibility,
}

impl NewLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn color(mut self, background: impl Into<String>, text: impl Into<String>) -> Self {
        self.color = Some(LabelColor::new(background, text));
        self
    }

    pub fn label_list_visibility(mut self, visibility: LabelListVisibility) -> Self {
        self.label_list_visibility = visibility;
        self
    }

    pub fn message_list_visibility(mut self, visibility: MessageListVisibility) -> Self {
        self.message_list_visibility = visibility;
        self
    }

    fn into_label(self) -> UserLabel {
        UserLabel {
            id: LabelId::new(""),
            name: self.name,
            label_type: LabelType::User,
            color: self.color,
            label_list_visibility: Some(self.label_list_visibility),
            message_list_visibility: Some(self.message_list_visibility),
        }
    }
}

/// Changes to an existing label; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelUpdate {
    pub name: Option<String>,
    pub color: Option<LabelColor>,
    pub label_list_visibility: Option<LabelListVisibility>,
    pub message_list_visibility: Option<MessageListVisibility>,
}

impl LabelUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn color(mut self, background: impl Into<String>, text: impl Into<String>) -> Self {
        self.color = Some(LabelColor::new(background, text));
        self
    }

    pub fn label_list_visibility(mut self, visibility: LabelListVisibility) -> Self {
        self.label_list_visibility = Some(visibility);
        self
    }

    pub fn message_list_visibility(mut self, visibility: MessageListVisibility) -> Self {
        self.message_list_visibility = Some(visibility);
        self
    }

    fn apply_to(self, mut label: UserLabel) -> UserLabel {
        if let Some(name) = self.name {
            label.name = name;
        }
        if let Some(color) = self.color {
            label.color = Some(color);
        }
        if let Some(visibility) = self.label_list_visibility {
            label.label_list_visibility = Some(visibility);
        }
        if let Some(visibility) = self.message_list_visibility {
            label.message_list_visibility = Some(visibility);
        }
        label
    }
}

/// All labels, system and user
pub fn list_labels(session: &dyn MailboxSession) -> Result<Vec<UserLabel>> {
    Ok(session.list_labels()?)
}

/// Find a label by exact, case-sensitive name
pub fn find_label(session: &dyn MailboxSession, name: &str) -> Result<Option<UserLabel>> {
    Ok(list_labels(session)?.into_iter().find(|l| l.name == name))
}

/// Create a user label
///
/// Name uniqueness is left to the store.
pub fn create_label(session: &dyn MailboxSession, label: NewLabel) -> Result<UserLabel> {
    if label.name.trim().is_empty() {
        return Err(MailboxError::EmptyLabelName);
    }

    let created = session.create_label(&label.into_label())?;
    info!("Created label {:?} ({})", created.name, created.id.as_str());
    Ok(created)
}

/// Update the user label currently named `name`
///
/// System labels are never matched. Returns `None` without touching the store
/// when no user label has that name.
pub fn update_label(
    session: &dyn MailboxSession,
    name: &str,
    update: LabelUpdate,
) -> Result<Option<UserLabel>> {
    let Some(existing) = list_labels(session)?
        .into_iter()
        .find(|l| !l.is_system() && l.name == name)
    else {
        return Ok(None);
    };

    let updated = session.update_label(&update.apply_to(existing))?;
    info!("Updated label {:?} ({})", name, updated.id.as_str());
    Ok(Some(updated))
}

/// Delete the label named `name`
///
/// Any label may match, system ones included; the store decides whether the
/// deletion is allowed. Returns `false` when no label has that name.
pub fn delete_label(session: &dyn MailboxSession, name: &str) -> Result<bool> {
    let Some(existing) = find_label(session, name)? else {
        return Ok(false);
    };

    session.delete_label(&existing.id)?;
    info!("Deleted label {:?} ({})", name, existing.id.as_str());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{InMemorySession, SessionCall};

    #[test]
    fn test_create_label_defaults() {
        let session = InMemorySession::new();
        let created = create_label(&session, NewLabel::new("Receipts")).unwrap();

        assert!(created.id.as_str().starts_with("Label_"));
        assert_eq!(created.label_type, LabelType::User);
        assert_eq!(created.label_list_visibility, Some(LabelListVisibility::Show));
        assert_eq!(created.message_list_visibility, Some(MessageListVisibility::Show));
        assert_eq!(find_label(&session, "Receipts").unwrap(), Some(created));
    }

    #[test]
    fn test_create_label_requires_name() {
        let session = InMemorySession::new();
        let err = create_label(&session, NewLabel::new("  ")).unwrap_err();
        assert!(matches!(err, MailboxError::EmptyLabelName));
        assert_eq!(session.call_count(), 0);
    }

    #[test]
    fn test_update_label_by_name() {
        let session = InMemorySession::new();
        let created = create_label(&session, NewLabel::new("Old")).unwrap();

        let updated = update_label(
            &session,
            "Old",
            LabelUpdate::new()
                .rename("New")
                .color("#000000", "#ffffff")
                .label_list_visibility(LabelListVisibility::Hide),
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "New");
        assert_eq!(updated.color, Some(LabelColor::new("#000000", "#ffffff")));
        assert_eq!(updated.label_list_visibility, Some(LabelListVisibility::Hide));
        assert_eq!(updated.message_list_visibility, Some(MessageListVisibility::Show));
    }

    #[test]
    fn test_update_missing_or_system_label_is_noop() {
        let session = InMemorySession::new();
        assert!(
            update_label(&session, "Nope", LabelUpdate::new().rename("x"))
                .unwrap()
                .is_none()
        );
        assert!(
            update_label(&session, "INBOX", LabelUpdate::new().rename("x"))
                .unwrap()
                .is_none()
        );
        assert!(
            !session
                .calls()
                .iter()
                .any(|c| matches!(c, SessionCall::UpdateLabel(_)))
        );
    }

    #[test]
    fn test_update_is_case_sensitive() {
        let session = InMemorySession::new();
        create_label(&session, NewLabel::new("Work")).unwrap();
        assert!(
            update_label(&session, "work", LabelUpdate::new().rename("x"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_delete_label() {
        let session = InMemorySession::new();
        create_label(&session, NewLabel::new("Temp")).unwrap();

        assert!(delete_label(&session, "Temp").unwrap());
        assert!(find_label(&session, "Temp").unwrap().is_none());
        assert!(!delete_label(&session, "Temp").unwrap());
    }

    #[test]
    fn test_delete_system_label_is_left_to_store() {
        let session = InMemorySession::new();
        assert!(delete_label(&session, "INBOX").is_err());
        assert!(
            session
                .calls()
                .contains(&SessionCall::DeleteLabel(LabelId::new(LabelId::INBOX)))
        );
    }
}
