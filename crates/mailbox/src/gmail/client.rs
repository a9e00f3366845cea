//! Gmail API HTTP session
//!
//! Implements [`MailboxSession`] over the Gmail REST API.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::RwLock;

use super::api::{
    AttachmentResponse, GmailMessage, Label, ListLabelsResponse, ListMessagesResponse,
    ModifyMessageRequest, SendMessageRequest,
};
use super::auth::AccessTokenSource;
use super::normalize::{label_to_api, normalize_label, normalize_message};
use crate::config::SessionConfig;
use crate::models::{Fidelity, LabelId, Message, MessageId, UserLabel};
use crate::session::{MailboxSession, MessagePage};

/// Gmail API session for one mailbox user
pub struct GmailSession {
    tokens: Box<dyn AccessTokenSource>,
    user_id: String,
    agent: RwLock<Option<ureq::Agent>>,
}

impl GmailSession {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Page size requested when listing messages (API maximum)
    const PAGE_SIZE: u32 = 500;

    /// Create a session for the configured user
    pub fn new(config: &SessionConfig, tokens: Box<dyn AccessTokenSource>) -> Self {
        Self {
            tokens,
            user_id: config.user_id.clone(),
            agent: RwLock::new(None),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Get the HTTP agent, creating it if the session was disposed
    fn agent(&self) -> ureq::Agent {
        if let Ok(guard) = self.agent.read()
            && let Some(agent) = guard.as_ref()
        {
            return agent.clone();
        }

        let agent = ureq::Agent::new_with_defaults();
        if let Ok(mut guard) = self.agent.write() {
            *guard = Some(agent.clone());
        }
        agent
    }

    fn user_url(&self, path: &str) -> String {
        format!(
            "{}/users/{}/{}",
            Self::BASE_URL,
            urlencoding::encode(&self.user_id),
            path
        )
    }

    fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.tokens.access_token()?))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let mut response = self
            .agent()
            .get(url)
            .header("Authorization", &self.bearer()?)
            .call()
            .with_context(|| format!("Failed to send {} request", what))?;

        response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse {} response", what))
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        what: &str,
    ) -> Result<T> {
        let mut response = self
            .agent()
            .post(url)
            .header("Authorization", &self.bearer()?)
            .send_json(body)
            .with_context(|| format!("Failed to send {} request", what))?;

        response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse {} response", what))
    }

    fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        what: &str,
    ) -> Result<T> {
        let mut response = self
            .agent()
            .put(url)
            .header("Authorization", &self.bearer()?)
            .send_json(body)
            .with_context(|| format!("Failed to send {} request", what))?;

        response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse {} response", what))
    }

    fn post_empty(&self, url: &str, what: &str) -> Result<()> {
        self.agent()
            .post(url)
            .header("Authorization", &self.bearer()?)
            .send_empty()
            .with_context(|| format!("Failed to send {} request", what))?;
        Ok(())
    }
}

impl MailboxSession for GmailSession {
    fn list_messages(&self, query: &str, page_token: Option<&str>) -> Result<MessagePage> {
        let mut url = format!(
            "{}?maxResults={}&q={}",
            self.user_url("messages"),
            Self::PAGE_SIZE,
            urlencoding::encode(query)
        );
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        let list: ListMessagesResponse = self.get_json(&url, "list messages")?;
        debug!(
            "Listed {} message ids (estimate {:?})",
            list.messages.as_ref().map_or(0, Vec::len),
            list.result_size_estimate
        );

        Ok(MessagePage {
            ids: list
                .messages
                .unwrap_or_default()
                .into_iter()
                .map(|m| MessageId::new(m.id))
                .collect(),
            next_page_token: list.next_page_token,
        })
    }

    fn get_message(&self, id: &MessageId, fidelity: Fidelity) -> Result<Message> {
        let url = format!(
            "{}?format={}",
            self.user_url(&format!("messages/{}", urlencoding::encode(id.as_str()))),
            fidelity.as_api_str()
        );
        let message: GmailMessage = self.get_json(&url, "get message")?;
        Ok(normalize_message(message))
    }

    fn get_attachment(&self, message_id: &MessageId, attachment_id: &str) -> Result<String> {
        let url = self.user_url(&format!(
            "messages/{}/attachments/{}",
            urlencoding::encode(message_id.as_str()),
            urlencoding::encode(attachment_id)
        ));
        let attachment: AttachmentResponse = self.get_json(&url, "get attachment")?;
        attachment
            .data
            .with_context(|| format!("Attachment {} has no data", attachment_id))
    }

    fn modify_message(&self, id: &MessageId, add: &[LabelId], remove: &[LabelId]) -> Result<()> {
        let url = self.user_url(&format!(
            "messages/{}/modify",
            urlencoding::encode(id.as_str())
        ));
        let request = ModifyMessageRequest {
            add_label_ids: add.iter().map(|l| l.as_str().to_string()).collect(),
            remove_label_ids: remove.iter().map(|l| l.as_str().to_string()).collect(),
        };
        let _: GmailMessage = self.post_json(&url, &request, "modify message")?;
        Ok(())
    }

    fn trash_message(&self, id: &MessageId) -> Result<()> {
        let url = self.user_url(&format!("messages/{}/trash", urlencoding::encode(id.as_str())));
        self.post_empty(&url, "trash message")
    }

    fn untrash_message(&self, id: &MessageId) -> Result<()> {
        let url = self.user_url(&format!(
            "messages/{}/untrash",
            urlencoding::encode(id.as_str())
        ));
        self.post_empty(&url, "untrash message")
    }

    fn send_message(&self, raw: &str) -> Result<()> {
        let url = self.user_url("messages/send");
        let request = SendMessageRequest {
            raw: raw.to_string(),
        };
        let _: GmailMessage = self.post_json(&url, &request, "send message")?;
        Ok(())
    }

    fn list_labels(&self) -> Result<Vec<UserLabel>> {
        let labels: ListLabelsResponse = self.get_json(&self.user_url("labels"), "list labels")?;
        Ok(labels
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(normalize_label)
            .collect())
    }

    fn create_label(&self, label: &UserLabel) -> Result<UserLabel> {
        let created: Label =
            self.post_json(&self.user_url("labels"), &label_to_api(label), "create label")?;
        Ok(normalize_label(created))
    }

    fn update_label(&self, label: &UserLabel) -> Result<UserLabel> {
        let url = self.user_url(&format!("labels/{}", urlencoding::encode(label.id.as_str())));
        let updated: Label = self.put_json(&url, &label_to_api(label), "update label")?;
        Ok(normalize_label(updated))
    }

    fn delete_label(&self, id: &LabelId) -> Result<()> {
        let url = self.user_url(&format!("labels/{}", urlencoding::encode(id.as_str())));
        self.agent()
            .delete(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .context("Failed to send delete label request")?;
        Ok(())
    }

    fn dispose(&self) {
        if let Ok(mut guard) = self.agent.write() {
            if guard.take().is_some() {
                debug!("Released HTTP agent for {}", self.user_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::StaticToken;

    fn session(user: &str) -> GmailSession {
        let mut config = SessionConfig::new("mailbox-test");
        config.user_id = user.to_string();
        GmailSession::new(&config, Box::new(StaticToken::new("t")))
    }

    #[test]
    fn test_user_url_encodes_user_id() {
        let s = session("a+b@example.com");
        assert_eq!(
            s.user_url("labels"),
            "https://gmail.googleapis.com/gmail/v1/users/a%2Bb%40example.com/labels"
        );
    }

    #[test]
    fn test_dispose_drops_agent() {
        let s = session("me");
        let _ = s.agent();
        assert!(s.agent.read().unwrap().is_some());
        s.dispose();
        assert!(s.agent.read().unwrap().is_none());
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(session("me").bearer().unwrap(), "Bearer t");
    }
}
