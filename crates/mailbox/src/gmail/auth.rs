//! Access tokens for the Gmail API
//!
//! The interactive consent flow lives with whoever constructs the session.
//! This module only hands out bearer tokens: either one supplied by the
//! caller, or one read from a token file and refreshed through the OAuth
//! token endpoint when it is about to expire.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::GmailCredentials;

/// Source of bearer tokens for Gmail requests
pub trait AccessTokenSource: Send + Sync {
    /// Get a valid access token
    fn access_token(&self) -> Result<String>;
}

/// A fixed access token supplied by the caller
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl AccessTokenSource for StaticToken {
    fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Token data persisted on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenFile {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Expiry as Unix seconds
    pub expires_at: Option<i64>,
}

impl TokenFile {
    /// Whether the token is still valid for at least `margin_secs`
    fn is_fresh(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp > now + margin_secs)
    }
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

/// Access token read from a token file and refreshed on demand
pub struct StoredToken {
    credentials: GmailCredentials,
    token_path: PathBuf,
    cached: Mutex<Option<TokenFile>>,
}

impl StoredToken {
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Tokens expiring within this many seconds are refreshed
    const EXPIRY_MARGIN_SECS: i64 = 300;

    pub fn new(credentials: GmailCredentials, token_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials,
            token_path: token_path.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Whether a token file exists at the configured path
    pub fn is_available(&self) -> bool {
        self.token_path.exists()
    }

    /// Load the token file
    fn load(&self) -> Result<TokenFile> {
        config::load_json_file(&self.token_path)
            .context("No stored Gmail token; authenticate before opening a session")
    }

    /// Persist a token file
    fn save(&self, token: &TokenFile) -> Result<()> {
        config::save_json_file(&self.token_path, token)
    }

    /// Exchange a refresh token for a new access token
    fn refresh(&self, refresh_token: &str) -> Result<TokenFile> {
        info!("Refreshing Gmail access token");
        let response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .context("Failed to refresh access token")?;

        let token: TokenResponse = response
            .into_body()
            .read_json()
            .context("Failed to parse refresh token response")?;

        Ok(TokenFile {
            access_token: token.access_token,
            // Google omits the refresh token on refresh; keep the old one
            refresh_token: token.refresh_token.or_else(|| Some(refresh_token.to_string())),
            expires_at: token
                .expires_in
                .map(|d| chrono::Utc::now().timestamp() + d as i64),
        })
    }
}

impl AccessTokenSource for StoredToken {
    fn access_token(&self) -> Result<String> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| anyhow::anyhow!("Token cache lock poisoned"))?;
        let now = chrono::Utc::now().timestamp();

        if let Some(token) = cached.as_ref()
            && token.is_fresh(now, Self::EXPIRY_MARGIN_SECS)
        {
            return Ok(token.access_token.clone());
        }

        let stored = self.load()?;
        if stored.is_fresh(now, Self::EXPIRY_MARGIN_SECS) {
            debug!("Using stored Gmail access token");
            let access_token = stored.access_token.clone();
            *cached = Some(stored);
            return Ok(access_token);
        }

        let refresh_token = stored
            .refresh_token
            .as_deref()
            .context("Stored Gmail token expired and has no refresh token")?;
        let refreshed = self.refresh(refresh_token)?;
        self.save(&refreshed)?;

        let access_token = refreshed.access_token.clone();
        *cached = Some(refreshed);
        Ok(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn credentials() -> GmailCredentials {
        GmailCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    #[test]
    fn test_static_token() {
        assert_eq!(StaticToken::new("abc").access_token().unwrap(), "abc");
    }

    #[test]
    fn test_fresh_stored_token_is_used_without_refresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let token = TokenFile {
            access_token: "live".to_string(),
            refresh_token: None,
            expires_at: Some(chrono::Utc::now().timestamp() + 3600),
        };
        config::save_json_file(&path, &token).unwrap();

        let source = StoredToken::new(credentials(), &path);
        assert!(source.is_available());
        assert_eq!(source.access_token().unwrap(), "live");
    }

    #[test]
    fn test_expired_token_without_refresh_token_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let token = TokenFile {
            access_token: "stale".to_string(),
            refresh_token: None,
            expires_at: Some(0),
        };
        config::save_json_file(&path, &token).unwrap();

        let source = StoredToken::new(credentials(), &path);
        assert!(source.access_token().is_err());
    }

    #[test]
    fn test_missing_token_file_fails() {
        let dir = tempdir().unwrap();
        let source = StoredToken::new(credentials(), dir.path().join("none.json"));
        assert!(!source.is_available());
        assert!(source.access_token().is_err());
    }
}
