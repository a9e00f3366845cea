//! Configuration for mailbox sessions
//!
//! Everything a session needs is passed in explicitly:
//! - [`SessionConfig`] names the application, the mailbox user and where the
//!   token file lives
//! - [`GmailCredentials`] holds the OAuth client used to refresh tokens,
//!   loaded from a Google Cloud Console JSON file, a JSON string, or the
//!   `GMAIL_CLIENT_ID` / `GMAIL_CLIENT_SECRET` environment variables

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Credentials filename in the application's config directory
const CREDENTIALS_FILE: &str = "google-credentials.json";

/// Token filename in the application's config directory
const TOKEN_FILE: &str = "gmail-tokens.json";

/// Mailbox user ID meaning "the authenticated user"
pub const DEFAULT_USER_ID: &str = "me";

/// Per-session settings threaded through session construction
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Application name; selects the config directory
    pub app_name: String,
    /// Mailbox user ID used in API paths
    pub user_id: String,
    /// Where the OAuth token file is stored
    pub token_path: PathBuf,
}

impl SessionConfig {
    /// Create a config for an application, with the token file in its
    /// config directory and the authenticated user as mailbox owner
    pub fn new(app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        let token_path =
            config::config_path(&app_name, TOKEN_FILE).unwrap_or_else(|| PathBuf::from(TOKEN_FILE));

        Self {
            app_name,
            user_id: DEFAULT_USER_ID.to_string(),
            token_path,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_token_path(mut self, token_path: impl Into<PathBuf>) -> Self {
        self.token_path = token_path.into();
        self
    }

    /// Default location of the OAuth client credentials file
    pub fn credentials_path(&self) -> Option<PathBuf> {
        config::config_path(&self.app_name, CREDENTIALS_FILE)
    }
}

/// OAuth credentials for Gmail API access
#[derive(Debug, Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file format
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<InstalledCredentials>,
    web: Option<InstalledCredentials>,
}

#[derive(Deserialize)]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
}

impl GmailCredentials {
    /// Load credentials from the application's config directory,
    /// falling back to environment variables
    pub fn load(config: &SessionConfig) -> Result<Self> {
        if config::config_exists(&config.app_name, CREDENTIALS_FILE) {
            let creds: GoogleCredentialFile = config::load_json(&config.app_name, CREDENTIALS_FILE)?;
            return Self::from_credential_file(creds);
        }

        Self::from_env()
    }

    /// Load credentials from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let creds: GoogleCredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(creds)
    }

    /// Parse credentials from JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GMAIL_CLIENT_ID")
            .context("GMAIL_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("GMAIL_CLIENT_SECRET")
            .context("GMAIL_CLIENT_SECRET environment variable not set")?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }

    // Desktop apps get an "installed" section, web apps a "web" one
    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        let installed = creds
            .installed
            .or(creds.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_installed_credentials() {
        let json = r#"{
            "installed": {
                "client_id": "test-client-id.apps.googleusercontent.com",
                "client_secret": "test-secret",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;

        let creds = GmailCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "test-client-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
    }

    #[test]
    fn test_parse_web_credentials() {
        let json = r#"{"web": {"client_id": "web-id", "client_secret": "web-secret"}}"#;
        let creds = GmailCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-id");
    }

    #[test]
    fn test_missing_section() {
        assert!(GmailCredentials::from_json(r#"{ "other": {} }"#).is_err());
    }

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::new("mailbox-test");
        assert_eq!(config.user_id, "me");
        assert!(config.token_path.ends_with("gmail-tokens.json"));

        let config = config
            .with_user_id("alice@example.com")
            .with_token_path("/tmp/tokens.json");
        assert_eq!(config.user_id, "alice@example.com");
        assert_eq!(config.token_path, PathBuf::from("/tmp/tokens.json"));
    }
}
