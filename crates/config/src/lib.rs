//! Configuration directory helpers
//!
//! Resolves per-application configuration files under the platform config
//! directory (`~/.config/<app>/` on Linux). The application name is always
//! passed in by the caller so several tools can share this crate without
//! stepping on each other's files.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Get the config directory for an application (`~/.config/<app>/`)
pub fn config_dir(app: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(app))
}

/// Get the path to a config file within an application's config directory
pub fn config_path(app: &str, filename: &str) -> Option<PathBuf> {
    config_dir(app).map(|p| p.join(filename))
}

/// Check if a config file exists in an application's config directory
pub fn config_exists(app: &str, filename: &str) -> bool {
    config_path(app, filename).is_some_and(|p| p.exists())
}

/// Ensure an application's config directory exists, returning its path
pub fn ensure_config_dir(app: &str) -> Result<PathBuf> {
    let dir = config_dir(app).context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Load and parse a JSON config file from an application's config directory
pub fn load_json<T: DeserializeOwned>(app: &str, filename: &str) -> Result<T> {
    let path = config_path(app, filename).context("Could not determine config directory")?;
    load_json_file(&path)
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Save a value as JSON into an application's config directory
pub fn save_json<T: Serialize>(app: &str, filename: &str, value: &T) -> Result<()> {
    let dir = ensure_config_dir(app)?;
    save_json_file(&dir.join(filename), value)
}

/// Save a value as pretty-printed JSON at an arbitrary path
///
/// Parent directories are created as needed.
pub fn save_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        retries: u32,
    }

    #[test]
    fn test_config_dir_uses_app_name() {
        let dir = config_dir("mailbox-test");
        assert!(dir.is_some());
        assert!(dir.unwrap().ends_with("mailbox-test"));
    }

    #[test]
    fn test_config_path() {
        let path = config_path("mailbox-test", "tokens.json").unwrap();
        assert!(path.ends_with("mailbox-test/tokens.json"));
    }

    #[test]
    fn test_save_and_load_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.json");
        let sample = Sample {
            name: "inbox".to_string(),
            retries: 3,
        };

        save_json_file(&path, &sample).unwrap();
        let loaded: Sample = load_json_file(&path).unwrap();

        assert_eq!(loaded, sample);
    }

    #[test]
    fn test_load_missing_file_mentions_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = load_json_file::<Sample>(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
