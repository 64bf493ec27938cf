//! TOML file configuration and credential storage.
//!
//! Two files back the CLI: `lassie-config.toml` with the static API
//! settings, and `lassie-credentials.toml` holding the person pair
//! issued at login. The credentials file doubles as the [`KeyStore`]
//! the client reads before personal-scope requests.

use std::path::Path;

use lassie_sdk::{API_KEY_NAME, API_SECRET_NAME, ApiConfig, KeyPair, KeyStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Errors that can occur while loading or storing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Root configuration structure as read from `lassie-config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub api: ApiSection,
}

/// API configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    /// Base URL endpoint names are appended to (keep the trailing slash).
    pub base_url: Url,
    /// Installation-wide model API key.
    pub model_key: String,
    /// Secret belonging to the model key.
    pub model_secret: String,
    /// The two account identifiers transactions can be listed for.
    pub accounts: [String; 2],
}

impl FileConfig {
    /// Read and parse the configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Convert into the SDK's runtime configuration.
    pub fn into_api_config(self) -> ApiConfig {
        ApiConfig::new(
            self.api.base_url,
            KeyPair::new(self.api.model_key, self.api.model_secret),
            self.api.accounts,
        )
    }
}

/// Persisted person credentials, as stored in `lassie-credentials.toml`.
///
/// Both fields absent means signed out; that state parses fine and the
/// SDK turns it into an `AuthenticationRequired` error on use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
}

impl CredentialsFile {
    /// Read the credentials file; a missing file is the signed-out state.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the credentials file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let toml_string = toml::to_string_pretty(self)?;

        // Write atomically: write to temp file, then rename
        let temp_path = path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string)?;
        std::fs::rename(&temp_path, path)?;

        Ok(())
    }
}

/// [`KeyStore`] view over a loaded [`CredentialsFile`].
///
/// The file is read once at startup; a login rewrites it on disk and the
/// next invocation picks the new pair up.
#[derive(Debug)]
pub struct FileKeyStore {
    credentials: CredentialsFile,
}

impl FileKeyStore {
    pub fn new(credentials: CredentialsFile) -> Self {
        Self { credentials }
    }
}

impl KeyStore for FileKeyStore {
    fn get(&self, name: &str) -> Option<String> {
        match name {
            API_KEY_NAME => self.credentials.api_key.clone(),
            API_SECRET_NAME => self.credentials.api_secret.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let toml_str = r#"
[api]
base_url = "https://club.example.net/api/v2/"
model_key = "pk_model_1"
model_secret = "model-secret"
accounts = ["NL01BANK0123456789", "NL02BANK0000000001"]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.model_key, "pk_model_1");
        assert_eq!(config.api.accounts[1], "NL02BANK0000000001");

        let api = config.into_api_config();
        assert_eq!(api.base_url.as_str(), "https://club.example.net/api/v2/");
    }

    #[test]
    fn test_missing_credentials_file_means_signed_out() {
        let credentials =
            CredentialsFile::load("/nonexistent/lassie-credentials.toml").unwrap();
        assert!(credentials.api_key.is_none());

        let store = FileKeyStore::new(credentials);
        assert_eq!(store.get(API_KEY_NAME), None);
    }

    #[test]
    fn test_credentials_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "lassie-credentials-test-{}.toml",
            std::process::id()
        ));

        let credentials = CredentialsFile {
            api_key: Some("pk_person_4421".to_owned()),
            api_secret: Some("hunter2-secret".to_owned()),
        };
        credentials.save(&path).unwrap();

        let reloaded = CredentialsFile::load(&path).unwrap();
        let store = FileKeyStore::new(reloaded);
        assert_eq!(store.get(API_KEY_NAME).as_deref(), Some("pk_person_4421"));
        assert_eq!(store.get(API_SECRET_NAME).as_deref(), Some("hunter2-secret"));
        assert_eq!(store.get("unrelated"), None);

        std::fs::remove_file(&path).unwrap();
    }
}
