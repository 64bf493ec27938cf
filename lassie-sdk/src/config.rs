//! Client configuration types.
//!
//! These are the validated runtime values a [`LassieClient`] is built
//! from. Loading and parsing (files, environment) is the embedding
//! application's concern.
//!
//! [`LassieClient`]: crate::client::LassieClient

use std::fmt;

use url::Url;

/// An API key/secret credential pair.
///
/// Two scopes exist in a deployment: the model pair, configured once per
/// installation, and the person pair issued to each authenticated user.
/// The secret never leaves the crate; only signatures derived from it
/// are transmitted.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    key: String,
    secret: String,
}

impl KeyPair {
    /// Create a new credential pair.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// The public API key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Static client configuration, supplied once at construction.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL that endpoint names are appended to verbatim. Deployments
    /// use a trailing slash (`https://club.example.net/api/v2/`); the
    /// client does not insert one.
    pub base_url: Url,
    /// The installation-wide model credential pair.
    pub model_keys: KeyPair,
    /// Identifiers of the two accounts transactions can be listed for,
    /// in selection-index order.
    pub accounts: [String; 2],
}

impl ApiConfig {
    /// Create a new `ApiConfig`.
    pub fn new(base_url: Url, model_keys: KeyPair, accounts: [String; 2]) -> Self {
        Self {
            base_url,
            model_keys,
            accounts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_secret() {
        let pair = KeyPair::new("pk_model_1", "very-secret");
        let rendered = format!("{pair:?}");
        assert!(rendered.contains("pk_model_1"));
        assert!(!rendered.contains("very-secret"));
    }
}
