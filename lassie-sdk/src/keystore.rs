//! Credential storage behind the client.
//!
//! Key material lives outside this crate. The host application decides
//! where it sits (an OS keychain, an encrypted file, plain memory) and
//! exposes it through [`KeyStore`]. The client only ever asks for named
//! entries and treats a missing entry as "not signed in".

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Store entry holding the person-scoped API key.
pub const API_KEY_NAME: &str = "api_key";
/// Store entry holding the matching signing secret.
pub const API_SECRET_NAME: &str = "api_secret";

/// Named lookup over externally managed credentials.
pub trait KeyStore: Send + Sync {
    /// Fetch the entry stored under `name`, if present.
    fn get(&self, name: &str) -> Option<String>;
}

/// Process-local [`KeyStore`] backed by a map.
///
/// Nothing is persisted; entries live as long as the store. Suitable for
/// tests and short-lived tools, and for hosts that load credentials into
/// memory themselves.
#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }

    /// Drop every entry, signing the store out.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl KeyStore for InMemoryKeyStore {
    fn get(&self, name: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_stored_entries() {
        let store = InMemoryKeyStore::new();
        store.insert(API_KEY_NAME, "pk_person_4421");
        store.insert(API_SECRET_NAME, "hunter2-secret");

        assert_eq!(store.get(API_KEY_NAME).as_deref(), Some("pk_person_4421"));
        assert_eq!(store.get(API_SECRET_NAME).as_deref(), Some("hunter2-secret"));
        assert_eq!(store.get("unrelated"), None);
    }

    #[test]
    fn clear_forgets_everything() {
        let store = InMemoryKeyStore::new();
        store.insert(API_KEY_NAME, "pk_person_4421");
        store.clear();
        assert_eq!(store.get(API_KEY_NAME), None);
    }
}
