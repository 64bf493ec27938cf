//! Client SDK for the Lassie association management REST API.
//!
//! Lassie authenticates requests with a per-request HMAC envelope rather
//! than sessions or bearer tokens; [`signature`] implements the scheme,
//! [`target`] composes request URLs and POST bodies around it, and
//! [`response`] reshapes the loosely typed answers. The [`client`]
//! module (cargo feature `client`, on by default) ties them to an HTTP
//! transport.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lassie_sdk::{ApiConfig, InMemoryKeyStore, KeyPair, LassieClient};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::new(
//!     Url::parse("https://club.example.net/api/v2/")?,
//!     KeyPair::new("pk_model_1", "model-secret"),
//!     ["NL01BANK0123456789".into(), "NL02BANK0000000001".into()],
//! );
//! let store = Arc::new(InMemoryKeyStore::new());
//! let client = LassieClient::new(config, store.clone());
//!
//! // Sign in and persist the issued person pair for later calls.
//! let keys = client.create_person_keys("jan", "tulip").await?;
//! if let Some(key) = keys.get("api_key").and_then(|v| v.as_str()) {
//!     store.insert("api_key", key);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod keystore;
pub mod response;
pub mod signature;
pub mod target;

#[cfg(feature = "client")]
pub use client::{ClientError, LassieClient};
pub use config::{ApiConfig, KeyPair};
pub use keystore::{API_KEY_NAME, API_SECRET_NAME, InMemoryKeyStore, KeyStore};
pub use response::{NormalizeError, ResponseShape};
pub use signature::{SignatureError, SignedEnvelope};
