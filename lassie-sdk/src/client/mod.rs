//! HTTP client for the Lassie person API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the signing and shaping types do not pull in `reqwest`.

mod lassie;

pub use lassie::LassieClient;

use reqwest::StatusCode;

use crate::response::NormalizeError;

/// Errors produced by the SDK HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body was not valid JSON, or could not take the
    /// requested shape.
    #[error("response error: {0}")]
    Normalize(#[from] NormalizeError),

    /// The key store holds no person credentials; sign in first.
    #[error("person credentials missing from the key store")]
    AuthenticationRequired,

    /// Account selector outside the configured account list.
    #[error("account index {0} out of range (two accounts are configured)")]
    AccountIndex(usize),
}
