//! Request signing for the Lassie API.
//!
//! Every authenticated Lassie request carries a three-field envelope,
//! appended after all other query parameters (or merged into the form
//! body for POST requests):
//!
//! ```text
//! ?api_key={key}[&...]&api_hash_content={nonce}&api_hash={signature}
//! ```
//!
//! * `api_hash_content` — the wall clock in milliseconds plus a random
//!   offset in `0..10_000`, rendered in decimal. The offset makes
//!   same-millisecond collisions unlikely, but the value stays
//!   predictable to within the offset window; it is a replay
//!   discriminator, not a cryptographic nonce.
//! * `api_hash` — `HMAC-SHA256("{api_key}:{nonce}", secret)`, rendered
//!   as lowercase hex, with the hex string's bytes then Base64-encoded
//!   (standard alphabet, padded, no line wrapping).
//!
//! The hex-then-Base64 double encoding is part of the server contract:
//! Base64 over the raw digest bytes will not verify.

/// Query/form parameter name carrying the API key.
pub const API_KEY_PARAM: &str = "api_key";

/// Query/form parameter name carrying the nonce.
pub const NONCE_PARAM: &str = "api_hash_content";

/// Query/form parameter name carrying the signature.
pub const SIGNATURE_PARAM: &str = "api_hash";

/// Exclusive upper bound of the random nonce offset.
const NONCE_OFFSET_BOUND: i32 = 10_000;

/// Errors produced when verifying an envelope signature.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid signature")]
    SignatureMismatch,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

// ---------------------------------------------------------------------------
// SignedEnvelope
// ---------------------------------------------------------------------------

/// The three wire fields appended to every authenticated request.
///
/// An envelope is generated fresh for each request and never reused;
/// reusing one would defeat the nonce's replay protection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub api_key: String,
    pub nonce: String,
    pub signature: String,
}

impl SignedEnvelope {
    /// Sign a request with a fresh nonce.
    ///
    /// The secret never leaves this function; only the derived signature
    /// is carried by the envelope.
    pub fn new(api_key: &str, secret: &str) -> Self {
        Self::with_nonce(api_key, fresh_nonce(), secret)
    }

    /// Sign a request with an explicit nonce.
    ///
    /// Deterministic: the signature depends only on `api_key`, `nonce`,
    /// and `secret`, never on the wall clock directly.
    pub fn with_nonce(api_key: &str, nonce: impl Into<String>, secret: &str) -> Self {
        let nonce = nonce.into();
        let data = format!("{api_key}:{nonce}");
        let signature = compute_signature(data.as_bytes(), secret.as_bytes());
        Self {
            api_key: api_key.to_owned(),
            nonce,
            signature,
        }
    }

    /// Render the trailing query fragment (`&api_hash_content=…&api_hash=…`).
    ///
    /// The fragment must be the last thing appended to a request URL: the
    /// server expects the envelope after every other parameter.
    pub fn query_fragment(&self) -> String {
        format!(
            "&{NONCE_PARAM}={}&{SIGNATURE_PARAM}={}",
            self.nonce, self.signature
        )
    }

    /// The three wire fields as form entries for POST bodies.
    pub fn form_entries(&self) -> [(String, String); 3] {
        [
            (API_KEY_PARAM.to_owned(), self.api_key.clone()),
            (NONCE_PARAM.to_owned(), self.nonce.clone()),
            (SIGNATURE_PARAM.to_owned(), self.signature.clone()),
        ]
    }

    /// Verify the envelope signature against `secret`.
    ///
    /// Recomputes the signature from the carried `api_key` and `nonce`
    /// and compares in constant time. This is the server half of the
    /// contract; the client uses it in tests.
    pub fn verify(&self, secret: &str) -> Result<(), SignatureError> {
        let data = format!("{}:{}", self.api_key, self.nonce);
        let expected = compute_signature(data.as_bytes(), secret.as_bytes());
        ring::constant_time::verify_slices_are_equal(
            expected.as_bytes(),
            self.signature.as_bytes(),
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Nonce and signature primitives
// ---------------------------------------------------------------------------

/// Generate a fresh nonce: unix milliseconds plus a random offset in
/// `0..10_000`, in decimal.
pub fn fresh_nonce() -> String {
    use rand::Rng;

    let millis = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let offset: i32 = rand::rng().random_range(0..NONCE_OFFSET_BOUND);
    (millis + i128::from(offset)).to_string()
}

/// Compute the double-encoded HMAC-SHA256 signature over `data`.
///
/// The digest is hex-encoded first and the hex string's bytes are then
/// Base64-encoded. With `ring`, key construction and signing cannot
/// fail, so this is a total function.
pub fn compute_signature(data: &[u8], secret: &[u8]) -> String {
    let digest = ring::hmac::sign(&ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret), data);
    let hex_digest = hex::encode(digest.as_ref());
    fast32::base64::RFC4648.encode(hex_digest.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic_in_key_nonce_secret() {
        let a = SignedEnvelope::with_nonce("k", "1700000000000", "secret");
        let b = SignedEnvelope::with_nonce("k", "1700000000000", "secret");
        assert_eq!(a.signature, b.signature);

        let other_nonce = SignedEnvelope::with_nonce("k", "1700000000001", "secret");
        assert_ne!(a.signature, other_nonce.signature);
    }

    #[test]
    fn double_encoding_matches_rfc4231_vector() {
        // RFC 4231 test case 2: HMAC-SHA256("Jefe", "what do ya want
        // for nothing?") has a well-known digest. The signature is the
        // Base64 of that digest's hex rendering, not of the raw bytes.
        let sig = compute_signature(b"what do ya want for nothing?", b"Jefe");
        assert_eq!(
            sig,
            "NWJkY2MxNDZiZjYwNzU0ZTZhMDQyNDI2MDg5NTc1Yzc1YTAwM2YwODlkMjczOTgzOWRlYzU4Yjk2NGVjMzg0Mw=="
        );
    }

    #[test]
    fn envelope_matches_golden_vector() {
        let envelope =
            SignedEnvelope::with_nonce("pk_person_4421", "1738000000123", "hunter2-secret");
        assert_eq!(
            envelope.signature,
            "NWIxNjIxNjkwOWFhZmFlNTgxNzY1ODNmZDEzNWE2ZmVjNWZmNDkzZTYwMGRmYmYxOGM3MzU1YWM1NDc1NmY3Zg=="
        );
    }

    #[test]
    fn fresh_nonce_is_decimal() {
        let nonce = fresh_nonce();
        assert!(!nonce.is_empty());
        assert!(nonce.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn query_fragment_orders_nonce_before_signature() {
        let envelope = SignedEnvelope::with_nonce("key", "42", "secret");
        let fragment = envelope.query_fragment();
        assert!(fragment.starts_with("&api_hash_content=42&api_hash="));
        assert!(fragment.ends_with(&envelope.signature));
    }

    #[test]
    fn form_entries_carry_all_three_fields() {
        let envelope = SignedEnvelope::with_nonce("key", "42", "secret");
        let [key, nonce, signature] = envelope.form_entries();
        assert_eq!(key, ("api_key".to_owned(), "key".to_owned()));
        assert_eq!(nonce, ("api_hash_content".to_owned(), "42".to_owned()));
        assert_eq!(signature.0, "api_hash");
        assert_eq!(signature.1, envelope.signature);
    }

    #[test]
    fn verify_round_trips_and_rejects_tampering() {
        let envelope = SignedEnvelope::new("key", "secret");
        assert!(envelope.verify("secret").is_ok());
        assert!(envelope.verify("other-secret").is_err());

        let mut tampered = envelope.clone();
        tampered.nonce.push('0');
        assert!(matches!(
            tampered.verify("secret"),
            Err(SignatureError::SignatureMismatch)
        ));
    }
}
