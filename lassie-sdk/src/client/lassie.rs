//! Person API client (member app → Lassie server).
//!
//! One typed operation per endpoint, plus a generic model invocation for
//! everything else. Two credential scopes drive the operations:
//!
//! - the **model pair** from [`ApiConfig`] signs the account bootstrap
//!   and generic model calls;
//! - the **person pair**, read from the [`KeyStore`] before every
//!   personal-scope request, signs profile and payment calls. A store
//!   without person entries fails fast with
//!   [`ClientError::AuthenticationRequired`], before anything is sent.
//!
//! Every request is signed fresh; nothing envelope-related is cached
//! between calls.

use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use serde_json::{Map, Value};

use super::ClientError;
use crate::config::{ApiConfig, KeyPair};
use crate::keystore::{API_KEY_NAME, API_SECRET_NAME, KeyStore};
use crate::response::{self, NormalizeError, ResponseShape};
use crate::target::{TargetBuilder, signed_form};

/// Endpoint exchanging a username/password login for person credentials.
const CREATE_PERSON_ENDPOINT: &str = "person_create_api";
/// Endpoint serving the signed-in user's profile record.
const PERSON_INFORMATION_ENDPOINT: &str = "person_information";
/// Endpoint listing an account's transactions.
const PERSON_PAYMENTS_ENDPOINT: &str = "person_payments";
/// Endpoint accepting profile field updates.
const PERSON_UPDATE_ENDPOINT: &str = "person_update";
/// Generic model invocation endpoint.
const MODEL_ENDPOINT: &str = "model";

/// Query parameter selecting the account on the payments endpoint.
const SELECTION_PARAM: &str = "selection";

/// Typed HTTP client for the **Lassie person API**.
///
/// Construction is cheap and the client is `Clone`; clones share the
/// underlying connection pool and key store.
#[derive(Clone)]
pub struct LassieClient {
    http: Client,
    config: ApiConfig,
    store: Arc<dyn KeyStore>,
}

impl LassieClient {
    /// Create a new `LassieClient`.
    ///
    /// * `config` – base URL, model pair, and account identifiers.
    /// * `store` – credential store queried for the person pair before
    ///   every personal-scope request.
    pub fn new(config: ApiConfig, store: Arc<dyn KeyStore>) -> Self {
        Self {
            http: Client::new(),
            config,
            store,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// The static configuration the client was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Read the person pair from the key store.
    ///
    /// Both entries must be present; anything less means the user never
    /// signed in (or signed out since) and no request goes out.
    fn person_keys(&self) -> Result<KeyPair, ClientError> {
        match (self.store.get(API_KEY_NAME), self.store.get(API_SECRET_NAME)) {
            (Some(key), Some(secret)) => Ok(KeyPair::new(key, secret)),
            _ => Err(ClientError::AuthenticationRequired),
        }
    }

    /// `POST person_create_api` – exchange a username/password login for
    /// a person credential pair.
    ///
    /// Signed with the model pair, so it works from a signed-out state.
    /// The URL stays bare; the envelope travels in the form body along
    /// with the login fields. On success the response object carries the
    /// new person keys — persisting them into the key store is the
    /// caller's responsibility.
    pub async fn create_person_keys(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Map<String, Value>, ClientError> {
        let url = TargetBuilder::new(&self.config.base_url, CREATE_PERSON_ENDPOINT).build_plain();
        let form = signed_form(
            &[("username", username), ("password", password)],
            &self.config.model_keys,
        );

        let resp = self.http.post(url).form(&form).send().await?;
        object_response(resp).await
    }

    /// `GET person_information` – fetch the signed-in user's profile
    /// record.
    pub async fn get_person_information(&self) -> Result<Map<String, Value>, ClientError> {
        let keys = self.person_keys()?;
        let url = TargetBuilder::new(&self.config.base_url, PERSON_INFORMATION_ENDPOINT)
            .build_signed(&keys);

        let resp = self.http.get(url).send().await?;
        object_response(resp).await
    }

    /// `POST person_update` – update fields on the person record.
    ///
    /// `fields` maps record field names to replacement values, passed
    /// through as-is; the server decides which fields are writable.
    pub async fn update_person(
        &self,
        fields: &[(&str, &str)],
    ) -> Result<Map<String, Value>, ClientError> {
        let keys = self.person_keys()?;
        let url = TargetBuilder::new(&self.config.base_url, PERSON_UPDATE_ENDPOINT).build_plain();
        let form = signed_form(fields, &keys);

        let resp = self.http.post(url).form(&form).send().await?;
        object_response(resp).await
    }

    /// `GET person_payments` – list the transactions of one configured
    /// account.
    ///
    /// `account` indexes [`ApiConfig::accounts`]. An index past the
    /// configured pair is a caller bug and is rejected before the
    /// credential lookup, never clamped to a valid account.
    pub async fn list_transactions(&self, account: usize) -> Result<Vec<Value>, ClientError> {
        let selection = self
            .config
            .accounts
            .get(account)
            .ok_or(ClientError::AccountIndex(account))?;
        let keys = self.person_keys()?;
        let url = TargetBuilder::new(&self.config.base_url, PERSON_PAYMENTS_ENDPOINT)
            .param(SELECTION_PARAM, selection)
            .build_signed(&keys);

        let resp = self.http.get(url).send().await?;
        array_response(resp).await
    }

    /// `GET model` – call a method on a named model group.
    ///
    /// The generic escape hatch for endpoints without a dedicated
    /// operation, signed with the model pair. `args` are appended in
    /// slice order; `shape` selects the container the response is
    /// normalized into, so the returned value is guaranteed to be an
    /// object or an array accordingly.
    pub async fn invoke_model(
        &self,
        group: &str,
        method: &str,
        args: Option<&[(&str, &str)]>,
        shape: ResponseShape,
    ) -> Result<Value, ClientError> {
        let mut target =
            TargetBuilder::new(&self.config.base_url, MODEL_ENDPOINT).model(group, method);
        for &(key, value) in args.unwrap_or_default() {
            target = target.param(key, value);
        }
        let url = target.build_signed(&self.config.model_keys);

        let resp = self.http.get(url).send().await?;
        shaped_response(resp, shape).await
    }
}

impl fmt::Debug for LassieClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LassieClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

async fn object_response(resp: reqwest::Response) -> Result<Map<String, Value>, ClientError> {
    let value = parse_json(resp).await?;
    Ok(response::coerce_object(value))
}

async fn array_response(resp: reqwest::Response) -> Result<Vec<Value>, ClientError> {
    let value = parse_json(resp).await?;
    Ok(response::coerce_array(value)?)
}

async fn shaped_response(
    resp: reqwest::Response,
    shape: ResponseShape,
) -> Result<Value, ClientError> {
    let value = parse_json(resp).await?;
    Ok(response::normalize_value(value, shape)?)
}

/// Shared status and body handling.
///
/// A non-2xx answer becomes [`ClientError::Api`] carrying the raw error
/// body; a 2xx body must parse as JSON. Both the object- and
/// array-shaped paths report errors this same way.
async fn parse_json(resp: reqwest::Response) -> Result<Value, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    let value = serde_json::from_slice(&bytes).map_err(NormalizeError::from)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::InMemoryKeyStore;
    use url::Url;

    /// Port 9 (discard) is closed on any sane test machine, so a request
    /// that does reach the transport fails immediately as `Http`.
    fn config() -> ApiConfig {
        ApiConfig::new(
            Url::parse("http://127.0.0.1:9/api/").unwrap(),
            KeyPair::new("pk_model_1", "model-secret"),
            [
                "NL01BANK0123456789".to_owned(),
                "NL02BANK0000000001".to_owned(),
            ],
        )
    }

    #[tokio::test]
    async fn person_scope_fails_fast_without_stored_credentials() {
        let client = LassieClient::new(config(), Arc::new(InMemoryKeyStore::new()));

        // `AuthenticationRequired` (not `Http`) proves the credential
        // check ran before any dispatch toward the closed port.
        let err = client.get_person_information().await.unwrap_err();
        assert!(matches!(err, ClientError::AuthenticationRequired));

        let err = client.update_person(&[("nickname", "jan")]).await.unwrap_err();
        assert!(matches!(err, ClientError::AuthenticationRequired));

        let err = client.list_transactions(0).await.unwrap_err();
        assert!(matches!(err, ClientError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn out_of_range_account_index_is_rejected_first() {
        // The store is empty too: getting `AccountIndex` rather than
        // `AuthenticationRequired` pins the bounds check ahead of the
        // credential lookup.
        let client = LassieClient::new(config(), Arc::new(InMemoryKeyStore::new()));

        let err = client.list_transactions(2).await.unwrap_err();
        assert!(matches!(err, ClientError::AccountIndex(2)));
    }

    #[tokio::test]
    async fn bootstrap_does_not_touch_the_key_store() {
        let client = LassieClient::new(config(), Arc::new(InMemoryKeyStore::new()));

        // Signed with the model pair; the empty store is no obstacle, so
        // the call gets as far as the (closed) transport.
        let err = client.create_person_keys("jan", "tulip").await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
