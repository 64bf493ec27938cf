//! Request target composition.
//!
//! Lassie request URLs are plain string concatenations: the endpoint
//! name follows the base URL verbatim, and query parameters are appended
//! raw, without percent-encoding — the server reads them as-is, and
//! keys or values containing `&`, `=`, or non-ASCII bytes would corrupt
//! the query string. Every raw append goes through [`push_raw_param`],
//! so an encoding policy change lands in exactly one place.
//!
//! A signed GET target always ends with the envelope fragment, after
//! every other parameter. POST targets keep the URL bare and carry the
//! same fields as form parameters instead (the transport form-encodes
//! those; the no-encoding rule is a query-string contract only).

use url::Url;

use crate::config::KeyPair;
use crate::signature::{API_KEY_PARAM, SignedEnvelope};

/// Query parameter naming the model group.
const MODEL_GROUP_PARAM: &str = "name";

/// Query parameter naming the model method.
const MODEL_METHOD_PARAM: &str = "method";

/// Append `&{key}={value}` to `query`, verbatim.
pub fn push_raw_param(query: &mut String, key: &str, value: &str) {
    query.push('&');
    query.push_str(key);
    query.push('=');
    query.push_str(value);
}

/// Builder for a single request target.
///
/// Parameters appear on the wire in the order they are added here, after
/// `api_key` and any `name`/`method` pair, and before the envelope:
///
/// ```text
/// {base}{endpoint}?api_key={k}[&name={g}&method={m}][&extra…]&{envelope}
/// ```
#[derive(Debug, Clone)]
pub struct TargetBuilder<'a> {
    base: &'a Url,
    endpoint: &'a str,
    model: Option<(&'a str, &'a str)>,
    extra: String,
}

impl<'a> TargetBuilder<'a> {
    /// Start a target for `endpoint` under `base`.
    pub fn new(base: &'a Url, endpoint: &'a str) -> Self {
        Self {
            base,
            endpoint,
            model: None,
            extra: String::new(),
        }
    }

    /// Address a model group and method (`&name={group}&method={method}`).
    pub fn model(mut self, group: &'a str, method: &'a str) -> Self {
        self.model = Some((group, method));
        self
    }

    /// Append one extra parameter, unencoded, preserving call order.
    ///
    /// Keys must be unique per request; the server's handling of
    /// duplicates is unspecified.
    pub fn param(mut self, key: &str, value: &str) -> Self {
        push_raw_param(&mut self.extra, key, value);
        self
    }

    /// Compose the bare URL, without credentials or envelope.
    ///
    /// Only the account bootstrap endpoint is called this way; its
    /// envelope travels in the POST body instead.
    pub fn build_plain(self) -> String {
        format!("{}{}", self.base, self.endpoint)
    }

    /// Compose the signed GET URL for `keys`.
    ///
    /// Signs exactly once, with a fresh envelope; the envelope fragment
    /// is the final component.
    pub fn build_signed(self, keys: &KeyPair) -> String {
        let envelope = SignedEnvelope::new(keys.key(), keys.secret());
        let mut url = format!(
            "{}{}?{API_KEY_PARAM}={}",
            self.base, self.endpoint, envelope.api_key
        );
        if let Some((group, method)) = self.model {
            push_raw_param(&mut url, MODEL_GROUP_PARAM, group);
            push_raw_param(&mut url, MODEL_METHOD_PARAM, method);
        }
        url.push_str(&self.extra);
        url.push_str(&envelope.query_fragment());
        url
    }
}

/// Compose the form parameters of a signed POST body.
///
/// Caller fields keep their order; the envelope's three entries are
/// appended after them, mirroring the envelope-last rule for URLs.
pub fn signed_form(fields: &[(&str, &str)], keys: &KeyPair) -> Vec<(String, String)> {
    let envelope = SignedEnvelope::new(keys.key(), keys.secret());
    let mut params: Vec<(String, String)> = fields
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    params.extend(envelope.form_entries());
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://club.example.net/api/v2/").unwrap()
    }

    fn keys() -> KeyPair {
        KeyPair::new("K", "model-secret")
    }

    /// Everything before the envelope fragment, which is nonce-dependent.
    fn split_envelope(url: &str) -> (&str, &str) {
        url.split_once("&api_hash_content=")
            .expect("signed URL carries an envelope fragment")
    }

    #[test]
    fn plain_target_is_base_plus_endpoint() {
        let url = TargetBuilder::new(&base(), "person_create_api").build_plain();
        assert_eq!(url, "https://club.example.net/api/v2/person_create_api");
    }

    #[test]
    fn signed_target_appends_envelope_last() {
        let url = TargetBuilder::new(&base(), "person_information").build_signed(&keys());
        let (head, tail) = split_envelope(&url);
        assert_eq!(
            head,
            "https://club.example.net/api/v2/person_information?api_key=K"
        );
        assert!(tail.contains("&api_hash="));
    }

    #[test]
    fn model_target_orders_group_method_then_arguments() {
        let url = TargetBuilder::new(&base(), "model")
            .model("g", "m")
            .param("a", "1")
            .param("b", "2")
            .build_signed(&keys());
        let (head, _) = split_envelope(&url);
        assert_eq!(
            head,
            "https://club.example.net/api/v2/model?api_key=K&name=g&method=m&a=1&b=2"
        );
    }

    #[test]
    fn extra_parameter_sits_between_key_and_envelope() {
        let url = TargetBuilder::new(&base(), "person_payments")
            .param("selection", "NL01BANK0123456789")
            .build_signed(&keys());
        let (head, _) = split_envelope(&url);
        assert_eq!(
            head,
            "https://club.example.net/api/v2/person_payments?api_key=K&selection=NL01BANK0123456789"
        );
    }

    #[test]
    fn parameters_are_appended_verbatim() {
        // The server contract is raw append; reserved characters pass
        // through untouched.
        let url = TargetBuilder::new(&base(), "model")
            .model("g", "m")
            .param("note", "a&b=c")
            .build_signed(&keys());
        assert!(url.contains("&note=a&b=c"));
    }

    #[test]
    fn signed_form_keeps_fields_then_envelope() {
        let params = signed_form(&[("username", "jan"), ("password", "tulip")], &keys());
        assert_eq!(params.len(), 5);
        assert_eq!(params[0], ("username".to_owned(), "jan".to_owned()));
        assert_eq!(params[1], ("password".to_owned(), "tulip".to_owned()));
        assert_eq!(params[2].0, "api_key");
        assert_eq!(params[2].1, "K");
        assert_eq!(params[3].0, "api_hash_content");
        assert_eq!(params[4].0, "api_hash");
    }
}
