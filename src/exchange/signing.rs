//! Authenticated request pipeline: nonce, encoding, HMAC-SHA512 signing and
//! interpretation of the `result` envelope.

use hmac::{Hmac, Mac};
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};
use sha2::Sha512;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::nonce::NonceProvider;
use super::Transport;
use crate::error::TradeError;

type HmacSha512 = Hmac<Sha512>;

pub const PRIVATE_API_PREFIX: &str = "/api/1/private/";
pub const KEY_HEADER: &str = "Key";
pub const SIGN_HEADER: &str = "Sign";

/// Everything except RFC 3986 unreserved characters gets escaped.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub type Params = BTreeMap<String, String>;

/// Serializes parameters as `k=v&k=v`, ordered by key.
pub fn encode_params(params: &Params) -> String {
    params
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, FORM_VALUE),
                utf8_percent_encode(v, FORM_VALUE)
            )
        })
        .collect::<Vec<String>>()
        .join("&")
}

/// Hex-encoded HMAC-SHA512 of `payload`.
pub fn sign(secret: &[u8], payload: &str) -> String {
    let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// A response parsed once into success or failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success(Map<String, Value>),
    Failure {
        message: Option<String>,
        body: Map<String, Value>,
    },
}

impl Envelope {
    pub fn parse(response: Value) -> Result<Self, TradeError> {
        let body = match response {
            Value::Object(map) => map,
            other => {
                return Err(TradeError::malformed(format!(
                    "the response is {}, not an object",
                    json_kind(&other)
                )))
            }
        };

        if is_truthy(body.get("result")) {
            return Ok(Envelope::Success(body));
        }

        let message = ["message", "msg"]
            .iter()
            .find_map(|field| body.get(*field))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        Ok(Envelope::Failure { message, body })
    }

    /// Yields the body on success, or on a failure whose message is in `ignored_errors`.
    pub fn into_result(self, ignored_errors: &[&str]) -> Result<Map<String, Value>, TradeError> {
        match self {
            Envelope::Success(body) => Ok(body),
            Envelope::Failure {
                message: Some(message),
                body,
            } => {
                if ignored_errors.contains(&message.as_str()) {
                    Ok(body)
                } else {
                    Err(TradeError::Api { message })
                }
            }
            Envelope::Failure { message: None, body } => Err(TradeError::Api {
                message: Value::Object(body).to_string(),
            }),
        }
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !(s.is_empty() || s.eq_ignore_ascii_case("false")),
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Signs and posts private API calls for a single credential.
pub struct SignedClient {
    key: String,
    secret: Vec<u8>,
    nonce: Arc<dyn NonceProvider>,
    transport: Arc<dyn Transport>,
}

impl SignedClient {
    pub fn new(
        key: String,
        secret: Vec<u8>,
        nonce: Arc<dyn NonceProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            key,
            secret,
            nonce,
            transport,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn set_nonce(&mut self, nonce: Arc<dyn NonceProvider>) {
        self.nonce = nonce;
    }

    pub async fn post(
        &self,
        method: &str,
        mut params: Params,
        ignored_errors: &[&str],
    ) -> Result<Map<String, Value>, TradeError> {
        let nonce = self.nonce.next();
        params.insert("nonce".to_string(), nonce.to_string());
        let body = encode_params(&params);
        let signature = sign(&self.secret, &body);

        let path = format!("{}{}", PRIVATE_API_PREFIX, method);
        let headers = [
            (KEY_HEADER, self.key.clone()),
            (SIGN_HEADER, signature),
        ];

        debug!("POST {} nonce={}", path, nonce);
        let response = self.transport.post(&path, &headers, &body).await?;

        Envelope::parse(response)?.into_result(ignored_errors)
    }
}

impl fmt::Debug for SignedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedClient")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
