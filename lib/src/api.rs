//! Wire-level definitions shared between the mailer and its transports:
//! endpoint constants, the raw request/response pair and the provider's
//! error payload.

use std::fmt;
use std::ops::Deref;

use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};

use crate::Error;

pub const SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";
pub const MAIL_SEND_PATH: &str = "/v3/mail/send";

// Request timeout, in seconds
pub(crate) const SENDGRID_REQUEST_TIMEOUT: u64 = 30;

pub(crate) const USER_AGENT: &str = concat!("sendgrid-mailer/", env!("CARGO_PKG_VERSION"));

/// A single error reported by the provider.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ApiError {
    #[serde(default, deserialize_with = "nullable_string")]
    pub message: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub help: Option<String>,
}

impl ApiError {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            ..Default::default()
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

/// Ordered list of provider errors.
///
/// Only the first message makes it into the string form; inspect the
/// individual entries to see the rest.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Errors(pub Vec<ApiError>);

impl Deref for Errors {
    type Target = [ApiError];

    fn deref(&self) -> &[ApiError] {
        &self.0
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.first() {
            Some(err) => write!(f, "{}", err),
            None => Ok(()),
        }
    }
}

impl std::error::Error for Errors {}

/// Body of a failed provider response: `{"errors": [...]}`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Errors,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Raw request handed to a `Transport`.
#[derive(Clone)]
pub struct Request {
    pub method: Method,
    pub url: reqwest::Url,
    pub api_key: String,
    pub body: Vec<u8>,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("api_key", &"<redacted>")
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// Raw response returned by a `Transport`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Response {
    pub status_code: u16,
    pub body: String,
}

/// Builds an authenticated request for `path` on `base_url`.
/// The method defaults to GET; callers set it and the body.
pub fn build_request(api_key: &str, path: &str, base_url: &str) -> Result<Request, Error> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), path);

    Ok(Request {
        method: Method::GET,
        url: reqwest::Url::parse(&url)?,
        api_key: api_key.to_string(),
        body: Vec::new(),
    })
}

/// Map a provider response into a mailer error if applicable.
///
/// Any status below 400 is a success, whatever the body says. A failed
/// status with a parseable, non-empty error list becomes
/// `Error::Provider`. Any other failed status is treated as success unless
/// `strict` is set, in which case it becomes `Error::Status`.
pub fn map_status(resp: &Response, strict: bool) -> Result<(), Error> {
    if resp.status_code < 400 {
        return Ok(());
    }

    match serde_json::from_str::<ErrorResponse>(&resp.body) {
        Ok(parsed) if !parsed.errors.is_empty() => Err(Error::Provider(parsed.errors)),
        _ if strict => Err(Error::Status {
            status: resp.status_code,
            body: resp.body.clone(),
        }),
        _ => Ok(()),
    }
}
