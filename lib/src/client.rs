use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::api::{self, Request, Response};
use crate::Error;

/// Submits a single request to the provider.
///
/// Implementations must be usable from several threads at once, since a
/// `Mailer` may be shared between callers.
pub trait Transport: Send + Sync {
    fn submit(&self, request: &Request) -> Result<Response, Error>;
}

/// Blocking HTTP transport backed by `reqwest`.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, Error> {
        Self::with_timeout(Duration::from_secs(api::SENDGRID_REQUEST_TIMEOUT))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(api::USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn submit(&self, request: &Request) -> Result<Response, Error> {
        let resp = self
            .client
            .request(request.method.clone(), request.url.clone())
            .bearer_auth(&request.api_key)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(request.body.clone())
            .send()?;

        let status_code = resp.status().as_u16();
        let body = resp.text()?;

        Ok(Response { status_code, body })
    }
}
