//! HTTP transport collaborator.
//!
//! One call performs exactly one request/response exchange on a fresh
//! connection and releases it on every exit path. There is no pooling and
//! no retry; failures surface immediately to the caller.

use std::io::Read as _;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::error::{Error, Result};

/// A single HTTP exchange, fully buffered.
#[derive(Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Sends one HTTP request and returns the response.
///
/// Implementations must support HEAD, GET, PUT, and DELETE and must not
/// retry on their own.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        body: Option<&[u8]>,
    ) -> Result<TransportResponse>;
}

/// Production transport: one fresh connection per request.
pub struct OneShotTransport {
    timeout: Option<Duration>,
    user_agent: String,
}

impl OneShotTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            user_agent: default_user_agent(),
        }
    }

    // A new agent per call keeps the connection from being pooled: the
    // agent is dropped with the response, closing the socket.
    fn agent(&self) -> ureq::Agent {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        ureq::Agent::new_with_config(config)
    }

    fn apply_headers<B>(
        &self,
        mut req: ureq::RequestBuilder<B>,
        headers: &HeaderMap,
    ) -> ureq::RequestBuilder<B> {
        req = req.header(http::header::USER_AGENT, self.user_agent.as_str());
        for (name, value) in headers.iter() {
            // ureq derives these two from the URL and the body.
            if name == &http::header::HOST || name == &http::header::CONTENT_LENGTH {
                continue;
            }
            let Ok(value_str) = value.to_str() else {
                continue;
            };
            req = req.header(name.as_str(), value_str);
        }

        if let Some(timeout) = self.timeout {
            req = req.config().timeout_global(Some(timeout)).build();
        }

        req
    }
}

impl Transport for OneShotTransport {
    fn send(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        body: Option<&[u8]>,
    ) -> Result<TransportResponse> {
        let agent = self.agent();

        let result = match method.as_str() {
            "GET" => {
                ensure_empty_body(body)?;
                self.apply_headers(agent.get(url.as_str()), headers).call()
            }
            "HEAD" => {
                ensure_empty_body(body)?;
                self.apply_headers(agent.head(url.as_str()), headers).call()
            }
            "DELETE" => {
                ensure_empty_body(body)?;
                self.apply_headers(agent.delete(url.as_str()), headers)
                    .call()
            }
            "PUT" => {
                let req = self.apply_headers(agent.put(url.as_str()), headers);
                match body {
                    Some(bytes) => req.send(bytes),
                    None => req.send_empty(),
                }
            }
            _ => return Err(Error::invalid_config("unsupported HTTP method")),
        };

        let resp = result.map_err(|err| {
            Error::transport(
                format!("request failed: {}", request_context(method, url)),
                Some(Box::new(err)),
            )
        })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let mut buf = Vec::new();
        resp.into_body()
            .into_reader()
            .read_to_end(&mut buf)
            .map_err(|e| Error::transport("failed to read response body", Some(Box::new(e))))?;

        Ok(TransportResponse {
            status,
            headers,
            body: Bytes::from(buf),
        })
    }
}

/// Converts a non-success response into an [`Error::Api`], recovering the
/// service's error code and message when the body carries them.
pub(crate) fn response_error(status: StatusCode, body: &[u8]) -> Error {
    let body = String::from_utf8_lossy(body);
    let snippet = crate::util::text::truncate_snippet(&body, 4096);

    if let Some(parsed) = crate::util::xml::parse_error_xml(&body) {
        return Error::Api {
            status,
            code: parsed.code,
            message: parsed.message,
            body_snippet: Some(snippet),
        };
    }

    Error::Api {
        status,
        code: None,
        message: None,
        body_snippet: Some(snippet),
    }
}

fn ensure_empty_body(body: Option<&[u8]>) -> Result<()> {
    match body {
        None => Ok(()),
        Some(_) => Err(Error::invalid_config(
            "this operation does not accept a request body",
        )),
    }
}

fn request_context(method: &Method, url: &Url) -> String {
    let authority = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    if authority.is_empty() {
        format!("{method} {}", url.path())
    } else {
        format!("{method} {authority}{}", url.path())
    }
}

fn default_user_agent() -> String {
    format!("bucketfile/{}", env!("CARGO_PKG_VERSION"))
}
