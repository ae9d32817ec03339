use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::errors::{ConsoleError, ConsoleResult};
use crate::http_request::ConcreteRequest;
use crate::outcome::{parse_body, Outcome};

/// Something that can put a [`ConcreteRequest`] on the wire.
///
/// Implementations never fail: anything that goes wrong is reported as an
/// [`Outcome::Failure`].
#[async_trait(?Send)]
pub trait Transport {
    async fn issue(&self, request: &ConcreteRequest) -> Outcome;
}

/// Transport backed by a reqwest client. Relative request URLs are resolved
/// against `base_url`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> ConsoleResult<Self> {
        let parsed = base_url.parse::<reqwest::Url>().map_err(|e| ConsoleError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConsoleError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(ReqwestTransport {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resolve(&self, url: &str) -> String {
        match reqwest::Url::parse(url) {
            Ok(absolute) if matches!(absolute.scheme(), "http" | "https") => url.to_string(),
            _ => format!("{}{}", self.base_url, url),
        }
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn issue(&self, request: &ConcreteRequest) -> Outcome {
        let url = self.resolve(&request.url);
        let mut req = self
            .client
            .request(request.method.clone(), url.as_str())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        let res = match req.send().await {
            Ok(res) => res,
            Err(e) => return Outcome::unreachable(format!("{:#}", anyhow::Error::new(e))),
        };

        let status = res.status().as_u16();
        match res.text().await {
            Ok(text) => Outcome::from_response(status, parse_body(&text)),
            Err(e) => Outcome::Failure {
                status,
                body: serde_json::Value::String(format!("{:#}", anyhow::Error::new(e))),
            },
        }
    }
}

/// Sends composed requests through a [`Transport`] and logs how they resolve.
#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Dispatcher { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn send(&self, request: &ConcreteRequest) -> Outcome {
        debug!(method = %request.method, url = %request.url, "dispatching request");
        let started = Instant::now();
        let outcome = self.transport.issue(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Outcome::Success { status, .. } => {
                info!(method = %request.method, url = %request.url, status, elapsed_ms, "request succeeded")
            }
            Outcome::Failure { status, .. } => {
                warn!(method = %request.method, url = %request.url, status, elapsed_ms, "request failed")
            }
        }
        outcome
    }
}
