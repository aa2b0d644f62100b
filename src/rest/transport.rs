//! HTTP transport seam.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use super::error::{RestError, RestResult};
use crate::config::ServerSettings;

/// A response with its status and decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// JSON body, `Null` when empty, a string when not JSON
    pub body: Value,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-success response into [`RestError::Status`].
    pub fn error_for_status(self) -> RestResult<Value> {
        if self.is_success() {
            return Ok(self.body);
        }
        let message = match &self.body {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Err(RestError::Status {
            status: self.status,
            message,
        })
    }
}

/// Sends JSON requests to the analytics server.
///
/// `path` is a list of URL segments relative to the server base; each
/// segment is percent-encoded by the transport.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(&self, path: &[&str], body: &Value) -> RestResult<HttpResponse>;
}

/// [`HttpTransport`] over `reqwest` with bearer-token auth.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> RestResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| RestError::Configuration {
            message: format!("invalid base URL {base_url}: {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RestError::Configuration {
                message: format!("{base_url} cannot be used as a base URL"),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RestError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_settings(settings: &ServerSettings) -> RestResult<Self> {
        let url = settings
            .resolved_url()
            .map_err(|e| RestError::Configuration {
                message: e.to_string(),
            })?;
        let token = settings
            .resolved_token()
            .map_err(|e| RestError::Configuration {
                message: e.to_string(),
            })?;
        Self::new(&url, token, settings.timeout())
    }

    /// Full URL for `path` under the base URL.
    pub fn url(&self, path: &[&str]) -> RestResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RestError::Configuration {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, path: &[&str], body: &Value) -> RestResult<HttpResponse> {
        let url = self.url(path)?;
        let mut request = self.client.post(url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| RestError::Network {
            message: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| RestError::Network {
            message: e.to_string(),
        })?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok(HttpResponse { status, body })
    }
}
