//! HTTP client for the chat gateway (POST application/json, bounded timeout).

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Connect or timeout failure before a response arrived.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// A response arrived but its body could not be read.
    #[error("{status} - {source}")]
    Body {
        status: StatusCode,
        source: reqwest::Error,
    },
    /// The gateway answered with something other than 200.
    #[error("code={} {}", .status.as_u16(), .body)]
    Status { status: StatusCode, body: String },
}

/// Something a finished message can be delivered to. Implemented by [`GatewayClient`];
/// sessions only depend on this so they can run against an in-process stand-in.
#[async_trait]
pub trait Deliver: Send + Sync {
    /// POST the JSON document; returns the response body on success.
    async fn deliver(&self, payload: String) -> Result<String, GatewayError>;
}

/// Client for a single gateway URL.
#[derive(Clone)]
pub struct GatewayClient {
    url: String,
    client: reqwest::Client,
}

impl GatewayClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `payload` as-is with Content-Type application/json and read the full body.
    pub async fn post(&self, payload: String) -> Result<String, GatewayError> {
        let res = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;
        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| GatewayError::Body { status, source })?;
        if status != StatusCode::OK {
            return Err(GatewayError::Status { status, body });
        }
        Ok(body)
    }
}

#[async_trait]
impl Deliver for GatewayClient {
    async fn deliver(&self, payload: String) -> Result<String, GatewayError> {
        self.post(payload).await
    }
}
