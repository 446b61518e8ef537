//! Backend seam for the voice client.
//!
//! The controller only needs "send a query, get a reply", so the HTTP details
//! live behind [`VoiceBackend`] and tests can swap in an in-memory backend.

use crate::config::ClientConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Used when the backend answers 2xx without a usable `reply`.
pub const NO_RESPONSE_REPLY: &str = "I could not find a response.";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {0}")]
    Status(u16),

    #[error("backend reply could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait VoiceBackend: Send + Sync {
    /// Submit one query and return the reply text.
    async fn ask(&self, query: &str) -> Result<String, BackendError>;
}

#[derive(Serialize)]
struct VoiceCommandBody<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct ReplyBody {
    #[serde(default)]
    reply: Option<String>,
}

/// Talks to `POST {base_url}/api/voice-command`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/voice-command", base_url.trim_end_matches('/')),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, BackendError> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl VoiceBackend for HttpBackend {
    async fn ask(&self, query: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&VoiceCommandBody { query })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body: ReplyBody = response
            .json()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))?;
        debug!(status = status.as_u16(), "Backend replied");

        Ok(body
            .reply
            .filter(|reply| !reply.is_empty())
            .unwrap_or_else(|| NO_RESPONSE_REPLY.to_string()))
    }
}
