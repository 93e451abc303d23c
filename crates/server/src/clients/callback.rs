//! Best-effort delivery of classification results to a downstream receiver.

use std::time::Duration;

use opening_classifier::AnalysisResult;
use reqwest::Client;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Clone, Debug)]
pub struct CallbackClient {
    client: Client,
    url: String,
}

impl CallbackClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CallbackError> {
        let client = Client::builder()
            .user_agent("EcoWalkup/1.0")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Client for `CALLBACK_URL`, or `None` when delivery is not configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let url = config.callback_url.as_deref()?;
        match Self::new(url, config.callback_timeout()) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Failed to build callback client for {url}: {e}");
                None
            }
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn send(&self, result: &AnalysisResult) -> Result<(), CallbackError> {
        let resp = self.client.post(&self.url).json(result).send().await?;
        if !resp.status().is_success() {
            return Err(CallbackError::Status(resp.status()));
        }
        Ok(())
    }

    /// Post the result from a background task. Failures are only logged.
    pub fn deliver(&self, result: AnalysisResult) {
        let this = self.clone();
        tokio::spawn(async move {
            match this.send(&result).await {
                Ok(()) => tracing::debug!("Delivered result to {}", this.url),
                Err(e) => tracing::warn!("Failed to deliver result to {}: {e}", this.url),
            }
        });
    }
}
