use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use super::request::{ApiResponse, StartVoiceChatRequest, StopVoiceChatRequest};

/// Errors from the agent lifecycle API
#[derive(Debug, Error)]
pub enum AgentApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {0}")]
    Status(u16),

    #[error("API refused the call: {code} {message}")]
    Remote { code: String, message: String },
}

/// Remote control surface that starts and stops the agent for a room
#[async_trait::async_trait]
pub trait AgentApi: Send + Sync {
    async fn start(&self, request: &StartVoiceChatRequest) -> Result<(), AgentApiError>;

    async fn stop(&self, request: &StopVoiceChatRequest) -> Result<(), AgentApiError>;
}

/// `AgentApi` over the signing OpenAPI proxy
pub struct HttpAgentApi {
    client: reqwest::Client,
    base_url: String,
    version: String,
}

impl HttpAgentApi {
    pub fn new(base_url: &str, version: &str, timeout: Duration) -> Result<Self, AgentApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            version: version.to_string(),
        })
    }

    async fn call<T: serde::Serialize + Sync>(
        &self,
        action: &str,
        body: &T,
    ) -> Result<(), AgentApiError> {
        let url = format!("{}/proxyAIGCFetch", self.base_url);

        info!("Calling {} (version {})", action, self.version);

        let response = self
            .client
            .post(&url)
            .query(&[("Action", action), ("Version", self.version.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("{} failed with HTTP {}", action, status);
            return Err(AgentApiError::Status(status.as_u16()));
        }

        let body: ApiResponse = response.json().await?;
        if let Some((code, message)) = body.error() {
            warn!("{} returned error {}: {}", action, code, message);
            return Err(AgentApiError::Remote { code, message });
        }

        info!("{} succeeded", action);

        Ok(())
    }
}

#[async_trait::async_trait]
impl AgentApi for HttpAgentApi {
    async fn start(&self, request: &StartVoiceChatRequest) -> Result<(), AgentApiError> {
        self.call("StartVoiceChat", request).await
    }

    async fn stop(&self, request: &StopVoiceChatRequest) -> Result<(), AgentApiError> {
        self.call("StopVoiceChat", request).await
    }
}
