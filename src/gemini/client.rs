// Generative Language API client

use crate::config::GeminiConfig;
use crate::error::{GatewayError, Result};
use crate::faultlog::FaultLog;
use crate::gemini::models::GenerateContentRequest;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Client for the Google Generative Language API.
///
/// Issues a single `generateContent` POST per dispatch with a bounded
/// timeout and classifies the outcome into the gateway error taxonomy.
/// No retries happen here; callers own retry policy. Every failure is
/// appended to the fault log before it is returned.
pub struct GeminiClient {
    http_client: Client,
    config: GeminiConfig,
    fault_log: Arc<FaultLog>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, fault_log: Arc<FaultLog>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .use_rustls_tls()
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config: config.clone(),
            fault_log,
        })
    }

    /// The model identifier requests are dispatched to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Whether a service credential is configured.
    pub fn has_credential(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Dispatch one `generateContent` call and return the raw JSON body.
    ///
    /// A missing credential fails immediately without touching the network.
    pub async fn generate_content(&self, request: &GenerateContentRequest) -> Result<Value> {
        let Some(api_key) = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
        else {
            return Err(self.fail(GatewayError::MissingCredential).await);
        };

        let url = format!(
            "{}/{}:generateContent",
            self.config.api_base_url, self.config.model
        );
        debug!(model = %self.config.model, "calling generateContent");

        let response = match self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Err(self.fail(GatewayError::Transport(e.to_string())).await);
            }
        };

        let status = response.status();
        if !status.is_success() {
            // Capture the body for debugging; upstream errors carry JSON or text.
            let body = response.text().await.unwrap_or_default();
            return Err(self
                .fail(GatewayError::UpstreamStatus {
                    code: status.as_u16(),
                    body,
                })
                .await);
        }

        match response.json::<Value>().await {
            Ok(body) => {
                debug!("received generateContent response");
                Ok(body)
            }
            Err(e) => {
                Err(self
                    .fail(GatewayError::Transport(format!(
                        "failed to read response body: {}",
                        e
                    )))
                    .await)
            }
        }
    }

    /// Record a dispatcher failure in the fault log and hand it back.
    async fn fail(&self, err: GatewayError) -> GatewayError {
        error!("upstream dispatch failed: {}", err);
        self.fault_log.record(&err.to_string()).await;
        err
    }
}
