//! REST API client for the optimizer service
//!
//! Thin reqwest transport to the named endpoints. Every response body is
//! parsed into the typed records from `shared` before it leaves this module.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

use shared::{
    HealthStatus, ModelInfo, OptimizationRequest, OptimizationResult, Player, Position,
    PositionStat, RefreshSummary, TopPlayer,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::traits::ApiClient;

/// Real API client backed by `reqwest`
#[derive(Clone)]
pub struct RealApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl RealApiClient {
    /// Create a new API client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T>(&self, path: &str) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let started = Instant::now();
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, path))?;

        let result = Self::read_response(response, path).await;
        debug!(endpoint = path, elapsed_ms = started.elapsed().as_millis() as u64, ok = result.is_ok(), "GET completed");
        result
    }

    async fn post_json<B, T>(&self, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let started = Instant::now();
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, path))?;

        let result = Self::read_response(response, path).await;
        debug!(endpoint = path, elapsed_ms = started.elapsed().as_millis() as u64, ok = result.is_ok(), "POST completed");
        result
    }

    async fn read_response<T>(response: reqwest::Response, endpoint: &str) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::from_transport(e, endpoint))?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "Remote returned an error status");
            return Err(ClientError::Remote {
                status: status.as_u16(),
                body: remote_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            ClientError::validation(format!("{endpoint}: unexpected response shape: {e}"))
        })
    }
}

/// Error bodies from the service look like `{"detail": "..."}`; fall back to
/// the raw body when they don't.
fn remote_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        },
        _ => body.trim().to_string(),
    }
}

#[async_trait]
impl ApiClient for RealApiClient {
    async fn get_players(&self) -> ClientResult<Vec<Player>> {
        self.get_json("/api/players").await
    }

    async fn optimize_team(&self, request: &OptimizationRequest) -> ClientResult<OptimizationResult> {
        self.post_json("/api/optimize", Some(request)).await
    }

    async fn get_position_stats(&self) -> ClientResult<Vec<PositionStat>> {
        self.get_json("/api/analytics/position-stats").await
    }

    async fn get_top_players(&self, position: Position, limit: u32) -> ClientResult<Vec<TopPlayer>> {
        self.get_json(&format!("/api/top-players/{}?limit={}", position.code(), limit))
            .await
    }

    async fn health_check(&self) -> ClientResult<HealthStatus> {
        self.get_json("/api/health").await
    }

    async fn refresh_data(&self) -> ClientResult<RefreshSummary> {
        self.post_json::<(), _>("/api/refresh-data", None).await
    }

    async fn get_model_info(&self) -> ClientResult<ModelInfo> {
        self.get_json("/api/model-info").await
    }
}
