// HTTP client for the register API: shared rate-limited transport plus the
// building operations, with a response cache for reads.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use moka::future::Cache;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{lifecycle, ApiError, BuildingApi};
use crate::config::{ApiConfig, CacheConfig};
use crate::models::{Building, BuildingStatus, BuildingWork, TransitionParameter};

/// Rate-limited JSON transport shared by the building client and the
/// construction project store.
#[derive(Debug)]
pub struct GwrTransport {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl GwrTransport {
    pub fn new(config: &ApiConfig) -> Self {
        let per_second =
            NonZeroU32::new(config.rate_limit.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.rate_limit.burst_capacity).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn post_no_content<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.send(Method::POST, path, Some(body)).await?;
        Ok(())
    }

    pub async fn put_no_content<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.send(Method::PUT, path, Some(body)).await?;
        Ok(())
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;

        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "register API request");

        let mut request = self.http.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(api_error_from_response(response).await)
    }
}

/// Validation payload the register attaches to rejected writes.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

async fn api_error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => ApiError::Http {
            status,
            message: body.message.unwrap_or_else(|| format!("HTTP {status}")),
            field_errors: body.errors,
        },
        Err(_) => ApiError::Http {
            status,
            message: if text.is_empty() {
                format!("HTTP {status}")
            } else {
                text
            },
            field_errors: vec![],
        },
    }
}

#[derive(Debug, Serialize)]
struct TransitionBody {
    #[serde(rename = "currentStatus")]
    current_status: BuildingStatus,
    #[serde(rename = "newStatus")]
    new_status: BuildingStatus,
}

/// Register building client backed by [`GwrTransport`] with a read cache.
#[derive(Debug)]
pub struct HttpBuildingApi {
    transport: Arc<GwrTransport>,
    cache: Cache<u64, Building>,
}

impl HttpBuildingApi {
    pub fn new(transport: Arc<GwrTransport>, cache_config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(cache_config.max_capacity)
            .time_to_live(Duration::from_secs(cache_config.ttl_seconds))
            .build();
        Self { transport, cache }
    }
}

#[async_trait]
impl BuildingApi for HttpBuildingApi {
    async fn get_from_cache_or_api(&self, egid: u64) -> Result<Building, ApiError> {
        if let Some(building) = self.cache.get(&egid).await {
            debug!(egid, "building cache hit");
            return Ok(building);
        }
        let building: Building = self.transport.get_json(&format!("/buildings/{egid}")).await?;
        self.cache.insert(egid, building.clone()).await;
        Ok(building)
    }

    async fn clear_cache(&self, egid: u64) {
        self.cache.invalidate(&egid).await;
    }

    async fn create(&self, building: &Building) -> Result<Building, ApiError> {
        self.transport.post_json("/buildings", building).await
    }

    async fn update(&self, building: &Building) -> Result<(), ApiError> {
        let egid = building.egid.ok_or(ApiError::MissingEgid)?;
        self.transport
            .put_no_content(&format!("/buildings/{egid}"), building)
            .await
    }

    async fn bind_to_construction_project(
        &self,
        project_id: u64,
        egid: u64,
        work: &BuildingWork,
    ) -> Result<(), ApiError> {
        self.transport
            .put_no_content(
                &format!("/constructionprojects/{project_id}/work/{egid}"),
                work,
            )
            .await
    }

    async fn transition_state(
        &self,
        building: &Building,
        current: BuildingStatus,
        new: BuildingStatus,
    ) -> Result<(), ApiError> {
        if !lifecycle::next_valid_states(current).contains(&new) {
            return Err(ApiError::InvalidTransition {
                from: current,
                to: new,
            });
        }
        let egid = building.egid.ok_or(ApiError::MissingEgid)?;
        self.transport
            .post_no_content(
                &format!("/buildings/{egid}/status"),
                &TransitionBody {
                    current_status: current,
                    new_status: new,
                },
            )
            .await
    }

    fn next_valid_states(&self, status: BuildingStatus) -> Vec<BuildingStatus> {
        lifecycle::next_valid_states(status)
    }

    fn change_parameters(
        &self,
        current: BuildingStatus,
        new: BuildingStatus,
    ) -> Vec<TransitionParameter> {
        lifecycle::change_parameters(current, new)
    }

    fn correction_parameters(&self, new: BuildingStatus) -> Vec<TransitionParameter> {
        lifecycle::correction_parameters(new)
    }
}
