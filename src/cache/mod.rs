// Cache-or-fetch store for construction project records. The cache is shared
// application-wide; workflows only read from it and invalidate entries after
// their own writes succeed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::api::{ApiError, GwrTransport};
use crate::config::CacheConfig;
use crate::models::ConstructionProject;

/// Lookup and invalidation of construction project records.
#[async_trait]
pub trait ConstructionProjectStore: Send + Sync {
    /// Resolve a project by identifier, from the cache when possible.
    async fn get_from_cache_or_api(&self, project_id: u64)
        -> Result<ConstructionProject, ApiError>;

    /// Drop the cached entry for this project.
    async fn clear_cache(&self, project_id: u64);
}

/// Moka-backed store in front of the register transport.
#[derive(Debug)]
pub struct CachedProjectStore {
    transport: Arc<GwrTransport>,
    cache: Cache<u64, ConstructionProject>,
}

impl CachedProjectStore {
    pub fn new(transport: Arc<GwrTransport>, cache_config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(cache_config.max_capacity)
            .time_to_live(Duration::from_secs(cache_config.ttl_seconds))
            .build();
        Self { transport, cache }
    }
}

#[async_trait]
impl ConstructionProjectStore for CachedProjectStore {
    async fn get_from_cache_or_api(
        &self,
        project_id: u64,
    ) -> Result<ConstructionProject, ApiError> {
        if let Some(project) = self.cache.get(&project_id).await {
            debug!(project_id, "construction project cache hit");
            return Ok(project);
        }
        let project: ConstructionProject = self
            .transport
            .get_json(&format!("/constructionprojects/{project_id}"))
            .await?;
        self.cache.insert(project_id, project.clone()).await;
        Ok(project)
    }

    async fn clear_cache(&self, project_id: u64) {
        self.cache.invalidate(&project_id).await;
    }
}
