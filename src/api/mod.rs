pub mod errors;
pub mod http;
pub mod lifecycle;

pub use errors::ApiError;
pub use http::{GwrTransport, HttpBuildingApi};

use async_trait::async_trait;

use crate::models::{Building, BuildingStatus, BuildingWork, TransitionParameter};

/// Register operations on buildings, as consumed by the form controller.
/// Implementations cache reads and must support explicit invalidation.
#[async_trait]
pub trait BuildingApi: Send + Sync {
    /// Resolve a building by EGID, from the cache when possible.
    async fn get_from_cache_or_api(&self, egid: u64) -> Result<Building, ApiError>;

    /// Drop the cached entry for this EGID.
    async fn clear_cache(&self, egid: u64);

    /// Register a new building. The returned record carries the
    /// server-assigned EGID.
    async fn create(&self, building: &Building) -> Result<Building, ApiError>;

    /// Update an existing building in place.
    async fn update(&self, building: &Building) -> Result<(), ApiError>;

    /// Attach a building to a construction project.
    async fn bind_to_construction_project(
        &self,
        project_id: u64,
        egid: u64,
        work: &BuildingWork,
    ) -> Result<(), ApiError>;

    /// Move a building from `current` to `new` along the status life cycle.
    async fn transition_state(
        &self,
        building: &Building,
        current: BuildingStatus,
        new: BuildingStatus,
    ) -> Result<(), ApiError>;

    /// Statuses reachable from `status` with a single transition.
    fn next_valid_states(&self, status: BuildingStatus) -> Vec<BuildingStatus>;

    /// Form fields required for the `current` → `new` transition.
    fn change_parameters(
        &self,
        current: BuildingStatus,
        new: BuildingStatus,
    ) -> Vec<TransitionParameter>;

    /// Form fields backing a status correction to `new`.
    fn correction_parameters(&self, new: BuildingStatus) -> Vec<TransitionParameter>;
}
