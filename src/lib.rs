// gwr-workflow - building-record synchronization and status transitions
// This exposes the workflow controller and its collaborator seams for the
// host application and for testing.

pub mod api;
pub mod cache;
pub mod config;
pub mod controller;
pub mod intl;
pub mod models;
pub mod notify;
pub mod tasks;
pub mod telemetry;

// Re-export key types for easy access
pub use api::{ApiError, BuildingApi, GwrTransport, HttpBuildingApi};
pub use cache::{CachedProjectStore, ConstructionProjectStore};
pub use config::{ApiConfig, CacheConfig, GwrConfig, ObservabilityConfig, RateLimitConfig};
pub use controller::{BuildingFormController, Navigator, BUILDING_EDIT_FORM_ROUTE};
pub use intl::{Localizer, MessageCatalog};
pub use models::{
    Building, BuildingStatus, BuildingWork, ConstructionProject, FormModel, TransitionParameter,
};
pub use notify::{Notifier, TracingNotifier};
pub use tasks::{DropTask, LastValue};
pub use telemetry::{create_workflow_span, generate_correlation_id, init_telemetry};
