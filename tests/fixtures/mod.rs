// Recording test doubles for the workflow collaborators - no side effects,
// every call is captured for assertions.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use gwr_workflow::api::lifecycle;
use gwr_workflow::controller::Navigator;
use gwr_workflow::{
    ApiError, Building, BuildingApi, BuildingStatus, BuildingWork, ConstructionProject,
    ConstructionProjectStore, Notifier, TransitionParameter,
};

/// One call observed by the fake building API.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Get(u64),
    ClearCache(u64),
    Create,
    Update(Option<u64>),
    Bind {
        project_id: u64,
        egid: u64,
    },
    Transition {
        from: BuildingStatus,
        to: BuildingStatus,
    },
}

/// Fake building API that serves from an in-memory map and records calls.
pub struct RecordingBuildingApi {
    pub buildings: Mutex<HashMap<u64, Building>>,
    pub calls: Mutex<Vec<ApiCall>>,
    /// EGID the fake server assigns on create.
    pub created_egid: u64,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_transition: AtomicBool,
    /// When set, the next create blocks until the notify fires.
    pub hold_create: Mutex<Option<Arc<Notify>>>,
}

impl RecordingBuildingApi {
    pub fn new() -> Self {
        Self {
            buildings: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            created_egid: 4009999999,
            fail_create: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            fail_transition: AtomicBool::new(false),
            hold_create: Mutex::new(None),
        }
    }

    pub fn insert_building(&self, egid: u64, building: Building) {
        self.buildings.lock().unwrap().insert(egid, building);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, matcher: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matcher(call))
            .count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn validation_error(message: &str) -> ApiError {
        ApiError::Http {
            status: 400,
            message: "validation failed".to_string(),
            field_errors: vec![message.to_string()],
        }
    }
}

#[async_trait]
impl BuildingApi for RecordingBuildingApi {
    async fn get_from_cache_or_api(&self, egid: u64) -> Result<Building, ApiError> {
        self.record(ApiCall::Get(egid));
        self.buildings
            .lock()
            .unwrap()
            .get(&egid)
            .cloned()
            .ok_or(ApiError::Http {
                status: 404,
                message: format!("no building with EGID {egid}"),
                field_errors: vec![],
            })
    }

    async fn clear_cache(&self, egid: u64) {
        self.record(ApiCall::ClearCache(egid));
    }

    async fn create(&self, building: &Building) -> Result<Building, ApiError> {
        self.record(ApiCall::Create);
        let gate = self.hold_create.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::validation_error("name is required"));
        }
        let mut created = building.clone();
        created.egid = Some(self.created_egid);
        Ok(created)
    }

    async fn update(&self, building: &Building) -> Result<(), ApiError> {
        self.record(ApiCall::Update(building.egid));
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Self::validation_error("status is invalid"));
        }
        Ok(())
    }

    async fn bind_to_construction_project(
        &self,
        project_id: u64,
        egid: u64,
        _work: &BuildingWork,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::Bind { project_id, egid });
        Ok(())
    }

    async fn transition_state(
        &self,
        _building: &Building,
        current: BuildingStatus,
        new: BuildingStatus,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::Transition {
            from: current,
            to: new,
        });
        if self.fail_transition.load(Ordering::SeqCst) {
            return Err(ApiError::Http {
                status: 409,
                message: "transition rejected".to_string(),
                field_errors: vec![],
            });
        }
        Ok(())
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

/// Fake project store with call counting and an optional gate on reads.
pub struct RecordingProjectStore {
    pub project: Mutex<Option<ConstructionProject>>,
    pub get_calls: AtomicUsize,
    pub cleared: Mutex<Vec<u64>>,
    pub fail: AtomicBool,
    /// When set, the next read blocks until the notify fires.
    pub hold_next_get: Mutex<Option<Arc<Notify>>>,
}

impl RecordingProjectStore {
    pub fn new() -> Self {
        Self {
            project: Mutex::new(None),
            get_calls: AtomicUsize::new(0),
            cleared: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            hold_next_get: Mutex::new(None),
        }
    }

    pub fn with_project(project: ConstructionProject) -> Self {
        let store = Self::new();
        *store.project.lock().unwrap() = Some(project);
        store
    }

    pub fn set_project(&self, project: ConstructionProject) {
        *self.project.lock().unwrap() = Some(project);
    }

    pub fn cleared(&self) -> Vec<u64> {
        self.cleared.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConstructionProjectStore for RecordingProjectStore {
    async fn get_from_cache_or_api(
        &self,
        project_id: u64,
    ) -> Result<ConstructionProject, ApiError> {
        let gate = self.hold_next_get.lock().unwrap().take();
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Network("project store unavailable".to_string()));
        }
        self.project.lock().unwrap().clone().ok_or(ApiError::Http {
            status: 404,
            message: format!("no construction project {project_id}"),
            field_errors: vec![],
        })
    }

    async fn clear_cache(&self, project_id: u64) {
        self.cleared.lock().unwrap().push(project_id);
    }
}

/// Notifier that records every toast instead of showing it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub successes: Mutex<Vec<String>>,
    pub dangers: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn dangers(&self) -> Vec<String> {
        self.dangers.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn danger(&self, message: &str) {
        self.dangers.lock().unwrap().push(message.to_string());
    }
}

/// Navigator that records requested route transitions.
#[derive(Default)]
pub struct RecordingNavigator {
    pub transitions: Mutex<Vec<(String, u64)>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<(String, u64)> {
        self.transitions.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn transition_to(&self, route: &str, egid: u64) {
        self.transitions
            .lock()
            .unwrap()
            .push((route.to_string(), egid));
    }
}
