// Form controller for the building registration workflow. Orchestrates the
// fetch, save, transition and correction flows against the injected
// collaborators and owns the transient state the form renders.

use std::sync::{Arc, Mutex};

use tracing::{debug, error, warn, Instrument};

use crate::api::{ApiError, BuildingApi};
use crate::cache::ConstructionProjectStore;
use crate::intl::{keys, Localizer};
use crate::models::{Building, BuildingStatus, BuildingWork, FormModel, TransitionParameter};
use crate::notify::Notifier;
use crate::tasks::{DropTask, LastValue};
use crate::telemetry::{create_workflow_span, generate_correlation_id};

/// Route of the edit form, keyed by EGID after a save.
pub const BUILDING_EDIT_FORM_ROUTE: &str = "building.edit.form";

/// Route transitions requested by the workflows, performed by the host.
pub trait Navigator: Send + Sync {
    fn transition_to(&self, route: &str, egid: u64);
}

/// Transient per-session state shared by all clones of the controller.
struct FormState {
    correlation_id: String,
    model: Mutex<FormModel>,
    errors: Mutex<Vec<String>>,
    building_work: LastValue<BuildingWork>,
    building: LastValue<Building>,
    save_task: DropTask,
}

/// Controller behind the building edit form.
///
/// One instance per form session; clones are handles onto the same session.
/// Fetches publish through last-value slots so a superseded fetch can never
/// overwrite newer state, and saves are dropped while one is already in
/// flight.
#[derive(Clone)]
pub struct BuildingFormController {
    project_store: Arc<dyn ConstructionProjectStore>,
    building_api: Arc<dyn BuildingApi>,
    intl: Arc<dyn Localizer>,
    notification: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    state: Arc<FormState>,
}

impl BuildingFormController {
    pub fn new(
        project_store: Arc<dyn ConstructionProjectStore>,
        building_api: Arc<dyn BuildingApi>,
        intl: Arc<dyn Localizer>,
        notification: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        model: FormModel,
    ) -> Self {
        Self {
            project_store,
            building_api,
            intl,
            notification,
            navigator,
            state: Arc::new(FormState {
                correlation_id: generate_correlation_id(),
                model: Mutex::new(model),
                errors: Mutex::new(Vec::new()),
                building_work: LastValue::new(),
                building: LastValue::new(),
                save_task: DropTask::new(),
            }),
        }
    }

    /// Replace the route model, e.g. when the form is re-bound to another
    /// building of the same project.
    pub fn set_model(&self, model: FormModel) {
        *self.state.model.lock().expect("model lock") = model;
    }

    fn model(&self) -> FormModel {
        self.state.model.lock().expect("model lock").clone()
    }

    fn clear_errors(&self) {
        self.state.errors.lock().expect("errors lock").clear();
    }

    /// Correlation ID linking all log output of this form session.
    pub fn correlation_id(&self) -> &str {
        &self.state.correlation_id
    }

    fn workflow_span(&self, operation: &str) -> tracing::Span {
        let model = self.model();
        create_workflow_span(
            operation,
            Some(model.project_id),
            model.building_id_number(),
            Some(&self.state.correlation_id),
        )
    }

    // ---- observable state ------------------------------------------------

    /// Validation messages of the last failed save, empty otherwise.
    pub fn errors(&self) -> Vec<String> {
        self.state.errors.lock().expect("errors lock").clone()
    }

    /// Last published result of the building-work fetch.
    pub fn building_work(&self) -> Option<BuildingWork> {
        self.state.building_work.get()
    }

    /// Last published result of the building fetch.
    pub fn building(&self) -> Option<Building> {
        self.state.building.get()
    }

    pub fn is_fetching_building_work(&self) -> bool {
        self.state.building_work.is_running()
    }

    pub fn is_fetching_building(&self) -> bool {
        self.state.building.is_running()
    }

    pub fn is_saving(&self) -> bool {
        self.state.save_task.is_running()
    }

    // ---- derived options -------------------------------------------------

    /// Selectable initial statuses for the current linkage. A linkage that
    /// was never saved can only be registered as existing or not usable;
    /// every other status requires a server-assigned EGID.
    pub fn building_status_options(&self) -> Vec<BuildingStatus> {
        let is_new = self
            .model()
            .building_work
            .map(|work| work.is_new)
            .unwrap_or(false);
        if is_new {
            vec![BuildingStatus::Existing, BuildingStatus::NotUsable]
        } else {
            BuildingStatus::all()
        }
    }

    /// Statuses reachable from the loaded building's current status.
    /// Recomputed on every call since the status may have just changed.
    pub fn next_valid_states(&self) -> Vec<BuildingStatus> {
        match self.state.building.get() {
            Some(building) => self.building_api.next_valid_states(building.building_status),
            None => vec![],
        }
    }

    /// Form fields the register requires for `current` → `new`.
    pub fn change_parameters(
        &self,
        current: BuildingStatus,
        new: BuildingStatus,
    ) -> Vec<TransitionParameter> {
        self.building_api.change_parameters(current, new)
    }

    /// Form fields backing a status correction to `new`.
    pub fn correction_parameters(&self, new: BuildingStatus) -> Vec<TransitionParameter> {
        self.building_api.correction_parameters(new)
    }

    // ---- fetch workflows -------------------------------------------------

    /// Resolve the building linkage for the current project and building.
    ///
    /// Fetch errors are terminal for the invocation: they are logged and
    /// surfaced as a danger notification, and the result is `None`.
    pub async fn fetch_building_work(&self) -> Option<BuildingWork> {
        let span = self.workflow_span("fetch_building_work");
        async {
            let attempt = self.state.building_work.begin();
            match self.resolve_building_work().await {
                Ok(work) => {
                    attempt.publish(work.clone());
                    work
                }
                Err(err) => {
                    error!(error = %err, "failed to resolve building work");
                    self.notification
                        .danger(&self.intl.t(keys::LINKED_BUILDINGS_ERROR));
                    attempt.publish(None);
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn resolve_building_work(&self) -> Result<Option<BuildingWork>, ApiError> {
        let model = self.model();

        // A linkage that only exists in the form has no server identity to
        // look up yet.
        if let Some(work) = &model.building_work {
            if work.is_new {
                self.clear_errors();
                return Ok(Some(work.clone()));
            }
        }

        let project = self
            .project_store
            .get_from_cache_or_api(model.project_id)
            .await?;

        self.fetch_building().await?;

        let Some(wanted) = model.building_id_number() else {
            return Ok(None);
        };
        Ok(project
            .work
            .into_iter()
            .find(|work| work.building.egid == Some(wanted)))
    }

    /// Resolve the building for the current building identifier. Errors
    /// propagate to the caller; the published value keeps its previous state
    /// on failure.
    pub async fn fetch_building(&self) -> Result<Building, ApiError> {
        let span = self.workflow_span("fetch_building");
        async {
            let attempt = self.state.building.begin();
            let model = self.model();

            if let Some(work) = &model.building_work {
                if work.is_new {
                    self.clear_errors();
                    let building = work.building.clone();
                    attempt.publish(Some(building.clone()));
                    return Ok(building);
                }
            }

            let egid = model.building_id_number().ok_or(ApiError::MissingEgid)?;
            let building = self.building_api.get_from_cache_or_api(egid).await?;
            self.clear_errors();
            attempt.publish(Some(building.clone()));
            Ok(building)
        }
        .instrument(span)
        .await
    }

    // ---- save workflow ---------------------------------------------------

    /// Persist the currently held building linkage. A save requested while
    /// one is already in flight is dropped, not queued.
    pub async fn save_building_work(&self) {
        let span = self.workflow_span("save_building_work");
        async {
            let Some(_guard) = self.state.save_task.try_start() else {
                debug!("save already in flight, dropping duplicate request");
                return;
            };

            if let Err(err) = self.persist_building_work().await {
                error!(error = %err, "building save failed");
                let mut messages = err.field_errors().to_vec();
                if messages.is_empty() {
                    messages = vec![err.to_string()];
                }
                *self.state.errors.lock().expect("errors lock") = messages;
                self.notification
                    .danger(&self.intl.t(keys::BUILDING_SAVE_ERROR));
            }
        }
        .instrument(span)
        .await
    }

    async fn persist_building_work(&self) -> Result<(), ApiError> {
        let model = self.model();
        let work = self.state.building_work.get().ok_or(ApiError::NotLoaded)?;

        let mut egid = work.building.egid;
        if work.is_new {
            let created = self.building_api.create(&work.building).await?;
            egid = created.egid;
        } else {
            self.building_api.update(&work.building).await?;
        }
        let egid = egid.ok_or(ApiError::MissingEgid)?;

        self.building_api
            .bind_to_construction_project(model.project_id, egid, &work)
            .await?;

        // The project record changed on the server; the next read must not
        // see the cached copy.
        self.project_store.clear_cache(model.project_id).await;

        self.navigator.transition_to(BUILDING_EDIT_FORM_ROUTE, egid);
        self.notification
            .success(&self.intl.t(keys::BUILDING_SAVE_SUCCESS));
        Ok(())
    }

    // ---- status transition and correction --------------------------------

    /// Move the loaded building from `current` to `new` along the life
    /// cycle. Failures are logged and notified, then re-raised.
    pub async fn transition_state(
        &self,
        current: BuildingStatus,
        new: BuildingStatus,
    ) -> Result<(), ApiError> {
        let span = self.workflow_span("transition_state");
        async {
            let result = self.run_transition(current, new).await;
            if let Err(err) = &result {
                error!(error = %err, "status transition failed");
                self.notification
                    .danger(&self.intl.t(keys::BUILDING_SAVE_ERROR));
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_transition(
        &self,
        current: BuildingStatus,
        new: BuildingStatus,
    ) -> Result<(), ApiError> {
        let building = self.state.building.get().ok_or(ApiError::NotLoaded)?;
        self.building_api
            .transition_state(&building, current, new)
            .await?;
        self.after_building_mutation().await;
        self.notification
            .success(&self.intl.t(keys::BUILDING_SAVE_SUCCESS));
        Ok(())
    }

    /// Correct the recorded status without a formal transition.
    ///
    /// Precondition: the caller has already set the corrected status on the
    /// held building; this sends a plain update of that record.
    pub async fn correct_state(&self) -> Result<(), ApiError> {
        let span = self.workflow_span("correct_state");
        async {
            let result = self.run_correction().await;
            if let Err(err) = &result {
                error!(error = %err, "status correction failed");
                self.notification
                    .danger(&self.intl.t(keys::BUILDING_SAVE_ERROR));
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_correction(&self) -> Result<(), ApiError> {
        let building = self.state.building.get().ok_or(ApiError::NotLoaded)?;
        self.building_api.update(&building).await?;
        self.after_building_mutation().await;
        self.notification
            .success(&self.intl.t(keys::BUILDING_SAVE_SUCCESS));
        Ok(())
    }

    /// Invalidate the cached building and refresh it in the background. The
    /// refresh result is ignored here; it republishes the building slot and
    /// surfaces fetch-side errors on its own.
    async fn after_building_mutation(&self) {
        let model = self.model();
        if let Some(egid) = model.building_id_number() {
            self.building_api.clear_cache(egid).await;
        }

        let controller = self.clone();
        tokio::spawn(async move {
            if let Err(err) = controller.fetch_building().await {
                warn!(error = %err, "building refresh after write failed");
            }
        });
    }
}
