// Client-side status life cycle of the register. The register publishes which
// transitions are legal and which form fields each one requires; the catalog
// is stable enough that the original services keep it client-side too.

use crate::models::{BuildingStatus, TransitionParameter};

use BuildingStatus::*;

/// Statuses reachable from `status` with a single transition.
pub fn next_valid_states(status: BuildingStatus) -> Vec<BuildingStatus> {
    match status {
        Planned => vec![Authorized, UnderConstruction, NotRealized],
        Authorized => vec![UnderConstruction, NotRealized],
        UnderConstruction => vec![Existing, NotRealized],
        Existing => vec![NotUsable, Demolished],
        NotUsable => vec![Existing, Demolished],
        // Terminal states.
        Demolished | NotRealized => vec![],
    }
}

/// Form fields the register requires when transitioning `from` → `to`.
/// Empty for transitions the life cycle does not allow; callers are expected
/// to have checked [`next_valid_states`] first.
pub fn change_parameters(from: BuildingStatus, to: BuildingStatus) -> Vec<TransitionParameter> {
    if !next_valid_states(from).contains(&to) {
        return vec![];
    }
    parameters_for_status(to)
}

/// Form fields backing a status correction to `to`. Corrections bypass the
/// life cycle, so every status has an answer.
pub fn correction_parameters(to: BuildingStatus) -> Vec<TransitionParameter> {
    parameters_for_status(to)
}

fn parameters_for_status(status: BuildingStatus) -> Vec<TransitionParameter> {
    match status {
        UnderConstruction => vec![TransitionParameter::new("dateOfConstructionStart")],
        Existing => vec![TransitionParameter::new("dateOfConstruction")],
        Demolished => vec![TransitionParameter::new("dateOfDemolition")],
        Planned | Authorized | NotUsable | NotRealized => vec![],
    }
}
