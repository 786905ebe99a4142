// GWR domain records shared by the workflow controller and the API client.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Building status catalog of the federal register, serialized as the
/// numeric wire codes the register API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum BuildingStatus {
    Planned,
    Authorized,
    UnderConstruction,
    Existing,
    NotUsable,
    Demolished,
    NotRealized,
}

impl BuildingStatus {
    /// Wire code as defined by the register (GSTAT).
    pub fn code(self) -> u32 {
        match self {
            BuildingStatus::Planned => 1001,
            BuildingStatus::Authorized => 1002,
            BuildingStatus::UnderConstruction => 1003,
            BuildingStatus::Existing => 1004,
            BuildingStatus::NotUsable => 1005,
            BuildingStatus::Demolished => 1007,
            BuildingStatus::NotRealized => 1008,
        }
    }

    /// The full status catalog in code order.
    pub fn all() -> Vec<BuildingStatus> {
        vec![
            BuildingStatus::Planned,
            BuildingStatus::Authorized,
            BuildingStatus::UnderConstruction,
            BuildingStatus::Existing,
            BuildingStatus::NotUsable,
            BuildingStatus::Demolished,
            BuildingStatus::NotRealized,
        ]
    }
}

impl From<BuildingStatus> for u32 {
    fn from(status: BuildingStatus) -> u32 {
        status.code()
    }
}

impl TryFrom<u32> for BuildingStatus {
    type Error = String;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            1001 => Ok(BuildingStatus::Planned),
            1002 => Ok(BuildingStatus::Authorized),
            1003 => Ok(BuildingStatus::UnderConstruction),
            1004 => Ok(BuildingStatus::Existing),
            1005 => Ok(BuildingStatus::NotUsable),
            1007 => Ok(BuildingStatus::Demolished),
            1008 => Ok(BuildingStatus::NotRealized),
            other => Err(format!("unknown building status code: {other}")),
        }
    }
}

impl std::fmt::Display for BuildingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A building record as held by the register. The EGID is assigned by the
/// server on creation and is absent on records that were never saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    #[serde(rename = "EGID")]
    pub egid: Option<u64>,
    pub building_status: BuildingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demolition_date: Option<NaiveDate>,
}

impl Building {
    pub fn new(status: BuildingStatus) -> Self {
        Self {
            egid: None,
            building_status: status,
            name: None,
            municipality: None,
            construction_date: None,
            demolition_date: None,
        }
    }
}

/// Linkage record between a building and a construction project.
/// `is_new` marks a linkage that only exists in the form so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingWork {
    pub building: Building,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind_of_work: Option<u32>,
}

impl BuildingWork {
    /// A transient linkage for a building that has not been persisted yet.
    pub fn new_unsaved(building: Building) -> Self {
        Self {
            building,
            is_new: true,
            kind_of_work: None,
        }
    }
}

/// A construction project with its ordered building linkages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionProject {
    #[serde(rename = "EPROID")]
    pub eproid: u64,
    #[serde(default)]
    pub work: Vec<BuildingWork>,
}

/// A form field the register requires for a particular status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionParameter {
    pub field: String,
}

impl TransitionParameter {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }
}

/// The route model the form controller is bound to. The building identifier
/// arrives as a string from the route and is coerced to a number when it is
/// compared against EGIDs.
#[derive(Debug, Clone, PartialEq)]
pub struct FormModel {
    pub project_id: u64,
    pub building_id: String,
    pub building_work: Option<BuildingWork>,
}

impl FormModel {
    /// The building identifier as a number, if it parses as one.
    pub fn building_id_number(&self) -> Option<u64> {
        self.building_id.trim().parse().ok()
    }
}
