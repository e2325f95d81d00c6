use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use menuiserie_clients::Client;
use menuiserie_core::{ClientId, Entity, PostalAddress, ProjectId};

use crate::project_product::ProjectProduct;

/// Project status lifecycle.
///
/// Transitions are not constrained: a completed project may be moved back to
/// draft if the user says so.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    /// Value stored in `projects.status`.
    pub fn as_db(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    /// Unknown or missing values read as `Draft`.
    pub fn from_db(value: Option<&str>) -> Self {
        match value {
            Some("in_progress") => ProjectStatus::InProgress,
            Some("completed") => ProjectStatus::Completed,
            Some("cancelled") => ProjectStatus::Cancelled,
            Some("draft") | None => ProjectStatus::Draft,
            Some(other) => {
                tracing::warn!(status = other, "unknown project status; reading as draft");
                ProjectStatus::Draft
            }
        }
    }

    /// Still being worked on (neither completed nor cancelled).
    pub fn is_open(self) -> bool {
        matches!(self, ProjectStatus::Draft | ProjectStatus::InProgress)
    }
}

/// Project view model, with its client and configured products embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub client_id: ClientId,
    pub client: Client,
    /// Ordered by creation time, oldest first.
    pub products: Vec<ProjectProduct>,
    pub status: ProjectStatus,
    pub site_address: Option<PostalAddress>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub estimated_budget: Option<f64>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Number of physical items across all configured products.
    pub fn total_quantity(&self) -> u32 {
        self.products.iter().map(|p| p.quantity).sum()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_deref()
            .is_some_and(|tags| tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payload for creating a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub client_id: ClientId,
    #[serde(default)]
    pub status: ProjectStatus,
    pub site_address: Option<PostalAddress>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, client_id: ClientId) -> Self {
        Self {
            name: name.into(),
            description: None,
            client_id,
            status: ProjectStatus::Draft,
            site_address: None,
            planned_start: None,
            planned_end: None,
            notes: None,
            tags: None,
        }
    }
}

/// Partial update of a project.
///
/// Outer `None` leaves the field untouched; for nullable fields `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub client_id: Option<ClientId>,
    pub status: Option<ProjectStatus>,
    pub site_address: Option<Option<PostalAddress>>,
    pub planned_start: Option<Option<NaiveDate>>,
    pub planned_end: Option<Option<NaiveDate>>,
    pub notes: Option<Option<String>>,
    pub tags: Option<Option<Vec<String>>>,
}

impl ProjectPatch {
    pub fn status(status: ProjectStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}
