//! Projects: units of work under a workstream, containing tasks.

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::ids::{ProjectId, WorkstreamId};
use crate::ordering::Sortable;

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub status: Option<String>,
    pub workstream_id: WorkstreamId,
    pub sort_order: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Sortable for Project {
    type Id = ProjectId;

    fn id(&self) -> &ProjectId {
        &self.id
    }

    fn sort_order(&self) -> Option<i64> {
        self.sort_order
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

/// Validated input for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub workstream_id: WorkstreamId,
    pub title: String,
    pub status: String,
}

impl NewProject {
    /// Status given to every newly created project.
    pub const INITIAL_STATUS: &'static str = "active";

    /// Both a title and a workstream are required.
    pub fn new(workstream_id: Option<WorkstreamId>, title: &str) -> Result<Self, CoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::MissingField("project title"));
        }
        let workstream_id = workstream_id.ok_or(CoreError::MissingField("workstream"))?;

        Ok(NewProject {
            workstream_id,
            title: title.to_string(),
            status: Self::INITIAL_STATUS.to_string(),
        })
    }
}
