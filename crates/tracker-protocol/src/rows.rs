// crates/tracker-protocol/src/rows.rs

//! Row structs as they travel to and from the store.
//!
//! Read rows mirror the stored columns loosely: the hosted store may return
//! numeric ids, null flags or extra columns, so every read row is tolerant
//! and the strict typing happens in the `TryFrom` conversions into
//! `tracker_core` models.
//!
//! Write rows carry exactly the columns the tracker sets. `id` and
//! `created_at` are always assigned by the store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tracker_core::task::parse_due_date;
use tracker_core::{
    NewProject, NewTask, NewWorkstream, Profile, Project, ReorderPlan, Task, Workstream,
};

use crate::error::ProtocolError;

/// One row as a JSON object.
pub type Row = serde_json::Map<String, Value>;

// ============================================================================
// Read rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkstreamRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub workstream_id: String,
    #[serde(default)]
    pub sort_order: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl TryFrom<WorkstreamRow> for Workstream {
    type Error = ProtocolError;

    fn try_from(row: WorkstreamRow) -> Result<Self, Self::Error> {
        let created_at = row
            .created_at
            .as_deref()
            .map(|s| parse_timestamp("workstreams.created_at", s))
            .transpose()?;
        Ok(Workstream {
            id: row.id.into(),
            name: row.name,
            color: row.color,
            sort_order: row.sort_order,
            created_at,
        })
    }
}

impl TryFrom<ProjectRow> for Project {
    type Error = ProtocolError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            created_at: parse_timestamp("projects.created_at", &row.created_at)?,
            id: row.id.into(),
            title: row.title,
            status: row.status,
            workstream_id: row.workstream_id.into(),
            sort_order: row.sort_order,
        })
    }
}

impl TryFrom<TaskRow> for Task {
    type Error = ProtocolError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        // An empty string is how some clients clear a date.
        let due_date = match row.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(parse_due_date(s)?),
        };
        Ok(Task {
            created_at: parse_timestamp("tasks.created_at", &row.created_at)?,
            id: row.id.into(),
            project_id: row.project_id.into(),
            title: row.title,
            due_date,
            assignee: row.assignee,
            done: row.done.unwrap_or(false),
            sort_order: row.sort_order,
        })
    }
}

impl From<ProfileRow> for Profile {
    /// Unrecognised roles read as "no role"; the client only reflects it.
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id.into(),
            email: row.email,
            role: row.role.and_then(|r| r.parse().ok()),
        }
    }
}

// ============================================================================
// Write rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewWorkstreamRow {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub sort_order: i64,
}

impl NewWorkstreamRow {
    pub fn new(input: &NewWorkstream, sort_order: i64) -> Self {
        NewWorkstreamRow {
            name: input.name.clone(),
            color: input.color.clone(),
            sort_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProjectRow {
    pub title: String,
    pub status: String,
    pub workstream_id: String,
    pub sort_order: i64,
}

impl NewProjectRow {
    pub fn new(input: &NewProject, sort_order: i64) -> Self {
        NewProjectRow {
            title: input.title.clone(),
            status: input.status.clone(),
            workstream_id: input.workstream_id.to_string(),
            sort_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTaskRow {
    pub project_id: String,
    pub title: String,
    /// `YYYY-MM-DD`
    pub due_date: String,
    pub assignee: String,
    pub done: bool,
    pub sort_order: i64,
}

impl NewTaskRow {
    pub fn new(input: &NewTask, sort_order: i64) -> Self {
        NewTaskRow {
            project_id: input.project_id.to_string(),
            title: input.title.clone(),
            due_date: format_date(input.due_date),
            assignee: input.assignee.clone(),
            done: false,
            sort_order,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct DonePatch {
    pub done: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrderPatch {
    pub sort_order: i64,
}

/// One position write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSortUpdate {
    pub id: String,
    pub sort_order: i64,
}

impl RowSortUpdate {
    pub fn from_plan<I: AsRef<str>>(plan: &ReorderPlan<I>) -> Vec<RowSortUpdate> {
        plan.updates()
            .iter()
            .map(|u| RowSortUpdate {
                id: u.id.as_ref().to_string(),
                sort_order: u.sort_order,
            })
            .collect()
    }
}

/// Body of the batch reorder procedure call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub target_table: String,
    pub updates: Vec<RowSortUpdate>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Serialize a write row into a JSON object.
pub fn encode_row<T: Serialize>(value: &T) -> Result<Row, ProtocolError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(ProtocolError::NotAnObject),
    }
}

/// Deserialize a batch of rows into read-row structs.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, ProtocolError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)).map_err(ProtocolError::from))
        .collect()
}

/// Deserialize rows and convert each into its model type.
pub fn decode_models<R, M>(rows: Vec<Row>) -> Result<Vec<M>, ProtocolError>
where
    R: DeserializeOwned,
    M: TryFrom<R, Error = ProtocolError>,
{
    decode_rows::<R>(rows)?.into_iter().map(M::try_from).collect()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ProtocolError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ProtocolError::InvalidField {
            field,
            value: value.to_string(),
        })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or numeric id, got {other}"
        ))),
    }
}
