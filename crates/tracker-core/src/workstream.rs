//! Workstreams: the top-level grouping that owns projects and gives them
//! a display color.

use chrono::{DateTime, Utc};

use crate::color::{self, Rgb};
use crate::error::CoreError;
use crate::ids::WorkstreamId;
use crate::ordering::Sortable;

#[derive(Debug, Clone, PartialEq)]
pub struct Workstream {
    pub id: WorkstreamId,
    pub name: String,
    /// Stored color as written by whoever created the row; may be absent
    /// or malformed.
    pub color: Option<String>,
    pub sort_order: Option<i64>,
    /// Not every deployment stores this for workstreams.
    pub created_at: Option<DateTime<Utc>>,
}

impl Workstream {
    pub fn display_color(&self) -> Rgb {
        color::resolve_color(self.color.as_deref(), &self.name)
    }
}

impl Sortable for Workstream {
    type Id = WorkstreamId;

    fn id(&self) -> &WorkstreamId {
        &self.id
    }

    fn sort_order(&self) -> Option<i64> {
        self.sort_order
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// Validated input for creating a workstream. The sort position is
/// assigned by the caller at insert time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkstream {
    pub name: String,
    /// Normalized `#rrggbb`; defaults to the palette color for known names.
    pub color: Option<String>,
}

impl NewWorkstream {
    pub fn new(name: &str, color: Option<&str>) -> Result<Self, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::MissingField("workstream name"));
        }

        let color = match color.map(str::trim).filter(|c| !c.is_empty()) {
            Some(hex) => Some(Rgb::from_hex(hex)?.to_hex()),
            None => color::palette_color(name).map(Rgb::to_hex),
        };

        Ok(NewWorkstream {
            name: name.to_string(),
            color,
        })
    }
}
