//! tracker-core
//!
//! Pure project-tracker logic:
//! - entities (workstreams, projects, tasks, profiles)
//! - sibling ordering (append, pairwise swap, reindex after move)
//! - board snapshot with color inheritance and grouping
//! - milestone calendar grid and weekly digest derivation

pub mod ids;
pub mod color;
pub mod profile;
pub mod workstream;
pub mod project;
pub mod task;
pub mod ordering;
pub mod board;
pub mod calendar;
pub mod digest;
pub mod error;

pub use ids::{ProjectId, TaskId, UserId, WorkstreamId};
pub use color::Rgb;
pub use profile::{Profile, Role};

pub use workstream::{NewWorkstream, Workstream};
pub use project::{NewProject, Project};
pub use task::{NewTask, Task};

pub use ordering::{
    AppendBase,
    Direction,
    ReorderPlan,
    SortUpdate,
    Sortable,
};

pub use board::Board;
pub use calendar::{CalendarCell, DayCell, Marker, MonthCursor, MonthGrid, WeekStart};
pub use digest::{DigestRow, WeekWindow, WeeklyDigest};
pub use error::CoreError;
