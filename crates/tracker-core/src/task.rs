//! Tasks: leaf work items with a due date, assignee and completion flag.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::CoreError;
use crate::ids::{ProjectId, TaskId};
use crate::ordering::Sortable;

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub assignee: Option<String>,
    pub done: bool,
    pub sort_order: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Incomplete and dated: the tasks that show up on the calendar and
    /// in the weekly digest.
    pub fn open_due_date(&self) -> Option<NaiveDate> {
        if self.done {
            None
        } else {
            self.due_date
        }
    }
}

impl Sortable for Task {
    type Id = TaskId;

    fn id(&self) -> &TaskId {
        &self.id
    }

    fn sort_order(&self) -> Option<i64> {
        self.sort_order
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

/// Validated input for creating a task. New tasks always start not done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub project_id: ProjectId,
    pub title: String,
    pub due_date: NaiveDate,
    pub assignee: String,
}

impl NewTask {
    /// Title, due date and assignee are all required; checked in that order.
    pub fn new(
        project_id: ProjectId,
        title: &str,
        due_date: &str,
        assignee: &str,
    ) -> Result<Self, CoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::MissingField("task title"));
        }
        let due_date = due_date.trim();
        if due_date.is_empty() {
            return Err(CoreError::MissingField("due date"));
        }
        let due_date = parse_due_date(due_date)?;
        let assignee = assignee.trim();
        if assignee.is_empty() {
            return Err(CoreError::MissingField("assignee"));
        }

        Ok(NewTask {
            project_id,
            title: title.to_string(),
            due_date,
            assignee: assignee.to_string(),
        })
    }
}

/// Parse a calendar day in `YYYY-MM-DD` form.
pub fn parse_due_date(s: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CoreError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn all_fields_required() {
        let pid = ProjectId::new("p");
        assert_eq!(
            NewTask::new(pid.clone(), " ", "2026-01-05", "Amy"),
            Err(CoreError::MissingField("task title"))
        );
        assert_eq!(
            NewTask::new(pid.clone(), "Budget", "", "Amy"),
            Err(CoreError::MissingField("due date"))
        );
        assert_eq!(
            NewTask::new(pid, "Budget", "2026-01-05", "  "),
            Err(CoreError::MissingField("assignee"))
        );
    }

    #[test]
    fn rejects_bad_dates() {
        assert_eq!(
            NewTask::new("p".into(), "Budget", "2026-02-30", "Amy"),
            Err(CoreError::InvalidDate("2026-02-30".to_string()))
        );
    }

    #[test]
    fn open_due_date_ignores_done_tasks() {
        let mut task = Task {
            id: "t".into(),
            project_id: "p".into(),
            title: "x".into(),
            due_date: NaiveDate::from_ymd_opt(2026, 1, 5),
            assignee: None,
            done: false,
            sort_order: Some(0),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap(),
        };
        assert_eq!(task.open_due_date(), NaiveDate::from_ymd_opt(2026, 1, 5));
        task.done = true;
        assert_eq!(task.open_due_date(), None);
    }
}
