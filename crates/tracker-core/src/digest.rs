//! "This week" digest: open tasks due in the current Monday-based week,
//! plus everything overdue.

use chrono::{Datelike, Duration, NaiveDate};

use crate::board::Board;
use crate::color::Rgb;
use crate::ids::TaskId;

/// Half-open window `[start, end)`: Monday through the following Monday.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// The week containing `today`. The start is found by stepping back
    /// `(weekday_number + 6) % 7` days, with Sunday numbered 0.
    pub fn containing(today: NaiveDate) -> Self {
        let weekday_number = i64::from(today.weekday().num_days_from_sunday());
        let start = today - Duration::days((weekday_number + 6) % 7);
        WeekWindow {
            start,
            end: start + Duration::days(7),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn is_overdue(&self, date: NaiveDate) -> bool {
        date < self.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRow {
    pub task_id: TaskId,
    pub title: String,
    pub project_title: String,
    pub assignee: Option<String>,
    pub due_date: NaiveDate,
    pub overdue: bool,
    /// `YYYY-MM-DD (Ddd)`
    pub label: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyDigest {
    window: WeekWindow,
    rows: Vec<DigestRow>,
}

impl WeeklyDigest {
    /// Open, dated tasks due inside this week's window or before it.
    /// Tasks whose project is not on the board are skipped, as on the
    /// calendar. Rows are sorted by due date; equal dates keep board order.
    pub fn build(today: NaiveDate, board: &Board) -> Self {
        let window = WeekWindow::containing(today);

        let mut rows: Vec<DigestRow> = board
            .tasks()
            .iter()
            .filter_map(|task| {
                let due = task.open_due_date()?;
                if !(window.contains(due) || window.is_overdue(due)) {
                    return None;
                }
                let project = board.project(&task.project_id)?;
                Some(DigestRow {
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                    project_title: project.title.clone(),
                    assignee: task.assignee.clone(),
                    due_date: due,
                    overdue: window.is_overdue(due),
                    label: due_label(due),
                    color: board.task_color(task),
                })
            })
            .collect();

        rows.sort_by_key(|row| row.due_date);

        WeeklyDigest { window, rows }
    }

    pub fn window(&self) -> WeekWindow {
        self.window
    }

    pub fn rows(&self) -> &[DigestRow] {
        &self.rows
    }

    pub fn overdue_count(&self) -> usize {
        self.rows.iter().filter(|r| r.overdue).count()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `2026-01-05 (Mon)`
pub fn due_label(date: NaiveDate) -> String {
    format!("{} ({})", date.format("%Y-%m-%d"), date.format("%a"))
}
