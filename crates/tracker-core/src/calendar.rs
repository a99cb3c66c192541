//! Milestone calendar: a month grid with one colored marker per open task
//! due on each day.
//!
//! Grid shape:
//! - always 7 columns,
//! - leading blanks up to the weekday of the 1st,
//! - trailing blanks to complete the last week.
//!
//! The grid is a pure function of (month cursor, week start, markers);
//! rebuild it whenever any of those change.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate, Weekday};

use crate::board::Board;
use crate::color::Rgb;
use crate::error::CoreError;
use crate::ids::TaskId;

/// Which weekday occupies the first column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    /// Number of blank cells before `date` in its week.
    fn offset(self, date: NaiveDate) -> usize {
        let weekday = date.weekday();
        let days = match self {
            WeekStart::Monday => weekday.num_days_from_monday(),
            WeekStart::Sunday => weekday.num_days_from_sunday(),
        };
        days as usize
    }

    /// Column headers in display order.
    pub fn weekdays(self) -> [Weekday; 7] {
        use Weekday::*;
        match self {
            WeekStart::Monday => [Mon, Tue, Wed, Thu, Fri, Sat, Sun],
            WeekStart::Sunday => [Sun, Mon, Tue, Wed, Thu, Fri, Sat],
        }
    }
}

/// The month currently shown. Navigation is ±1 month; the cursor is view
/// state only and is never persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthCursor {
    first: NaiveDate,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| MonthCursor { first })
            .ok_or(CoreError::InvalidMonth { year, month })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        MonthCursor {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Following month; stays put at the end of the representable range.
    pub fn next(self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| MonthCursor { first })
            .unwrap_or(self)
    }

    /// Previous month; stays put at the start of the representable range.
    pub fn prev(self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| MonthCursor { first })
            .unwrap_or(self)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.first.month();
        self.first.iter_days().take_while(move |d| d.month() == month)
    }

    pub fn days_in_month(&self) -> usize {
        self.days().count()
    }

    /// `YYYY/MM`
    pub fn title(&self) -> String {
        format!("{}/{:02}", self.year(), self.month())
    }
}

/// One dot on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub task_id: TaskId,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// At most the grid's marker cap.
    pub markers: Vec<Marker>,
    /// Markers that were due this day but did not fit under the cap.
    pub hidden: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarCell {
    Blank,
    Day(DayCell),
}

impl CalendarCell {
    pub fn is_blank(&self) -> bool {
        matches!(self, CalendarCell::Blank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    cursor: MonthCursor,
    week_start: WeekStart,
    cells: Vec<CalendarCell>,
}

impl MonthGrid {
    pub const DEFAULT_MARKER_CAP: usize = 6;
    pub const MAX_MARKER_CAP: usize = 8;

    /// Build the grid for `cursor`. `cap` is clamped to 6..=8.
    pub fn build(
        cursor: MonthCursor,
        week_start: WeekStart,
        markers: &BTreeMap<NaiveDate, Vec<Marker>>,
        cap: usize,
    ) -> Self {
        let cap = cap.clamp(Self::DEFAULT_MARKER_CAP, Self::MAX_MARKER_CAP);
        let leading = week_start.offset(cursor.first_day());

        let mut cells: Vec<CalendarCell> = Vec::with_capacity(42);
        cells.extend(std::iter::repeat(CalendarCell::Blank).take(leading));

        for date in cursor.days() {
            let due = markers.get(&date).map(Vec::as_slice).unwrap_or_default();
            let shown = due.len().min(cap);
            cells.push(CalendarCell::Day(DayCell {
                date,
                markers: due[..shown].to_vec(),
                hidden: due.len() - shown,
            }));
        }

        let trailing = (7 - cells.len() % 7) % 7;
        cells.extend(std::iter::repeat(CalendarCell::Blank).take(trailing));

        MonthGrid {
            cursor,
            week_start,
            cells,
        }
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn cells(&self) -> &[CalendarCell] {
        &self.cells
    }

    /// Rows of exactly 7 cells.
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }

    pub fn day_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blank()).count()
    }
}

/// Markers for every open, dated task, keyed by due date and colored by
/// the owning workstream. Tasks whose project is not on the board are
/// skipped. Within a day, markers keep the board's task read order.
pub fn milestone_markers(board: &Board) -> BTreeMap<NaiveDate, Vec<Marker>> {
    let mut markers: BTreeMap<NaiveDate, Vec<Marker>> = BTreeMap::new();
    for task in board.tasks() {
        let Some(due) = task.open_due_date() else {
            continue;
        };
        if board.project(&task.project_id).is_none() {
            continue;
        }
        markers.entry(due).or_default().push(Marker {
            task_id: task.id.clone(),
            color: board.task_color(task),
        });
    }
    markers
}
