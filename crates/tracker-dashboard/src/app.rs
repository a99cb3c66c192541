// crates/tracker-dashboard/src/app.rs

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate};
use indexmap::IndexMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use tracker_core::calendar::milestone_markers;
use tracker_core::{
    Board, Direction, MonthCursor, MonthGrid, NewProject, NewTask, NewWorkstream, Profile,
    ProjectId, Rgb, Role, TaskId, WeekStart, WeeklyDigest, WorkstreamId,
};

use crate::config::{DashboardConfig, Theme};
use crate::network::{Command, Target, WorkerEvent};

pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Panel {
    Projects,
    Calendar,
    Digest,
}

/// One line of the flattened project tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeRow {
    Workstream(WorkstreamId),
    Project(ProjectId),
    Task(TaskId),
}

impl TreeRow {
    fn target(&self) -> Target {
        match self {
            TreeRow::Workstream(id) => Target::Workstream(id.clone()),
            TreeRow::Project(id) => Target::Project(id.clone()),
            TreeRow::Task(id) => Target::Task(id.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub due_date: String,
    pub assignee: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkstreamDraft {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Workstream,
    Project(WorkstreamId),
    Task(ProjectId),
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Workstream => "New workstream",
            FormKind::Project(_) => "New project",
            FormKind::Task(_) => "New task",
        }
    }

    pub fn field_labels(&self) -> &'static [&'static str] {
        match self {
            FormKind::Workstream => &["Name", "Color (#rrggbb, optional)"],
            FormKind::Project(_) => &["Title"],
            FormKind::Task(_) => &["Title", "Due date (YYYY-MM-DD)", "Assignee"],
        }
    }
}

/// The inline form currently open. Field values live in the drafts so
/// closing a form keeps what was typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub kind: FormKind,
    pub field: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub target: Target,
    pub prompt: String,
}

/// Blocking message; dismissed with Enter or Esc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

pub struct App {
    // UI state
    pub input_mode: InputMode,
    pub current_panel: Panel,
    pub should_quit: bool,
    pub show_help: bool,
    pub theme: Theme,

    // Session
    pub profile: Option<Profile>,
    pub session_email: Option<String>,

    // Data
    pub board: Board,
    pub loaded: bool,
    pub last_sync: Option<DateTime<Local>>,
    pub legend: IndexMap<WorkstreamId, (String, Rgb)>,

    // Project tree
    pub rows: Vec<TreeRow>,
    pub selected: usize,

    // Forms and dialogs
    pub task_drafts: HashMap<ProjectId, TaskDraft>,
    pub project_drafts: HashMap<WorkstreamId, String>,
    pub workstream_draft: WorkstreamDraft,
    pub form: Option<Form>,
    pub pending_delete: Option<PendingDelete>,
    pub alert: Option<Alert>,
    pub status_message: Option<String>,
    /// Set while `status_message` reports a failed reload.
    load_failed: bool,

    // Calendar and digest
    pub today: NaiveDate,
    pub month_cursor: MonthCursor,
    pub week_start: WeekStart,
    pub max_markers: usize,
    pub grid: MonthGrid,
    pub digest: WeeklyDigest,

    pub store_tx: Option<UnboundedSender<Command>>,
}

impl App {
    pub fn new(config: &DashboardConfig, today: NaiveDate) -> Self {
        let board = Board::default();
        let month_cursor = MonthCursor::containing(today);
        let week_start = WeekStart::from(config.calendar.week_start);
        let max_markers = config.calendar.max_markers;

        Self {
            input_mode: InputMode::Normal,
            current_panel: Panel::Projects,
            should_quit: false,
            show_help: false,
            theme: config.theme,
            profile: None,
            session_email: config.session.email.clone(),
            grid: MonthGrid::build(month_cursor, week_start, &Default::default(), max_markers),
            digest: WeeklyDigest::build(today, &board),
            board,
            loaded: false,
            last_sync: None,
            legend: IndexMap::new(),
            rows: Vec::new(),
            selected: 0,
            task_drafts: HashMap::new(),
            project_drafts: HashMap::new(),
            workstream_draft: WorkstreamDraft::default(),
            form: None,
            pending_delete: None,
            alert: None,
            status_message: None,
            load_failed: false,
            today,
            month_cursor,
            week_start,
            max_markers,
            store_tx: None,
        }
    }

    pub fn set_store_sender(&mut self, tx: UnboundedSender<Command>) {
        self.store_tx = Some(tx);
    }

    fn send(&mut self, command: Command) {
        debug!(?command, "dispatch");
        let sent = match &self.store_tx {
            Some(tx) => tx.send(command).is_ok(),
            None => false,
        };
        if !sent {
            warn!("store worker is not running");
            self.status_message = Some("Store worker is not running".to_string());
        }
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().and_then(|p| p.role)
    }

    /// Reviewers (and unknown roles) get a read-only presentation. Writes
    /// are still sent; the store decides.
    pub fn shows_admin_controls(&self) -> bool {
        self.profile
            .as_ref()
            .is_some_and(Profile::shows_admin_controls)
    }

    pub fn display_email(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.email.as_deref())
            .or(self.session_email.as_deref())
            .unwrap_or("—")
    }

    pub fn display_role(&self) -> &str {
        self.role().map(Role::as_str).unwrap_or("—")
    }

    // ------------------------------------------------------------------
    // Panels and selection
    // ------------------------------------------------------------------

    pub fn next_panel(&mut self) {
        self.current_panel = match self.current_panel {
            Panel::Projects => Panel::Calendar,
            Panel::Calendar => Panel::Digest,
            Panel::Digest => Panel::Projects,
        };
    }

    pub fn prev_panel(&mut self) {
        self.current_panel = match self.current_panel {
            Panel::Projects => Panel::Digest,
            Panel::Calendar => Panel::Projects,
            Panel::Digest => Panel::Calendar,
        };
    }

    pub fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn selected_row(&self) -> Option<&TreeRow> {
        self.rows.get(self.selected)
    }

    /// The project the selection is in (the project itself or a task's
    /// parent).
    pub fn selected_project(&self) -> Option<ProjectId> {
        match self.selected_row()? {
            TreeRow::Workstream(_) => None,
            TreeRow::Project(id) => Some(id.clone()),
            TreeRow::Task(id) => self.board.task(id).map(|t| t.project_id.clone()),
        }
    }

    /// The workstream the selection is in, at any depth.
    pub fn selected_workstream(&self) -> Option<WorkstreamId> {
        match self.selected_row()? {
            TreeRow::Workstream(id) => Some(id.clone()),
            TreeRow::Project(_) | TreeRow::Task(_) => {
                let project = self.selected_project()?;
                self.board.project(&project).map(|p| p.workstream_id.clone())
            }
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ------------------------------------------------------------------
    // Calendar
    // ------------------------------------------------------------------

    pub fn next_month(&mut self) {
        self.month_cursor = self.month_cursor.next();
        self.refresh_views();
    }

    pub fn prev_month(&mut self) {
        self.month_cursor = self.month_cursor.prev();
        self.refresh_views();
    }

    pub fn this_month(&mut self) {
        self.month_cursor = MonthCursor::containing(self.today);
        self.refresh_views();
    }

    /// Advance the clock; the digest window moves at midnight.
    pub fn tick(&mut self, today: NaiveDate) {
        if today != self.today {
            self.today = today;
            self.refresh_views();
        }
    }

    fn refresh_views(&mut self) {
        let markers = milestone_markers(&self.board);
        self.grid = MonthGrid::build(self.month_cursor, self.week_start, &markers, self.max_markers);
        self.digest = WeeklyDigest::build(self.today, &self.board);
    }

    // ------------------------------------------------------------------
    // Store commands
    // ------------------------------------------------------------------

    pub fn request_reload(&mut self) {
        self.send(Command::Reload);
    }

    pub fn toggle_selected_done(&mut self) {
        if let Some(TreeRow::Task(id)) = self.selected_row() {
            let id = id.clone();
            self.send(Command::ToggleDone(id));
        }
    }

    pub fn move_selected(&mut self, direction: Direction, to_edge: bool) {
        if let Some(row) = self.selected_row() {
            let target = row.target();
            self.send(Command::Move {
                target,
                direction,
                to_edge,
            });
        }
    }

    pub fn request_delete(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let prompt = match row {
            TreeRow::Workstream(id) => {
                let name = self.board.workstream(id).map(|w| w.name.as_str()).unwrap_or("?");
                format!("Delete workstream \"{name}\" with all its projects and tasks?")
            }
            TreeRow::Project(id) => {
                let title = self.board.project(id).map(|p| p.title.as_str()).unwrap_or("?");
                format!("Delete project \"{title}\" and all its tasks?")
            }
            TreeRow::Task(id) => {
                let title = self.board.task(id).map(|t| t.title.as_str()).unwrap_or("?");
                format!("Delete task \"{title}\"?")
            }
        };
        self.pending_delete = Some(PendingDelete {
            target: row.target(),
            prompt,
        });
    }

    pub fn confirm_delete(&mut self) {
        if let Some(pending) = self.pending_delete.take() {
            self.send(Command::Delete(pending.target));
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    fn show_alert(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.alert = Some(Alert {
            title: title.into(),
            message: message.into(),
        });
    }

    // ------------------------------------------------------------------
    // Forms
    // ------------------------------------------------------------------

    pub fn start_workstream_form(&mut self) {
        self.open_form(FormKind::Workstream);
    }

    pub fn start_project_form(&mut self) {
        match self.selected_workstream() {
            Some(ws) => self.open_form(FormKind::Project(ws)),
            None => self.show_alert("Cannot add project", "Select a workstream first."),
        }
    }

    pub fn start_task_form(&mut self) {
        match self.selected_project() {
            Some(project) => self.open_form(FormKind::Task(project)),
            None => self.show_alert("Cannot add task", "Select a project first."),
        }
    }

    fn open_form(&mut self, kind: FormKind) {
        self.form = Some(Form { kind, field: 0 });
        self.input_mode = InputMode::Editing;
    }

    pub fn next_field(&mut self) {
        if let Some(form) = &mut self.form {
            form.field = (form.field + 1) % form.kind.field_labels().len();
        }
    }

    pub fn prev_field(&mut self) {
        if let Some(form) = &mut self.form {
            let count = form.kind.field_labels().len();
            form.field = (form.field + count - 1) % count;
        }
    }

    /// Current values of the open form's fields, in label order.
    pub fn form_values(&self) -> Vec<&str> {
        let Some(form) = &self.form else {
            return Vec::new();
        };
        match &form.kind {
            FormKind::Workstream => vec![
                self.workstream_draft.name.as_str(),
                self.workstream_draft.color.as_str(),
            ],
            FormKind::Project(ws) => {
                vec![self.project_drafts.get(ws).map(String::as_str).unwrap_or("")]
            }
            FormKind::Task(project) => match self.task_drafts.get(project) {
                Some(d) => vec![d.title.as_str(), d.due_date.as_str(), d.assignee.as_str()],
                None => vec!["", "", ""],
            },
        }
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        let form = self.form.as_ref()?;
        let field = form.field;
        let value = match &form.kind {
            FormKind::Workstream => match field {
                0 => &mut self.workstream_draft.name,
                _ => &mut self.workstream_draft.color,
            },
            FormKind::Project(ws) => self.project_drafts.entry(ws.clone()).or_default(),
            FormKind::Task(project) => {
                let draft = self.task_drafts.entry(project.clone()).or_default();
                match field {
                    0 => &mut draft.title,
                    1 => &mut draft.due_date,
                    _ => &mut draft.assignee,
                }
            }
        };
        Some(value)
    }

    pub fn enter_char(&mut self, c: char) {
        if let Some(value) = self.field_mut() {
            value.push(c);
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(value) = self.field_mut() {
            value.pop();
        }
    }

    /// Close the form and keep its draft.
    pub fn cancel_input(&mut self) {
        self.form = None;
        self.input_mode = InputMode::Normal;
    }

    /// Validate the open form and send it. Invalid input raises an alert
    /// and leaves the form open; the draft is only cleared once the store
    /// accepts the row.
    pub fn submit_input(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };

        let command = match &form.kind {
            FormKind::Workstream => {
                let draft = &self.workstream_draft;
                NewWorkstream::new(&draft.name, Some(draft.color.as_str()))
                    .map(Command::CreateWorkstream)
            }
            FormKind::Project(ws) => {
                let title = self.project_drafts.get(ws).map(String::as_str).unwrap_or("");
                NewProject::new(Some(ws.clone()), title).map(Command::CreateProject)
            }
            FormKind::Task(project) => {
                let draft = self.task_drafts.get(project).cloned().unwrap_or_default();
                NewTask::new(project.clone(), &draft.title, &draft.due_date, &draft.assignee)
                    .map(Command::CreateTask)
            }
        };

        match command {
            Ok(command) => {
                self.cancel_input();
                self.send(command);
            }
            Err(e) => self.show_alert(form.kind.title(), e.to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Worker events
    // ------------------------------------------------------------------

    pub fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Loaded(board) => self.apply_board(board),
            WorkerEvent::LoadFailed(message) => {
                self.status_message = Some(format!("Reload failed: {message}"));
                self.load_failed = true;
            }
            WorkerEvent::ProfileLoaded(profile) => {
                self.profile = profile;
            }
            WorkerEvent::Applied(command) => {
                match &command {
                    Command::CreateTask(t) => {
                        self.task_drafts.remove(&t.project_id);
                    }
                    Command::CreateProject(p) => {
                        self.project_drafts.remove(&p.workstream_id);
                    }
                    Command::CreateWorkstream(_) => {
                        self.workstream_draft = WorkstreamDraft::default();
                    }
                    _ => {}
                }
                self.status_message = Some(format!("Done: {}", command.label()));
                self.load_failed = false;
            }
            WorkerEvent::Failed { action, message } => {
                self.show_alert(format!("Failed to {action}"), message);
            }
        }
    }

    /// Swap in a freshly loaded board, keeping the selection on the same
    /// item when it still exists.
    fn apply_board(&mut self, board: Board) {
        let previous = self.selected_row().cloned();

        self.board = board;
        self.loaded = true;
        self.last_sync = Some(Local::now());
        self.rebuild_rows();
        self.legend = self
            .board
            .workstreams()
            .iter()
            .map(|w| (w.id.clone(), (w.name.clone(), w.display_color())))
            .collect();
        self.refresh_views();
        if self.load_failed {
            self.status_message = None;
            self.load_failed = false;
        }

        self.selected = previous
            .and_then(|row| self.rows.iter().position(|r| *r == row))
            .unwrap_or(self.selected)
            .min(self.rows.len().saturating_sub(1));
    }

    fn rebuild_rows(&mut self) {
        let tasks_by_project = self.board.group_tasks_by_project();
        let mut rows = Vec::new();
        for ws in self.board.workstreams() {
            rows.push(TreeRow::Workstream(ws.id.clone()));
            for project in self.board.projects_in(&ws.id) {
                rows.push(TreeRow::Project(project.id.clone()));
                if let Some(tasks) = tasks_by_project.get(&project.id) {
                    rows.extend(tasks.iter().map(|t| TreeRow::Task(t.id.clone())));
                }
            }
        }
        self.rows = rows;
    }
}
