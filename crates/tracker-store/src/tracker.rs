//! The tracker service: every user-visible operation as one async call.
//!
//! Callers pass in the current [`Board`] so positions and sibling lists
//! can be computed locally; the service never patches the board. After a
//! mutation the caller reloads with [`Tracker::load_snapshot`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use tracker_core::ordering::{
    next_sort_order, plan_directional_move, plan_move_to_edge, reindex_after_move,
};
use tracker_core::{
    AppendBase, Board, CoreError, Direction, NewProject, NewTask, NewWorkstream, Profile, Project,
    ProjectId, ReorderPlan, Task, TaskId, UserId, Workstream, WorkstreamId,
};
use tracker_protocol::{
    columns, decode_models, decode_rows, encode_row, DonePatch, Filter, NewProjectRow, NewTaskRow,
    NewWorkstreamRow, ProfileRow, ProjectRow, ProtocolError, Row, RowSortUpdate, SelectQuery,
    Table, TaskRow, WorkstreamRow,
};

use crate::error::StoreError;
use crate::store::TableStore;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The id is not on the board the caller passed in.
    #[error("{kind} {id} is not on the board")]
    NotFound { kind: &'static str, id: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A cascade delete stopped after some child rows were already gone.
    #[error("{kind} {id} was only partly deleted: {source}")]
    PartialDelete {
        kind: &'static str,
        id: String,
        source: Box<TrackerError>,
    },
}

impl From<ProtocolError> for TrackerError {
    fn from(e: ProtocolError) -> Self {
        TrackerError::Store(StoreError::Decode(e))
    }
}

impl TrackerError {
    fn missing(kind: &'static str, id: impl AsRef<str>) -> Self {
        TrackerError::NotFound {
            kind,
            id: id.as_ref().to_string(),
        }
    }

    /// Whether the store may have changed before the error, so the caller
    /// should reload rather than trust its board.
    pub fn should_reload(&self) -> bool {
        match self {
            TrackerError::Store(e) => e.left_partial_state(),
            TrackerError::PartialDelete { .. } => true,
            TrackerError::Validation(_) | TrackerError::NotFound { .. } => false,
        }
    }

    /// Wrap `source` when earlier steps of a cascade already removed rows.
    fn after_cascade(
        kind: &'static str,
        id: impl AsRef<str>,
        removed_children: bool,
        source: TrackerError,
    ) -> Self {
        if removed_children || source.should_reload() {
            TrackerError::PartialDelete {
                kind,
                id: id.as_ref().to_string(),
                source: Box::new(source),
            }
        } else {
            source
        }
    }
}

#[derive(Clone)]
pub struct Tracker {
    store: Arc<dyn TableStore>,
}

impl Tracker {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Tracker { store }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Load all three collections, each in read order.
    pub async fn load_snapshot(&self) -> Result<Board, TrackerError> {
        let ws_query = SelectQuery::read_order(Table::Workstreams);
        let project_query = SelectQuery::read_order(Table::Projects);
        let task_query = SelectQuery::read_order(Table::Tasks);

        let (ws_rows, project_rows, task_rows) = tokio::try_join!(
            self.store.select(Table::Workstreams, &ws_query),
            self.store.select(Table::Projects, &project_query),
            self.store.select(Table::Tasks, &task_query),
        )?;

        let workstreams = decode_models::<WorkstreamRow, Workstream>(ws_rows)?;
        let projects = decode_models::<ProjectRow, Project>(project_rows)?;
        let tasks = decode_models::<TaskRow, Task>(task_rows)?;

        info!(
            workstreams = workstreams.len(),
            projects = projects.len(),
            tasks = tasks.len(),
            "snapshot loaded"
        );
        Ok(Board::new(workstreams, projects, tasks))
    }

    /// The profile row for `user`, if one exists.
    pub async fn load_profile(&self, user: &UserId) -> Result<Option<Profile>, TrackerError> {
        let query = SelectQuery::new().filter(Filter::id(user.as_str())).limit(1);
        let rows = self.store.select(Table::Profiles, &query).await?;
        let profile = decode_rows::<ProfileRow>(rows)?
            .into_iter()
            .next()
            .map(Profile::from);
        Ok(profile)
    }

    // ------------------------------------------------------------------
    // Creates
    // ------------------------------------------------------------------

    /// Append a workstream after every existing one.
    pub async fn create_workstream(
        &self,
        board: &Board,
        input: NewWorkstream,
    ) -> Result<Workstream, TrackerError> {
        let sort_order = next_sort_order(
            board.workstreams().iter().map(|w| w.sort_order),
            AppendBase::FromZero,
        );
        let row = encode_row(&NewWorkstreamRow::new(&input, sort_order))?;
        let stored = self.insert_one::<WorkstreamRow, Workstream>(Table::Workstreams, row).await?;
        info!(id = %stored.id, name = %stored.name, sort_order, "workstream created");
        Ok(stored)
    }

    /// Append a project at the end of its workstream.
    pub async fn create_project(
        &self,
        board: &Board,
        input: NewProject,
    ) -> Result<Project, TrackerError> {
        if board.workstream(&input.workstream_id).is_none() {
            return Err(TrackerError::missing("workstream", &input.workstream_id));
        }
        let sort_order = next_sort_order(
            board
                .projects_in(&input.workstream_id)
                .iter()
                .map(|p| p.sort_order),
            AppendBase::AfterZero,
        );
        let row = encode_row(&NewProjectRow::new(&input, sort_order))?;
        let stored = self.insert_one::<ProjectRow, Project>(Table::Projects, row).await?;
        info!(id = %stored.id, workstream = %stored.workstream_id, sort_order, "project created");
        Ok(stored)
    }

    /// Append a task at the end of its project.
    pub async fn create_task(&self, board: &Board, input: NewTask) -> Result<Task, TrackerError> {
        if board.project(&input.project_id).is_none() {
            return Err(TrackerError::missing("project", &input.project_id));
        }
        let sort_order = next_sort_order(
            board.tasks_in(&input.project_id).iter().map(|t| t.sort_order),
            AppendBase::AfterZero,
        );
        let row = encode_row(&NewTaskRow::new(&input, sort_order))?;
        let stored = self.insert_one::<TaskRow, Task>(Table::Tasks, row).await?;
        info!(id = %stored.id, project = %stored.project_id, sort_order, "task created");
        Ok(stored)
    }

    async fn insert_one<R, M>(&self, table: Table, row: Row) -> Result<M, TrackerError>
    where
        R: serde::de::DeserializeOwned,
        M: TryFrom<R, Error = ProtocolError>,
    {
        let stored = self.store.insert(table, row).await?;
        let model = decode_models::<R, M>(vec![stored])?
            .into_iter()
            .next()
            .ok_or(StoreError::EmptyInsert(table))?;
        Ok(model)
    }

    // ------------------------------------------------------------------
    // Deletes
    // ------------------------------------------------------------------

    pub async fn delete_task(&self, id: &TaskId) -> Result<(), TrackerError> {
        let removed = self.store.delete(Table::Tasks, &Filter::id(id.as_str())).await?;
        info!(%id, removed, "task deleted");
        Ok(())
    }

    /// Delete a project's tasks, then the project. If the task delete
    /// fails the project is left alone. If the project delete fails after
    /// tasks were removed the error is [`TrackerError::PartialDelete`].
    pub async fn delete_project(&self, id: &ProjectId) -> Result<(), TrackerError> {
        let tasks = self
            .store
            .delete(Table::Tasks, &Filter::eq(columns::PROJECT_ID, id.as_str()))
            .await?;
        if let Err(e) = self.store.delete(Table::Projects, &Filter::id(id.as_str())).await {
            warn!(%id, tasks, error = %e, "project delete failed after its tasks");
            return Err(TrackerError::after_cascade("project", id, tasks > 0, e.into()));
        }
        info!(%id, tasks, "project deleted");
        Ok(())
    }

    /// Delete every project of a workstream (with their tasks), then the
    /// workstream itself. Stops at the first failure; once anything was
    /// removed the error is [`TrackerError::PartialDelete`].
    pub async fn delete_workstream(&self, id: &WorkstreamId) -> Result<(), TrackerError> {
        let query = SelectQuery::new().filter(Filter::eq(columns::WORKSTREAM_ID, id.as_str()));
        let rows = self.store.select(Table::Projects, &query).await?;
        let projects = decode_models::<ProjectRow, Project>(rows)?;

        for (deleted, project) in projects.iter().enumerate() {
            if let Err(e) = self.delete_project(&project.id).await {
                warn!(%id, deleted, error = %e, "workstream cascade stopped");
                return Err(TrackerError::after_cascade("workstream", id, deleted > 0, e));
            }
        }
        if let Err(e) = self.store.delete(Table::Workstreams, &Filter::id(id.as_str())).await {
            warn!(%id, error = %e, "workstream delete failed after its projects");
            let removed = !projects.is_empty();
            return Err(TrackerError::after_cascade("workstream", id, removed, e.into()));
        }
        info!(%id, projects = projects.len(), "workstream deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------

    /// Flip a task's completion flag. Returns the new value.
    pub async fn toggle_done(&self, board: &Board, id: &TaskId) -> Result<bool, TrackerError> {
        let task = board.task(id).ok_or_else(|| TrackerError::missing("task", id))?;
        let done = !task.done;
        let patch = encode_row(&DonePatch { done })?;
        let changed = self
            .store
            .update(Table::Tasks, &Filter::id(id.as_str()), patch)
            .await?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                table: Table::Tasks,
                id: id.to_string(),
            }
            .into());
        }
        info!(%id, done, "task toggled");
        Ok(done)
    }

    // ------------------------------------------------------------------
    // Reordering
    // ------------------------------------------------------------------
    //
    // Every move returns `Ok(false)` when it is a no-op (boundary or
    // unknown sibling) and nothing was written.

    pub async fn move_workstream(
        &self,
        board: &Board,
        id: &WorkstreamId,
        direction: Direction,
    ) -> Result<bool, TrackerError> {
        let plan = plan_directional_move(board.workstreams(), id, direction);
        self.apply_plan(Table::Workstreams, plan).await
    }

    pub async fn move_project(
        &self,
        board: &Board,
        id: &ProjectId,
        direction: Direction,
    ) -> Result<bool, TrackerError> {
        let project = board.project(id).ok_or_else(|| TrackerError::missing("project", id))?;
        let siblings = board.projects_in(&project.workstream_id);
        let plan = plan_directional_move(&siblings, id, direction);
        self.apply_plan(Table::Projects, plan).await
    }

    pub async fn move_task(
        &self,
        board: &Board,
        id: &TaskId,
        direction: Direction,
    ) -> Result<bool, TrackerError> {
        let task = board.task(id).ok_or_else(|| TrackerError::missing("task", id))?;
        let siblings = board.tasks_in(&task.project_id);
        let plan = plan_directional_move(&siblings, id, direction);
        self.apply_plan(Table::Tasks, plan).await
    }

    /// `Up` moves to the first slot, `Down` to the last.
    pub async fn move_workstream_to_edge(
        &self,
        board: &Board,
        id: &WorkstreamId,
        direction: Direction,
    ) -> Result<bool, TrackerError> {
        let plan = plan_move_to_edge(board.workstreams(), id, direction);
        self.apply_plan(Table::Workstreams, plan).await
    }

    pub async fn move_project_to_edge(
        &self,
        board: &Board,
        id: &ProjectId,
        direction: Direction,
    ) -> Result<bool, TrackerError> {
        let project = board.project(id).ok_or_else(|| TrackerError::missing("project", id))?;
        let siblings = board.projects_in(&project.workstream_id);
        let plan = plan_move_to_edge(&siblings, id, direction);
        self.apply_plan(Table::Projects, plan).await
    }

    pub async fn move_task_to_edge(
        &self,
        board: &Board,
        id: &TaskId,
        direction: Direction,
    ) -> Result<bool, TrackerError> {
        let task = board.task(id).ok_or_else(|| TrackerError::missing("task", id))?;
        let siblings = board.tasks_in(&task.project_id);
        let plan = plan_move_to_edge(&siblings, id, direction);
        self.apply_plan(Table::Tasks, plan).await
    }

    /// Move the project at `from` to `to` within its workstream and
    /// renumber the list.
    pub async fn reorder_projects(
        &self,
        board: &Board,
        workstream: &WorkstreamId,
        from: usize,
        to: usize,
    ) -> Result<bool, TrackerError> {
        let siblings = board.projects_in(workstream);
        let plan = reindex_after_move(&siblings, from, to);
        self.apply_plan(Table::Projects, Some(plan)).await
    }

    pub async fn reorder_tasks(
        &self,
        board: &Board,
        project: &ProjectId,
        from: usize,
        to: usize,
    ) -> Result<bool, TrackerError> {
        let siblings = board.tasks_in(project);
        let plan = reindex_after_move(&siblings, from, to);
        self.apply_plan(Table::Tasks, Some(plan)).await
    }

    async fn apply_plan<I: AsRef<str>>(
        &self,
        table: Table,
        plan: Option<ReorderPlan<I>>,
    ) -> Result<bool, TrackerError> {
        let Some(plan) = plan.filter(|p| !p.is_empty()) else {
            return Ok(false);
        };
        let updates = RowSortUpdate::from_plan(&plan);
        if let Err(e) = self.store.apply_sort_orders(table, &updates).await {
            warn!(%table, count = updates.len(), error = %e, "reorder failed");
            return Err(e.into());
        }
        info!(%table, count = updates.len(), "reordered");
        Ok(true)
    }
}
