// crates/tracker-dashboard/src/network.rs

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use tracker_core::{
    Board, Direction, NewProject, NewTask, NewWorkstream, Profile, ProjectId, TaskId, UserId,
    WorkstreamId,
};
use tracker_store::{Tracker, TrackerError};

/// An item in the project tree that can be moved or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Workstream(WorkstreamId),
    Project(ProjectId),
    Task(TaskId),
}

impl Target {
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Workstream(_) => "workstream",
            Target::Project(_) => "project",
            Target::Task(_) => "task",
        }
    }
}

/// Requests from the UI thread to the store worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Reload,
    LoadProfile(UserId),
    CreateWorkstream(NewWorkstream),
    CreateProject(NewProject),
    CreateTask(NewTask),
    Delete(Target),
    ToggleDone(TaskId),
    Move {
        target: Target,
        direction: Direction,
        /// Jump to the first or last slot instead of one step.
        to_edge: bool,
    },
}

impl Command {
    /// Short verb phrase for alerts and the status line.
    pub fn label(&self) -> String {
        match self {
            Command::Reload => "reload".to_string(),
            Command::LoadProfile(_) => "load profile".to_string(),
            Command::CreateWorkstream(_) => "create workstream".to_string(),
            Command::CreateProject(_) => "create project".to_string(),
            Command::CreateTask(_) => "create task".to_string(),
            Command::Delete(target) => format!("delete {}", target.kind()),
            Command::ToggleDone(_) => "update task".to_string(),
            Command::Move { target, .. } => format!("move {}", target.kind()),
        }
    }

    fn mutates(&self) -> bool {
        !matches!(self, Command::Reload | Command::LoadProfile(_))
    }
}

/// Results sent back to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Loaded(Board),
    /// Reads failed; the UI keeps its previous board.
    LoadFailed(String),
    ProfileLoaded(Option<Profile>),
    /// A mutation went through (or was a no-op). Sent before the reload.
    Applied(Command),
    Failed { action: String, message: String },
}

/// Runs store calls one at a time on a background task.
///
/// The worker keeps its own copy of the latest board so positions for
/// appends and moves are computed against what was last read.
pub struct StoreWorker {
    tracker: Tracker,
    board: Board,
    tx: UnboundedSender<WorkerEvent>,
}

impl StoreWorker {
    pub fn new(tracker: Tracker, tx: UnboundedSender<WorkerEvent>) -> Self {
        Self {
            tracker,
            board: Board::default(),
            tx,
        }
    }

    pub async fn run(mut self, mut rx: UnboundedReceiver<Command>) {
        while let Some(command) = rx.recv().await {
            debug!(?command, "store command");
            if !self.handle(command).await {
                break;
            }
        }
        info!("store worker stopped");
    }

    /// Returns `false` once the UI side has gone away.
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Reload => self.reload().await,
            Command::LoadProfile(user) => {
                match self.tracker.load_profile(&user).await {
                    Ok(profile) => {
                        info!(user = %user, found = profile.is_some(), "profile loaded");
                        self.emit(WorkerEvent::ProfileLoaded(profile))
                    }
                    Err(e) => {
                        warn!(user = %user, error = %e, "profile lookup failed");
                        self.emit(WorkerEvent::ProfileLoaded(None))
                    }
                }
            }
            command => {
                debug_assert!(command.mutates());
                match self.execute(&command).await {
                    Ok(()) => {
                        if !self.emit(WorkerEvent::Applied(command)) {
                            return false;
                        }
                        self.reload().await
                    }
                    Err(e) => {
                        let action = command.label();
                        error!(%action, error = %e, "store write failed");
                        let reload = e.should_reload();
                        let alive = self.emit(WorkerEvent::Failed {
                            action,
                            message: e.to_string(),
                        });
                        if alive && reload {
                            self.reload().await
                        } else {
                            alive
                        }
                    }
                }
            }
        }
    }

    async fn execute(&self, command: &Command) -> Result<(), TrackerError> {
        let tracker = &self.tracker;
        let board = &self.board;
        match command {
            Command::Reload | Command::LoadProfile(_) => Ok(()),
            Command::CreateWorkstream(input) => {
                tracker.create_workstream(board, input.clone()).await.map(drop)
            }
            Command::CreateProject(input) => {
                tracker.create_project(board, input.clone()).await.map(drop)
            }
            Command::CreateTask(input) => tracker.create_task(board, input.clone()).await.map(drop),
            Command::Delete(Target::Workstream(id)) => tracker.delete_workstream(id).await,
            Command::Delete(Target::Project(id)) => tracker.delete_project(id).await,
            Command::Delete(Target::Task(id)) => tracker.delete_task(id).await,
            Command::ToggleDone(id) => tracker.toggle_done(board, id).await.map(drop),
            Command::Move {
                target,
                direction,
                to_edge,
            } => {
                let (target, direction) = (target, *direction);
                let moved = match (target, *to_edge) {
                    (Target::Workstream(id), false) => {
                        tracker.move_workstream(board, id, direction).await?
                    }
                    (Target::Workstream(id), true) => {
                        tracker.move_workstream_to_edge(board, id, direction).await?
                    }
                    (Target::Project(id), false) => tracker.move_project(board, id, direction).await?,
                    (Target::Project(id), true) => {
                        tracker.move_project_to_edge(board, id, direction).await?
                    }
                    (Target::Task(id), false) => tracker.move_task(board, id, direction).await?,
                    (Target::Task(id), true) => {
                        tracker.move_task_to_edge(board, id, direction).await?
                    }
                };
                if !moved {
                    debug!(kind = target.kind(), "move was a no-op");
                }
                Ok(())
            }
        }
    }

    /// Read failures are logged and reported; the previous board stays.
    async fn reload(&mut self) -> bool {
        match self.tracker.load_snapshot().await {
            Ok(board) => {
                self.board = board.clone();
                self.emit(WorkerEvent::Loaded(board))
            }
            Err(e) => {
                error!(error = %e, "reload failed, keeping previous board");
                self.emit(WorkerEvent::LoadFailed(e.to_string()))
            }
        }
    }

    fn emit(&self, event: WorkerEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tracker_protocol::Table;
    use tracker_store::MemoryStore;

    async fn run_commands(store: Arc<MemoryStore>, commands: Vec<Command>) -> Vec<WorkerEvent> {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let worker = StoreWorker::new(Tracker::new(store), event_tx);

        for command in commands {
            cmd_tx.send(command).unwrap();
        }
        drop(cmd_tx);
        worker.run(cmd_rx).await;

        let mut events = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn mutation_is_followed_by_reload() {
        let store = Arc::new(MemoryStore::new());
        let create = Command::CreateWorkstream(NewWorkstream::new("行政組", None).unwrap());
        let events = run_commands(store, vec![Command::Reload, create.clone()]).await;

        assert!(matches!(&events[0], WorkerEvent::Loaded(b) if b.is_empty()));
        assert_eq!(events[1], WorkerEvent::Applied(create));
        assert!(matches!(&events[2], WorkerEvent::Loaded(b) if b.workstreams().len() == 1));
    }

    #[tokio::test]
    async fn failed_write_reports_action_without_reload() {
        let store = Arc::new(MemoryStore::new());
        store.set_read_only(true).await;
        let create = Command::CreateWorkstream(NewWorkstream::new("行政組", None).unwrap());
        let events = run_commands(store, vec![create]).await;

        assert_eq!(events.len(), 1);
        match &events[0] {
            WorkerEvent::Failed { action, message } => {
                assert_eq!(action, "create workstream");
                assert!(message.contains("not permitted"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn partial_cascade_failure_reloads() {
        let store = Arc::new(MemoryStore::new());
        let rows = |value: serde_json::Value| match value {
            serde_json::Value::Object(map) => vec![map],
            _ => Vec::new(),
        };
        store
            .seed(Table::Workstreams, rows(serde_json::json!({"id": "w1", "name": "行政組"})))
            .await;
        store
            .seed(
                Table::Projects,
                rows(serde_json::json!({"id": "p1", "title": "Budget", "workstream_id": "w1"})),
            )
            .await;
        store
            .seed(
                Table::Tasks,
                rows(serde_json::json!({"id": "t1", "project_id": "p1", "title": "Close"})),
            )
            .await;
        store.set_fail_after_writes(1).await;

        let delete = Command::Delete(Target::Project("p1".into()));
        let events = run_commands(store, vec![delete]).await;

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], WorkerEvent::Failed { action, .. } if action == "delete project"));
        assert!(matches!(
            &events[1],
            WorkerEvent::Loaded(b) if b.projects().len() == 1 && b.tasks().is_empty()
        ));
    }

    #[tokio::test]
    async fn read_failure_is_reported_not_fatal() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_on_select(true).await;
        let events = run_commands(store.clone(), vec![Command::Reload, Command::Reload]).await;
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(e, WorkerEvent::LoadFailed(_))));
    }

    #[tokio::test]
    async fn missing_profile_loads_as_none() {
        let store = Arc::new(MemoryStore::new());
        store.seed(Table::Profiles, Vec::new()).await;
        let events = run_commands(store, vec![Command::LoadProfile("nobody".into())]).await;
        assert_eq!(events, vec![WorkerEvent::ProfileLoaded(None)]);
    }
}
