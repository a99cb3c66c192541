// crates/tracker-store/tests/tracker_service.rs
//
// End-to-end scenarios for the tracker service against the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use tracker_core::{Direction, NewProject, NewTask, NewWorkstream, Role, WeeklyDigest};
use tracker_protocol::{Filter, Row, SelectQuery, Table};
use tracker_store::{MemoryStore, StoreError, TableStore, Tracker, TrackerError};

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => panic!("not an object"),
    }
}

fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_epoch(
        Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap(),
    ))
}

/// One workstream, one project, three tasks at positions 0, 1, 2.
async fn seeded() -> Arc<MemoryStore> {
    let store = store();
    store
        .seed(
            Table::Workstreams,
            vec![row(json!({"id": "w1", "name": "研發組", "sort_order": 0}))],
        )
        .await;
    store
        .seed(
            Table::Projects,
            vec![row(json!({
                "id": "p1", "title": "Grant", "status": "active",
                "workstream_id": "w1", "sort_order": 1
            }))],
        )
        .await;
    store
        .seed(
            Table::Tasks,
            (0..3).map(|i| {
                row(json!({
                    "id": format!("t{i}"), "project_id": "p1", "title": format!("step {i}"),
                    "due_date": "2026-01-06", "assignee": "Lin", "done": false, "sort_order": i
                }))
            }),
        )
        .await;
    store
}

fn task_order(board: &tracker_core::Board) -> Vec<(String, Option<i64>)> {
    board
        .tasks_in(&"p1".into())
        .iter()
        .map(|t| (t.id.to_string(), t.sort_order))
        .collect()
}

/// Forwards row operations but inherits the sequential batch fallback.
struct RowByRow(Arc<MemoryStore>);

#[async_trait]
impl TableStore for RowByRow {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        self.0.select(table, query).await
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        self.0.insert(table, row).await
    }

    async fn update(&self, table: Table, filter: &Filter, patch: Row) -> Result<usize, StoreError> {
        self.0.update(table, filter, patch).await
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<usize, StoreError> {
        self.0.delete(table, filter).await
    }
}

#[tokio::test]
async fn creates_append_after_existing_siblings() {
    let store = store();
    let tracker = Tracker::new(store.clone());

    let board = tracker.load_snapshot().await.unwrap();
    let first = tracker
        .create_workstream(&board, NewWorkstream::new("兒少組", None).unwrap())
        .await
        .unwrap();
    assert_eq!(first.sort_order, Some(0));
    assert_eq!(first.color.as_deref(), Some("#2563eb"));

    let board = tracker.load_snapshot().await.unwrap();
    let second = tracker
        .create_workstream(&board, NewWorkstream::new("行政組", None).unwrap())
        .await
        .unwrap();
    assert_eq!(second.sort_order, Some(1));

    let board = tracker.load_snapshot().await.unwrap();
    let project = tracker
        .create_project(&board, NewProject::new(Some(first.id.clone()), " Camp ").unwrap())
        .await
        .unwrap();
    assert_eq!(project.sort_order, Some(1));
    assert_eq!(project.title, "Camp");
    assert_eq!(project.status.as_deref(), Some("active"));

    let board = tracker.load_snapshot().await.unwrap();
    let task = tracker
        .create_task(
            &board,
            NewTask::new(project.id.clone(), "Book venue", "2026-03-02", "Wu").unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(task.sort_order, Some(1));
    assert!(!task.done);
    assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 3, 2));

    let board = tracker.load_snapshot().await.unwrap();
    assert_eq!(board.workstreams().len(), 2);
    assert_eq!(board.tasks_in(&project.id).len(), 1);
}

#[tokio::test]
async fn create_under_unknown_parent_is_rejected() {
    let tracker = Tracker::new(seeded().await);
    let board = tracker.load_snapshot().await.unwrap();

    let err = tracker
        .create_task(&board, NewTask::new("ghost".into(), "x", "2026-01-01", "y").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::NotFound { kind: "project", .. }));
}

#[tokio::test]
async fn moving_down_swaps_with_neighbour() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());
    let board = tracker.load_snapshot().await.unwrap();

    let moved = tracker
        .move_task(&board, &"t0".into(), Direction::Down)
        .await
        .unwrap();
    assert!(moved);

    let board = tracker.load_snapshot().await.unwrap();
    assert_eq!(
        task_order(&board),
        vec![
            ("t1".to_string(), Some(0)),
            ("t0".to_string(), Some(1)),
            ("t2".to_string(), Some(2)),
        ]
    );
}

#[tokio::test]
async fn boundary_moves_write_nothing() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());
    let board = tracker.load_snapshot().await.unwrap();
    let before = store.write_count().await;

    assert!(!tracker.move_task(&board, &"t0".into(), Direction::Up).await.unwrap());
    assert!(!tracker.move_task(&board, &"t2".into(), Direction::Down).await.unwrap());
    assert!(!tracker
        .move_workstream(&board, &"w1".into(), Direction::Up)
        .await
        .unwrap());
    assert!(!tracker
        .move_task_to_edge(&board, &"t0".into(), Direction::Up)
        .await
        .unwrap());

    assert_eq!(store.write_count().await, before);
}

#[tokio::test]
async fn move_to_edge_renumbers_siblings() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());
    let board = tracker.load_snapshot().await.unwrap();

    assert!(tracker
        .move_task_to_edge(&board, &"t2".into(), Direction::Up)
        .await
        .unwrap());

    let board = tracker.load_snapshot().await.unwrap();
    assert_eq!(
        task_order(&board),
        vec![
            ("t2".to_string(), Some(0)),
            ("t0".to_string(), Some(1)),
            ("t1".to_string(), Some(2)),
        ]
    );
}

#[tokio::test]
async fn atomic_batch_failure_leaves_positions_untouched() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());
    let board = tracker.load_snapshot().await.unwrap();

    store.set_fail_after_writes(0).await;
    let err = tracker
        .reorder_tasks(&board, &"p1".into(), 2, 0)
        .await
        .unwrap_err();
    assert!(!err.should_reload());

    store.clear_failure().await;
    let reloaded = tracker.load_snapshot().await.unwrap();
    assert_eq!(task_order(&reloaded), task_order(&board));
}

#[tokio::test]
async fn sequential_batch_reports_partial_progress() {
    let inner = seeded().await;
    let tracker = Tracker::new(Arc::new(RowByRow(inner.clone())));
    let board = tracker.load_snapshot().await.unwrap();

    inner.set_fail_after_writes(1).await;
    let err = tracker
        .move_task_to_edge(&board, &"t2".into(), Direction::Up)
        .await
        .unwrap_err();

    match &err {
        TrackerError::Store(StoreError::PartialReorder { applied, total, source }) => {
            assert_eq!((*applied, *total), (1, 3));
            assert!(matches!(**source, StoreError::Status { status: 503, .. }));
        }
        other => panic!("expected partial reorder, got {other:?}"),
    }
    assert!(err.should_reload());

    // The first write stays in place.
    inner.clear_failure().await;
    let reloaded = tracker.load_snapshot().await.unwrap();
    assert_eq!(reloaded.task(&"t2".into()).unwrap().sort_order, Some(0));
    assert_eq!(reloaded.task(&"t0".into()).unwrap().sort_order, Some(0));
}

#[tokio::test]
async fn sequential_batch_failing_first_write_is_not_partial() {
    let inner = seeded().await;
    let tracker = Tracker::new(Arc::new(RowByRow(inner.clone())));
    let board = tracker.load_snapshot().await.unwrap();

    inner.set_fail_after_writes(0).await;
    let err = tracker
        .move_task(&board, &"t0".into(), Direction::Down)
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Store(StoreError::Status { .. })));
    assert!(!err.should_reload());
}

#[tokio::test]
async fn delete_project_removes_its_tasks_first() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());

    tracker.delete_project(&"p1".into()).await.unwrap();

    let board = tracker.load_snapshot().await.unwrap();
    assert!(board.projects().is_empty());
    assert!(board.tasks().is_empty());
    assert_eq!(board.workstreams().len(), 1);
}

#[tokio::test]
async fn failed_task_cascade_keeps_project() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());

    store.set_fail_after_writes(0).await;
    let err = tracker.delete_project(&"p1".into()).await.unwrap_err();
    assert!(!err.should_reload());

    store.clear_failure().await;
    let board = tracker.load_snapshot().await.unwrap();
    assert_eq!(board.projects().len(), 1);
    assert_eq!(board.tasks().len(), 3);
}

#[tokio::test]
async fn project_delete_failing_after_tasks_asks_for_reload() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());

    // The task delete lands, the project delete does not.
    store.set_fail_after_writes(1).await;
    let err = tracker.delete_project(&"p1".into()).await.unwrap_err();
    assert!(matches!(err, TrackerError::PartialDelete { kind: "project", .. }));
    assert!(err.should_reload());

    store.clear_failure().await;
    let board = tracker.load_snapshot().await.unwrap();
    assert_eq!(board.projects().len(), 1);
    assert!(board.tasks().is_empty());
}

#[tokio::test]
async fn workstream_delete_failing_after_projects_asks_for_reload() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());

    // Tasks and project go, the workstream row stays.
    store.set_fail_after_writes(2).await;
    let err = tracker.delete_workstream(&"w1".into()).await.unwrap_err();
    assert!(matches!(err, TrackerError::PartialDelete { kind: "workstream", .. }));
    assert!(err.should_reload());

    store.clear_failure().await;
    let board = tracker.load_snapshot().await.unwrap();
    assert_eq!(board.workstreams().len(), 1);
    assert!(board.projects().is_empty());
}

#[tokio::test]
async fn delete_workstream_cascades() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());

    tracker.delete_workstream(&"w1".into()).await.unwrap();

    let board = tracker.load_snapshot().await.unwrap();
    assert!(board.is_empty());
}

#[tokio::test]
async fn toggle_done_drops_task_from_digest() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());
    let today = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();

    let board = tracker.load_snapshot().await.unwrap();
    assert_eq!(WeeklyDigest::build(today, &board).rows().len(), 3);

    assert!(tracker.toggle_done(&board, &"t1".into()).await.unwrap());

    let board = tracker.load_snapshot().await.unwrap();
    let digest = WeeklyDigest::build(today, &board);
    let ids: Vec<_> = digest.rows().iter().map(|r| r.task_id.as_str()).collect();
    assert_eq!(ids, vec!["t0", "t2"]);

    assert!(!tracker.toggle_done(&board, &"t1".into()).await.unwrap());
}

#[tokio::test]
async fn read_failure_surfaces_as_store_error() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());
    store.set_fail_on_select(true).await;

    let err = tracker.load_snapshot().await.unwrap_err();
    assert!(matches!(err, TrackerError::Store(StoreError::Status { .. })));
}

#[tokio::test]
async fn profile_lookup_by_user_id() {
    let store = store();
    store
        .seed(
            Table::Profiles,
            vec![row(json!({"id": "u1", "email": "lead@example.org", "role": "admin"}))],
        )
        .await;
    let tracker = Tracker::new(store);

    let profile = tracker.load_profile(&"u1".into()).await.unwrap().unwrap();
    assert_eq!(profile.role, Some(Role::Admin));
    assert_eq!(profile.email.as_deref(), Some("lead@example.org"));

    assert!(tracker.load_profile(&"u2".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn policy_rejection_is_forbidden() {
    let store = seeded().await;
    let tracker = Tracker::new(store.clone());
    let board = tracker.load_snapshot().await.unwrap();
    store.set_read_only(true).await;

    let err = tracker
        .create_workstream(&board, NewWorkstream::new("行政組", None).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Store(StoreError::Forbidden(_))));
}
