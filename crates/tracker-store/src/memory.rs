//! In-process table store.
//!
//! Backs demo mode and the service tests. Rows live in one `RwLock` so a
//! position batch is applied atomically: either every id exists and all
//! positions change, or nothing does.
//!
//! Failure injection for tests:
//! - `set_fail_after_writes(n)`: the next `n` writes succeed, later ones fail
//! - `set_fail_on_select(true)`: every read fails
//! - `set_read_only(true)`: every write is rejected as forbidden

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use tracker_protocol::{columns, Filter, Row, RowSortUpdate, SelectQuery, Table};

use crate::error::StoreError;
use crate::store::TableStore;

#[derive(Default)]
struct State {
    tables: HashMap<Table, Vec<Row>>,
    /// Inserts so far; spaces out `created_at` so it is strictly increasing.
    inserted: i64,
    writes: usize,
    fail_after_writes: Option<usize>,
    fail_on_select: bool,
    read_only: bool,
}

impl State {
    fn check_write(&mut self) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Forbidden(
                "write rejected by access policy".to_string(),
            ));
        }
        if let Some(limit) = self.fail_after_writes {
            if self.writes >= limit {
                return Err(StoreError::Status {
                    status: 503,
                    body: "injected write failure".to_string(),
                });
            }
        }
        self.writes += 1;
        Ok(())
    }

    fn rows_mut(&mut self, table: Table) -> &mut Vec<Row> {
        self.tables.entry(table).or_default()
    }
}

pub struct MemoryStore {
    state: RwLock<State>,
    epoch: DateTime<Utc>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::with_epoch(Utc::now())
    }

    /// Timestamps handed out start at `epoch` and advance one second per
    /// insert.
    pub fn with_epoch(epoch: DateTime<Utc>) -> Self {
        MemoryStore {
            state: RwLock::new(State::default()),
            epoch,
        }
    }

    pub async fn set_fail_after_writes(&self, writes: usize) {
        let mut state = self.state.write().await;
        state.fail_after_writes = Some(state.writes + writes);
    }

    pub async fn clear_failure(&self) {
        let mut state = self.state.write().await;
        state.fail_after_writes = None;
        state.fail_on_select = false;
    }

    pub async fn set_fail_on_select(&self, fail: bool) {
        self.state.write().await.fail_on_select = fail;
    }

    pub async fn set_read_only(&self, read_only: bool) {
        self.state.write().await.read_only = read_only;
    }

    /// Successful writes so far. A batch counts as one.
    pub async fn write_count(&self) -> usize {
        self.state.read().await.writes
    }

    /// Raw contents of a table, in insertion order.
    pub async fn rows(&self, table: Table) -> Vec<Row> {
        self.state
            .read()
            .await
            .tables
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    /// Insert rows as-is, bypassing failure injection. Missing `id` and
    /// `created_at` columns are filled in like a normal insert.
    pub async fn seed(&self, table: Table, rows: impl IntoIterator<Item = Row>) {
        let mut state = self.state.write().await;
        for row in rows {
            let row = self.stamp(&mut state, table, row);
            state.rows_mut(table).push(row);
        }
    }

    fn stamp(&self, state: &mut State, table: Table, mut row: Row) -> Row {
        row.entry(columns::ID)
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        if table != Table::Profiles {
            let created_at = self.epoch + Duration::seconds(state.inserted);
            row.entry(columns::CREATED_AT).or_insert_with(|| {
                Value::String(created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
            });
        }
        state.inserted += 1;
        row
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        let state = self.state.read().await;
        if state.fail_on_select {
            return Err(StoreError::Status {
                status: 503,
                body: "injected read failure".to_string(),
            });
        }
        let rows = state.tables.get(&table).cloned().unwrap_or_default();
        Ok(query.apply(rows))
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        let mut state = self.state.write().await;
        state.check_write()?;
        let row = self.stamp(&mut state, table, row);
        state.rows_mut(table).push(row.clone());
        debug!(%table, "memory insert");
        Ok(row)
    }

    async fn update(&self, table: Table, filter: &Filter, patch: Row) -> Result<usize, StoreError> {
        let mut state = self.state.write().await;
        state.check_write()?;
        let mut changed = 0;
        for row in state.rows_mut(table).iter_mut().filter(|r| filter.matches(r)) {
            for (key, value) in &patch {
                row.insert(key.clone(), value.clone());
            }
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<usize, StoreError> {
        let mut state = self.state.write().await;
        state.check_write()?;
        let rows = state.rows_mut(table);
        let before = rows.len();
        rows.retain(|r| !filter.matches(r));
        Ok(before - rows.len())
    }

    async fn apply_sort_orders(
        &self,
        table: Table,
        updates: &[RowSortUpdate],
    ) -> Result<(), StoreError> {
        if updates.is_empty() {
            return Ok(());
        }
        let mut state = self.state.write().await;
        state.check_write()?;

        let rows = state.rows_mut(table);
        let mut targets = Vec::with_capacity(updates.len());
        for update in updates {
            let filter = Filter::id(&update.id);
            let index = rows
                .iter()
                .position(|r| filter.matches(r))
                .ok_or_else(|| StoreError::NotFound {
                    table,
                    id: update.id.clone(),
                })?;
            targets.push((index, update.sort_order));
        }
        for (index, sort_order) in targets {
            rows[index].insert(columns::SORT_ORDER.to_string(), Value::from(sort_order));
        }
        debug!(%table, count = updates.len(), "memory batch reorder");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_increasing_created_at() {
        let store = MemoryStore::new();
        let a = store
            .insert(Table::Tasks, row(json!({"title": "a"})))
            .await
            .unwrap();
        let b = store
            .insert(Table::Tasks, row(json!({"title": "b"})))
            .await
            .unwrap();

        assert!(a["id"].as_str().is_some());
        assert_ne!(a["id"], b["id"]);
        assert!(a["created_at"].as_str().unwrap() < b["created_at"].as_str().unwrap());
    }

    #[tokio::test]
    async fn batch_with_unknown_id_changes_nothing() {
        let store = MemoryStore::new();
        store
            .seed(
                Table::Projects,
                vec![row(json!({"id": "p1", "sort_order": 0}))],
            )
            .await;

        let result = store
            .apply_sort_orders(
                Table::Projects,
                &[
                    RowSortUpdate { id: "p1".into(), sort_order: 5 },
                    RowSortUpdate { id: "ghost".into(), sort_order: 6 },
                ],
            )
            .await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(store.rows(Table::Projects).await[0]["sort_order"], json!(0));
    }

    #[tokio::test]
    async fn fail_after_writes_counts_from_now() {
        let store = MemoryStore::new();
        store.insert(Table::Tasks, Row::new()).await.unwrap();
        store.set_fail_after_writes(1).await;

        assert!(store.insert(Table::Tasks, Row::new()).await.is_ok());
        assert!(matches!(
            store.insert(Table::Tasks, Row::new()).await,
            Err(StoreError::Status { status: 503, .. })
        ));

        store.clear_failure().await;
        assert!(store.insert(Table::Tasks, Row::new()).await.is_ok());
    }

    #[tokio::test]
    async fn read_only_rejects_writes_as_forbidden() {
        let store = MemoryStore::new();
        store.set_read_only(true).await;
        let result = store.delete(Table::Tasks, &Filter::id("t1")).await;
        assert!(matches!(result, Err(StoreError::Forbidden(_))));
    }
}
