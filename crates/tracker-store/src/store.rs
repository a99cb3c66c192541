//! Generic table store interface.
//!
//! Backends implement plain row operations. Position batches go through
//! [`TableStore::apply_sort_orders`]; a backend that can apply a batch
//! atomically overrides it, everything else inherits the sequential
//! fallback, which stops at the first failure and reports how far it got.

use async_trait::async_trait;
use tracing::{debug, warn};

use tracker_protocol::{encode_row, Filter, Row, RowSortUpdate, SelectQuery, SortOrderPatch, Table};

use crate::error::StoreError;

#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Row>, StoreError>;

    /// Insert one row and return it as stored (with `id` and `created_at`).
    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

    /// Patch every row matching `filter`; returns the number of rows changed.
    async fn update(&self, table: Table, filter: &Filter, patch: Row) -> Result<usize, StoreError>;

    /// Delete every row matching `filter`; returns the number of rows removed.
    async fn delete(&self, table: Table, filter: &Filter) -> Result<usize, StoreError>;

    /// Write a batch of positions.
    async fn apply_sort_orders(
        &self,
        table: Table,
        updates: &[RowSortUpdate],
    ) -> Result<(), StoreError> {
        apply_sequentially(self, table, updates).await
    }
}

/// Write each position in turn. Stops at the first failure; when earlier
/// writes already landed the error is [`StoreError::PartialReorder`].
/// Nothing is rolled back.
pub async fn apply_sequentially<S>(
    store: &S,
    table: Table,
    updates: &[RowSortUpdate],
) -> Result<(), StoreError>
where
    S: TableStore + ?Sized,
{
    let total = updates.len();
    for (applied, update) in updates.iter().enumerate() {
        let patch = encode_row(&SortOrderPatch {
            sort_order: update.sort_order,
        })?;

        let result = match store.update(table, &Filter::id(&update.id), patch).await {
            Ok(0) => Err(StoreError::NotFound {
                table,
                id: update.id.clone(),
            }),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            if applied == 0 {
                return Err(e);
            }
            warn!(%table, applied, total, error = %e, "position batch stopped partway");
            return Err(StoreError::PartialReorder {
                applied,
                total,
                source: Box::new(e),
            });
        }
    }
    debug!(%table, count = total, "positions written sequentially");
    Ok(())
}
