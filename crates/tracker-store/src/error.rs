// crates/tracker-store/src/error.rs

use thiserror::Error;

use tracker_protocol::{ProtocolError, Table};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Rejected by the store's access policy.
    #[error("not permitted: {0}")]
    Forbidden(String),

    #[error("{table} row {id} not found")]
    NotFound { table: Table, id: String },

    #[error("insert into {0} returned no row")]
    EmptyInsert(Table),

    #[error("could not decode store response: {0}")]
    Decode(#[from] ProtocolError),

    /// A sequential batch stopped partway. The first `applied` writes are
    /// in place and are not rolled back.
    #[error("reorder stopped after {applied} of {total} writes: {source}")]
    PartialReorder {
        applied: usize,
        total: usize,
        source: Box<StoreError>,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether some writes may have landed, so the caller should reload.
    pub fn left_partial_state(&self) -> bool {
        matches!(self, StoreError::PartialReorder { applied, .. } if *applied > 0)
    }
}
