//! Row decoding errors.

use thiserror::Error;

use tracker_core::CoreError;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The JSON did not have the expected shape.
    #[error("malformed row: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row is not a JSON object")]
    NotAnObject,

    #[error("invalid {field} {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}
