//! tracker-protocol
//!
//! Wire-level shapes for the remote table store.
//!
//! This crate turns tracker entities (`tracker_core::Workstream`,
//! `Project`, `Task`, `Profile`) into JSON rows and back again, and
//! encodes table queries in the PostgREST dialect.
//!
//! - [`wire_types`] : table names, column names, endpoint paths
//! - [`rows`]       : serde row structs and row <-> model conversion
//! - [`query`]      : filters, ordering and select query encoding

pub mod wire_types;
pub mod rows;
pub mod query;
pub mod error;

pub use wire_types::{columns, Table};
pub use rows::{
    decode_models,
    decode_rows,
    encode_row,
    format_date,
    DonePatch,
    NewProjectRow,
    NewTaskRow,
    NewWorkstreamRow,
    ProfileRow,
    ProjectRow,
    ReorderRequest,
    Row,
    RowSortUpdate,
    SortOrderPatch,
    TaskRow,
    WorkstreamRow,
};
pub use query::{Filter, OrderBy, SelectQuery, SortDirection};
pub use error::ProtocolError;
