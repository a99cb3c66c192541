//! tracker-store
//!
//! Everything that talks to the remote table store.
//!
//! - [`store`]   : the `TableStore` trait and the sequential batch fallback
//! - [`rest`]    : PostgREST-dialect HTTP backend
//! - [`memory`]  : in-process backend for demo mode and tests
//! - [`config`]  : connection settings, from file or environment
//! - [`tracker`] : the tracker service (load, create, delete, reorder)

pub mod config;
pub mod error;
pub mod memory;
pub mod rest;
pub mod store;
pub mod tracker;

pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use store::{apply_sequentially, TableStore};
pub use tracker::{Tracker, TrackerError};
