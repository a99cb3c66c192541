//! Table and column names shared by every store backend.
//!
//! Column names are the wire contract with the hosted store; renaming one
//! here is a schema change.

use std::fmt;

/// Base path for table endpoints.
pub const REST_PREFIX: &str = "/rest/v1";

/// Base path for stored procedures.
pub const RPC_PREFIX: &str = "/rest/v1/rpc";

/// Tables the tracker reads and writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Workstreams,
    Projects,
    Tasks,
    Profiles,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Workstreams,
        Table::Projects,
        Table::Tasks,
        Table::Profiles,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Workstreams => "workstreams",
            Table::Projects => "projects",
            Table::Tasks => "tasks",
            Table::Profiles => "profiles",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Table::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Workstream rows are not guaranteed a `created_at` column, so reads
    /// of that table order by position only.
    pub fn has_created_at(self) -> bool {
        !matches!(self, Table::Workstreams | Table::Profiles)
    }

    /// `/rest/v1/{table}`
    pub fn path(self) -> String {
        format!("{}/{}", REST_PREFIX, self.as_str())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `/rest/v1/rpc/{function}`
pub fn rpc_path(function: &str) -> String {
    format!("{}/{}", RPC_PREFIX, function)
}

pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const TITLE: &str = "title";
    pub const COLOR: &str = "color";
    pub const STATUS: &str = "status";
    pub const WORKSTREAM_ID: &str = "workstream_id";
    pub const PROJECT_ID: &str = "project_id";
    pub const DUE_DATE: &str = "due_date";
    pub const ASSIGNEE: &str = "assignee";
    pub const DONE: &str = "done";
    pub const SORT_ORDER: &str = "sort_order";
    pub const CREATED_AT: &str = "created_at";
    pub const EMAIL: &str = "email";
    pub const ROLE: &str = "role";
}
