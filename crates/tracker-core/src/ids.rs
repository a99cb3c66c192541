//! Opaque identifiers for stored entities.
//!
//! The store hands out string ids (UUIDs in practice). Each entity kind
//! gets its own newtype so a `ProjectId` can never be passed where a
//! `TaskId` is expected.

use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                $name(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a top-level workstream.
    WorkstreamId
);

string_id!(
    /// Identifier of a project (owned by a workstream).
    ProjectId
);

string_id!(
    /// Identifier of a task (owned by a project).
    TaskId
);

string_id!(
    /// Identifier of a signed-in user, as issued by the identity provider.
    UserId
);
