//! Contact group entity

use serde::{Deserialize, Serialize};

/// Snapshot of a group in the contact list tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactGroup {
    pub name: String,
    /// Stored on the server. Virtual groups such as the awaiting
    /// authorization group are not.
    pub persistent: bool,
    pub resolved: bool,
    pub can_contain_subgroups: bool,
}

impl ContactGroup {
    /// A resolved, server-stored group
    #[must_use]
    pub fn server_stored(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persistent: true,
            resolved: true,
            can_contain_subgroups: false,
        }
    }

    /// The root of the contact list tree
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            can_contain_subgroups: true,
            ..Self::server_stored(name)
        }
    }

    /// A local-only group
    #[must_use]
    pub fn virtual_group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persistent: false,
            resolved: true,
            can_contain_subgroups: false,
        }
    }

    /// A server-stored group we only know by name so far
    #[must_use]
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            resolved: false,
            ..Self::server_stored(name)
        }
    }
}
