//! Shared protocol types for Keeper tools, stores, and configuration.

mod tool;

pub use tool::ToolError;

use serde::{Deserialize, Serialize};
use std::fmt;

/// URI scheme used for resources exposed by the server.
pub const RESOURCE_SCHEME: &str = "keeper";

/// The two record collections managed by Keeper.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Experience memories (append-only).
    Memory,
    /// Rule entries with a category index.
    Rules,
}

impl StoreKind {
    /// Stable lowercase label used in file names, logs, and export documents.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::Rules => "rules",
        }
    }

    /// Singular noun used in user-facing messages.
    pub fn record_noun(self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::Rules => "rule",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy used to mint category-scoped rule ids.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Persisted per-prefix counter that never goes backwards.
    #[default]
    Monotonic,
    /// Legacy numbering: live records in the category plus one.
    ///
    /// After a deletion this can hand out an id that was already issued.
    CountBased,
}
