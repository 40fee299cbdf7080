//! Record id allocation.
//!
//! Memory ids combine the creation instant with a random suffix. Rule ids are
//! scoped to their category: a three-letter prefix plus a zero-padded number.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use keeper_rs_protocol::IdStrategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Mint a memory id: `<unix-millis>-<8 hex chars>`.
pub fn memory_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.timestamp_millis(), &suffix[..8])
}

/// First three lowercase characters of the category.
pub fn category_prefix(category: &str) -> String {
    category.trim().to_lowercase().chars().take(3).collect()
}

/// Format a rule id from its prefix and sequence number.
pub fn format_rule_id(prefix: &str, number: u64) -> String {
    format!("{prefix}-{number:03}")
}

/// Highest sequence number issued per prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdCounters(BTreeMap<String, u64>);

impl IdCounters {
    /// Advance the counter for `prefix` and return the new value.
    pub fn next(&mut self, prefix: &str) -> u64 {
        let counter = self.0.entry(prefix.to_string()).or_insert(0);
        *counter = counter.saturating_add(1);
        *counter
    }

    /// Last value issued for `prefix`.
    pub fn current(&self, prefix: &str) -> u64 {
        self.0.get(prefix).copied().unwrap_or(0)
    }

    /// Raise the counter so ids up to `id` are never issued again.
    ///
    /// Ids without a numeric suffix are ignored.
    pub fn observe(&mut self, id: &str) {
        let Some((prefix, number)) = id.rsplit_once('-') else {
            return;
        };
        let Ok(number) = number.parse::<u64>() else {
            return;
        };
        if prefix.is_empty() {
            return;
        }
        let counter = self.0.entry(prefix.to_string()).or_insert(0);
        if number > *counter {
            *counter = number;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Allocate a category-scoped rule id.
///
/// `live_in_category` is the number of records currently in the category and
/// only matters for [`IdStrategy::CountBased`]. `is_taken` reports ids already
/// present in the store.
pub fn allocate_rule_id(
    strategy: IdStrategy,
    category: &str,
    live_in_category: usize,
    counters: &mut IdCounters,
    is_taken: impl Fn(&str) -> bool,
) -> Result<String, StoreError> {
    let prefix = category_prefix(category);
    if prefix.is_empty() {
        return Err(StoreError::Validation("category is required".to_string()));
    }
    match strategy {
        IdStrategy::Monotonic => loop {
            let id = format_rule_id(&prefix, counters.next(&prefix));
            if !is_taken(&id) {
                return Ok(id);
            }
        },
        IdStrategy::CountBased => {
            let number = u64::try_from(live_in_category)
                .unwrap_or(u64::MAX)
                .saturating_add(1);
            Ok(format_rule_id(&prefix, number))
        }
    }
}
