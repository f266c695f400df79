//! Per-group sequence numbering for outgoing notifications.
//!
//! Each category group owns an independent monotonically increasing
//! counter. A notification is tagged `{group code}-{zero padded count}`,
//! e.g. the third Warning-group notification is `2-000003`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::alert::entity::CategoryGroup;

/// Tag assigned when a category maps to no known group.
pub const UNKNOWN_SEQUENCE: &str = "0-UNKNOWN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceCounters {
    counters: HashMap<CategoryGroup, u64>,
}

impl SequenceCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the group counter and return the formatted tag.
    /// A missing group yields the unknown sentinel without touching
    /// any counter.
    pub fn assign(&mut self, group: Option<CategoryGroup>) -> String {
        let Some(group) = group else {
            return UNKNOWN_SEQUENCE.to_string();
        };
        let counter = self.counters.entry(group).or_insert(0);
        *counter += 1;
        format!(
            "{}-{:0width$}",
            group.code(),
            counter,
            width = group.pad_width()
        )
    }

    /// Current value of a group counter, zero if never assigned.
    pub fn current(&self, group: CategoryGroup) -> u64 {
        self.counters.get(&group).copied().unwrap_or(0)
    }
}
