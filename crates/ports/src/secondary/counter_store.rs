use domain::alert::entity::CategoryGroup;
use domain::alert::error::AlertError;

/// Durable per-group sequence numbering.
pub trait CounterStore: Send + Sync {
    /// Assign the next sequence tag for the group and persist the
    /// counters. `None` yields the unknown sentinel without any
    /// counter change.
    fn next(&self, group: Option<CategoryGroup>) -> Result<String, AlertError>;

    /// Current counter value for a group.
    fn current(&self, group: CategoryGroup) -> Result<u64, AlertError>;
}
