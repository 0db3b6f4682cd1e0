use chrono::NaiveDate;

use crate::activity::entities::ActivityRecord;

/// A new snapshot of activity, forwarded whenever it or the current day differs from the
/// previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEvent {
    /// Starts from 1 and grows with every forwarded snapshot.
    pub sequence: u64,
    /// Day the snapshot has to be evaluated against.
    pub evaluation_date: NaiveDate,
    pub records: Vec<ActivityRecord>,
}
