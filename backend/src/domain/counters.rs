//! Aggregate lifecycle counters.
//!
//! Counters mirror how many stored containers sit in each status. They are
//! owned by the lifecycle service and only move through its commit path.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::ContainerStatus;

/// Per-status container tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTally {
    pub prepared: i64,
    pub in_transit: i64,
    pub expired: i64,
}

impl StatusTally {
    /// Tally an iterator of statuses.
    ///
    /// # Examples
    /// ```
    /// use viandas::domain::{ContainerStatus, StatusTally};
    ///
    /// let tally = StatusTally::from_statuses([
    ///     ContainerStatus::Prepared,
    ///     ContainerStatus::Expired,
    ///     ContainerStatus::Prepared,
    /// ]);
    /// assert_eq!(tally.prepared, 2);
    /// assert_eq!(tally.expired, 1);
    /// ```
    pub fn from_statuses(statuses: impl IntoIterator<Item = ContainerStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut tally, status| {
            *tally.slot_mut(status) += 1;
            tally
        })
    }

    /// Count recorded for `status`.
    pub fn count(&self, status: ContainerStatus) -> i64 {
        match status {
            ContainerStatus::Prepared => self.prepared,
            ContainerStatus::InTransit => self.in_transit,
            ContainerStatus::Expired => self.expired,
        }
    }

    /// Overwrite the count for `status`.
    pub fn set(&mut self, status: ContainerStatus, value: i64) {
        *self.slot_mut(status) = value;
    }

    /// Total containers across all statuses.
    pub fn total(&self) -> i64 {
        self.prepared + self.in_transit + self.expired
    }

    fn slot_mut(&mut self, status: ContainerStatus) -> &mut i64 {
        match status {
            ContainerStatus::Prepared => &mut self.prepared,
            ContainerStatus::InTransit => &mut self.in_transit,
            ContainerStatus::Expired => &mut self.expired,
        }
    }
}

/// Live counters shared between the lifecycle service and metrics.
///
/// The three values sit behind one mutex so a transition moves a unit from
/// one status to another in a single step and every snapshot sees a whole
/// tally.
#[derive(Debug, Default)]
pub struct ContainerCounters {
    tally: Mutex<StatusTally>,
}

impl ContainerCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read all three counters at once.
    pub fn snapshot(&self) -> StatusTally {
        *self.lock()
    }

    pub(crate) fn record_registration(&self) {
        *self.lock().slot_mut(ContainerStatus::Prepared) += 1;
    }

    pub(crate) fn record_transition(&self, from: ContainerStatus, to: ContainerStatus) {
        if from == to {
            return;
        }
        let mut tally = self.lock();
        *tally.slot_mut(from) -= 1;
        *tally.slot_mut(to) += 1;
    }

    pub(crate) fn restore(&self, tally: StatusTally) {
        *self.lock() = tally;
    }

    pub(crate) fn reset(&self) {
        self.restore(StatusTally::default());
    }

    // Every critical section is plain arithmetic, so a poisoned lock still
    // holds a whole tally.
    fn lock(&self) -> MutexGuard<'_, StatusTally> {
        self.tally.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
