//! Per-status task counts for the home screen

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::task::{Task, TaskStatus};

/// Number of tasks in each status; every status is always present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCounts {
    counts: BTreeMap<TaskStatus, usize>,
}

impl Default for StatusCounts {
    fn default() -> Self {
        Self {
            counts: TaskStatus::ALL.iter().map(|s| (*s, 0)).collect(),
        }
    }
}

impl StatusCounts {
    pub fn get(&self, status: TaskStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Counts in workflow order
    pub fn iter(&self) -> impl Iterator<Item = (TaskStatus, usize)> + '_ {
        self.counts.iter().map(|(s, n)| (*s, *n))
    }

    fn increment(&mut self, status: TaskStatus) {
        if let Some(n) = self.counts.get_mut(&status) {
            *n += 1;
        }
    }
}

impl Serialize for StatusCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (status, count) in self.iter() {
            map.serialize_entry(status.as_str(), &count)?;
        }
        map.end()
    }
}

/// Count tasks per status
///
/// Tasks whose stored status is not one of the six known values are counted
/// in no bucket.
pub fn count_by_status(tasks: &[Task]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        if let Some(status) = task.status.known() {
            counts.increment(status);
        }
    }
    counts
}
