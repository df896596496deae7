//! Per-tick statistics types.

use serde::{Deserialize, Serialize};

use crate::NodeStatus;

/// Count of live nodes in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub healthy: usize,
    pub infected: usize,
    pub recovered: usize,
    pub vaccinated: usize,
}

impl StatusCounts {
    /// Tallies statuses from an iterator. Dead entries are ignored.
    pub fn tally(statuses: impl IntoIterator<Item = NodeStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            counts.record(status);
        }
        counts
    }

    pub fn record(&mut self, status: NodeStatus) {
        match status {
            NodeStatus::Healthy => self.healthy += 1,
            NodeStatus::Infected => self.infected += 1,
            NodeStatus::Recovered => self.recovered += 1,
            NodeStatus::Vaccinated => self.vaccinated += 1,
            NodeStatus::Dead => {}
        }
    }

    /// Total live population.
    pub fn total(&self) -> usize {
        self.healthy + self.infected + self.recovered + self.vaccinated
    }
}

/// One row of the statistics history, as drawn by the time-series chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub day: u64,
    pub healthy: usize,
    pub infected: usize,
    pub recovered: usize,
    pub vaccinated: usize,
    /// Running total of deaths since initialization.
    pub dead: u64,
}

impl HistoryEntry {
    pub fn new(day: u64, counts: StatusCounts, dead: u64) -> Self {
        Self {
            day,
            healthy: counts.healthy,
            infected: counts.infected,
            recovered: counts.recovered,
            vaccinated: counts.vaccinated,
            dead,
        }
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            healthy: self.healthy,
            infected: self.infected,
            recovered: self.recovered,
            vaccinated: self.vaccinated,
        }
    }
}

/// Statistics handed to the UI after every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStatistics {
    pub day: u64,
    pub healthy: usize,
    pub infected: usize,
    pub recovered: usize,
    pub vaccinated: usize,
    pub dead: u64,
    /// Bounded history, oldest first, ending with this tick's entry.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl TickStatistics {
    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            healthy: self.healthy,
            infected: self.infected,
            recovered: self.recovered,
            vaccinated: self.vaccinated,
        }
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}
