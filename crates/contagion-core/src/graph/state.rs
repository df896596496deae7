//! Graph State
//!
//! The aggregate the driver owns: the store plus id counter, death and day
//! counters, and the bounded statistics history.

use bevy_ecs::prelude::*;
use std::collections::VecDeque;

use contagion_events::{
    GraphSnapshot, HistoryEntry, HubId, NodeId, StatusCounts, TickStatistics,
};

use super::{GraphStore, Node};

/// Default number of history entries kept (the chart window).
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Resource, Debug, Clone)]
pub struct GraphState {
    pub store: GraphStore,
    next_node_id: u64,
    /// Running total of deaths since initialization.
    pub death_count: u64,
    /// Ticks elapsed since initialization.
    pub day: u64,
    history: VecDeque<HistoryEntry>,
    history_limit: usize,
}

impl Default for GraphState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl GraphState {
    pub fn new(history_limit: usize) -> Self {
        Self {
            store: GraphStore::new(),
            next_node_id: 0,
            death_count: 0,
            day: 0,
            history: VecDeque::new(),
            history_limit,
        }
    }

    /// Creates a healthy node with the next id and inserts it.
    pub fn spawn_node(&mut self, hub: Option<HubId>, now: u64) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.store.add_node(Node::new(id, hub, now));
        id
    }

    /// The id the next spawned node will receive.
    pub fn next_node_id(&self) -> NodeId {
        NodeId(self.next_node_id)
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(self.store.nodes().map(|n| n.status))
    }

    /// Appends this tick's counts to the history, evicting the oldest entry
    /// past the limit.
    pub fn record_history(&mut self) -> HistoryEntry {
        let entry = HistoryEntry::new(self.day, self.counts(), self.death_count);
        self.history.push_back(entry);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
        entry
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.history_limit = limit;
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    /// Statistics as of the current state.
    pub fn statistics(&self) -> TickStatistics {
        let counts = self.counts();
        TickStatistics {
            day: self.day,
            healthy: counts.healthy,
            infected: counts.infected,
            recovered: counts.recovered,
            vaccinated: counts.vaccinated,
            dead: self.death_count,
            history: self.history.iter().copied().collect(),
        }
    }

    pub fn snapshot(&self, taken_at: u64) -> GraphSnapshot {
        GraphSnapshot {
            day: self.day,
            taken_at,
            death_count: self.death_count,
            nodes: self.store.nodes().map(Node::snapshot).collect(),
            edges: self.store.edges().map(|e| e.snapshot()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contagion_events::NodeStatus;

    #[test]
    fn test_ids_are_never_reused() {
        let mut state = GraphState::default();
        let a = state.spawn_node(None, 0);
        let b = state.spawn_node(Some(HubId(0)), 0);
        state.store.remove_node(b).unwrap();
        let c = state.spawn_node(None, 0);

        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
        assert_eq!(c, NodeId(2));
        assert_eq!(state.next_node_id(), NodeId(3));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut state = GraphState::new(3);
        state.spawn_node(None, 0);

        for day in 1..=5 {
            state.day = day;
            state.record_history();
        }

        let days: Vec<u64> = state.history().map(|h| h.day).collect();
        assert_eq!(days, vec![3, 4, 5]);

        state.set_history_limit(1);
        assert_eq!(state.history_len(), 1);
    }

    #[test]
    fn test_statistics_reflect_counts() {
        let mut state = GraphState::default();
        let a = state.spawn_node(None, 0);
        state.spawn_node(None, 0);
        state.store.node_mut(a).unwrap().infect(0);
        state.death_count = 2;
        state.day = 4;
        state.record_history();

        let stats = state.statistics();
        assert_eq!(stats.day, 4);
        assert_eq!(stats.healthy, 1);
        assert_eq!(stats.infected, 1);
        assert_eq!(stats.dead, 2);
        assert_eq!(stats.history.len(), 1);

        let snapshot = state.snapshot(1234);
        assert_eq!(snapshot.taken_at, 1234);
        assert_eq!(snapshot.node(a).unwrap().status, NodeStatus::Infected);
    }
}
