//! Snapshot Types
//!
//! Read-only copies of the graph handed to the rendering layer between ticks.
//! The engine never reads these back; renderers attach their own layout
//! state (positions, velocities) keyed by node id.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{HubId, NodeId, NodeStatus, StatusCounts};

/// A node as seen from outside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub status: NodeStatus,
    #[serde(default)]
    pub infected_at: Option<u64>,
    #[serde(default)]
    pub recovered_at: Option<u64>,
    #[serde(default)]
    pub vaccinated_at: Option<u64>,
    pub alive: bool,
    #[serde(default)]
    pub current_hub: Option<HubId>,
    pub last_switch_time: u64,
}

/// An undirected contact edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub source: NodeId,
    pub target: NodeId,
    /// Layout hint: spring strength.
    pub strength: f64,
    /// Layout hint: rest length.
    pub distance: f64,
    #[serde(default)]
    pub is_persistent: bool,
}

/// Consistent post-tick view of the whole graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub day: u64,
    /// Timestamp (ms) of the tick that produced this snapshot.
    pub taken_at: u64,
    pub death_count: u64,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphSnapshot {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_ids(&self) -> HashSet<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(self.nodes.iter().map(|n| n.status))
    }

    /// Distinct hubs that currently have at least one member.
    pub fn hub_ids(&self) -> Vec<HubId> {
        let mut hubs: Vec<HubId> = self.nodes.iter().filter_map(|n| n.current_hub).collect();
        hubs.sort_unstable();
        hubs.dedup();
        hubs
    }

    /// Edges whose endpoints are not both present. Always empty for a
    /// snapshot taken from a well-formed graph.
    pub fn dangling_edges(&self) -> Vec<&EdgeSnapshot> {
        let ids = self.node_ids();
        self.edges
            .iter()
            .filter(|e| !ids.contains(&e.source) || !ids.contains(&e.target))
            .collect()
    }
}
