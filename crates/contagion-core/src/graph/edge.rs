//! Edge
//!
//! Undirected contact relation between two node ids.

use contagion_events::{EdgeSnapshot, NodeId};

/// Identifier of an edge inside a [`GraphStore`](super::GraphStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u64);

/// Layout hints carried by an edge. Opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkWeights {
    pub strength: f64,
    pub distance: f64,
}

impl LinkWeights {
    pub fn new(strength: f64, distance: f64) -> Self {
        Self { strength, distance }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub strength: f64,
    pub distance: f64,
    /// Marks structural hub-membership links. Informational only.
    pub is_persistent: bool,
}

impl Edge {
    /// The endpoint opposite `node`, if `node` is an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }

    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    pub fn weights(&self) -> LinkWeights {
        LinkWeights::new(self.strength, self.distance)
    }

    pub fn set_weights(&mut self, weights: LinkWeights) {
        self.strength = weights.strength;
        self.distance = weights.distance;
    }

    pub fn snapshot(&self) -> EdgeSnapshot {
        EdgeSnapshot {
            source: self.source,
            target: self.target,
            strength: self.strength,
            distance: self.distance,
            is_persistent: self.is_persistent,
        }
    }
}
