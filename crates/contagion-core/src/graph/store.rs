//! Graph Store
//!
//! Owns nodes and edges in id-keyed tables with O(1) lookup and swap-remove
//! deletion, plus a node → incident-edge index kept in step with every
//! insertion and removal.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use contagion_events::{HubId, NodeId};

use super::{Edge, EdgeId, LinkWeights, Node};

/// Something stored under a stable key.
pub trait Keyed {
    type Key: Copy + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;
}

impl Keyed for Node {
    type Key = NodeId;

    fn key(&self) -> NodeId {
        self.id
    }
}

impl Keyed for Edge {
    type Key = EdgeId;

    fn key(&self) -> EdgeId {
        self.id
    }
}

/// Dense vector of items plus a key → slot map.
///
/// Removal swaps the last item into the vacated slot, so iteration order is
/// deterministic but not insertion order once anything has been removed.
#[derive(Debug, Clone)]
pub struct IdTable<T: Keyed> {
    items: Vec<T>,
    slots: HashMap<T::Key, usize>,
}

impl<T: Keyed> Default for IdTable<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

impl<T: Keyed> IdTable<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, key: T::Key) -> bool {
        self.slots.contains_key(&key)
    }

    pub fn get(&self, key: T::Key) -> Option<&T> {
        self.slots.get(&key).and_then(|&slot| self.items.get(slot))
    }

    pub fn get_mut(&mut self, key: T::Key) -> Option<&mut T> {
        match self.slots.get(&key) {
            Some(&slot) => self.items.get_mut(slot),
            None => None,
        }
    }

    /// Inserts `item`; returns false and drops it if the key is taken.
    pub fn insert(&mut self, item: T) -> bool {
        let key = item.key();
        if self.slots.contains_key(&key) {
            return false;
        }
        self.slots.insert(key, self.items.len());
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, key: T::Key) -> Option<T> {
        let slot = self.slots.remove(&key)?;
        let item = self.items.swap_remove(slot);
        if let Some(moved) = self.items.get(slot) {
            self.slots.insert(moved.key(), slot);
        }
        Some(item)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn keys(&self) -> Vec<T::Key> {
        self.items.iter().map(Keyed::key).collect()
    }
}

/// Canonical node and edge collections.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: IdTable<Node>,
    edges: IdTable<Edge>,
    incident: HashMap<NodeId, Vec<EdgeId>>,
    next_edge_id: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys()
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.keys()
    }

    /// Inserts a node. Returns false if a node with that id already exists.
    pub fn add_node(&mut self, node: Node) -> bool {
        let id = node.id;
        if !self.nodes.insert(node) {
            return false;
        }
        self.incident.entry(id).or_default();
        true
    }

    /// Links two existing, distinct nodes.
    ///
    /// Self-loops and edges to unknown nodes are refused with `None`.
    /// Parallel edges between the same pair are allowed.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        weights: LinkWeights,
        is_persistent: bool,
    ) -> Option<EdgeId> {
        if source == target || !self.contains_node(source) || !self.contains_node(target) {
            return None;
        }

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.insert(Edge {
            id,
            source,
            target,
            strength: weights.strength,
            distance: weights.distance,
            is_persistent,
        });
        self.incident.entry(source).or_default().push(id);
        self.incident.entry(target).or_default().push(id);
        Some(id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(id)?;
        for endpoint in [edge.source, edge.target] {
            if let Some(list) = self.incident.get_mut(&endpoint) {
                list.retain(|&e| e != id);
            }
        }
        Some(edge)
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<(Node, Vec<Edge>)> {
        let node = self.nodes.remove(id)?;
        let incident = self.incident.remove(&id).unwrap_or_default();

        let mut removed = Vec::with_capacity(incident.len());
        for edge_id in incident {
            if let Some(edge) = self.edges.remove(edge_id) {
                if let Some(other) = edge.other(id) {
                    if let Some(list) = self.incident.get_mut(&other) {
                        list.retain(|&e| e != edge_id);
                    }
                }
                removed.push(edge);
            }
        }
        Some((node, removed))
    }

    /// Edge ids touching `id`, in attachment order.
    pub fn incident_edges(&self, id: NodeId) -> &[EdgeId] {
        self.incident.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.incident_edges(id).len()
    }

    /// Neighbour ids of `id`; a neighbour appears once per parallel edge.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.incident_edges(id)
            .iter()
            .filter_map(|&e| self.edges.get(e))
            .filter_map(|edge| edge.other(id))
            .collect()
    }

    /// First edge found between `a` and `b`.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.incident_edges(a)
            .iter()
            .copied()
            .find(|&e| self.edges.get(e).map_or(false, |edge| edge.connects(a, b)))
    }

    /// Current members of `hub`, recomputed from node attributes.
    pub fn hub_members(&self, hub: HubId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.current_hub == Some(hub))
            .map(|n| n.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: LinkWeights = LinkWeights {
        strength: 0.5,
        distance: 100.0,
    };

    fn store_with(n: u64) -> GraphStore {
        let mut store = GraphStore::new();
        for i in 0..n {
            assert!(store.add_node(Node::new(NodeId(i), None, 0)));
        }
        store
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut store = store_with(1);
        assert!(!store.add_node(Node::new(NodeId(0), None, 0)));
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_self_loop_and_unknown_endpoint_refused() {
        let mut store = store_with(2);
        assert!(store.add_edge(NodeId(0), NodeId(0), W, false).is_none());
        assert!(store.add_edge(NodeId(0), NodeId(9), W, false).is_none());
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_incident_index_tracks_edges() {
        let mut store = store_with(3);
        let a = store.add_edge(NodeId(0), NodeId(1), W, false).unwrap();
        let b = store.add_edge(NodeId(1), NodeId(2), W, true).unwrap();

        assert_eq!(store.incident_edges(NodeId(1)), &[a, b]);
        assert_eq!(store.neighbors(NodeId(1)), vec![NodeId(0), NodeId(2)]);
        assert_eq!(store.edge_between(NodeId(2), NodeId(1)), Some(b));

        store.remove_edge(a).unwrap();
        assert_eq!(store.incident_edges(NodeId(0)), &[] as &[EdgeId]);
        assert_eq!(store.incident_edges(NodeId(1)), &[b]);
        assert!(store.edge_between(NodeId(0), NodeId(1)).is_none());
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut store = store_with(4);
        store.add_edge(NodeId(0), NodeId(1), W, false).unwrap();
        store.add_edge(NodeId(0), NodeId(2), W, false).unwrap();
        let kept = store.add_edge(NodeId(2), NodeId(3), W, false).unwrap();

        let (node, edges) = store.remove_node(NodeId(0)).unwrap();
        assert_eq!(node.id, NodeId(0));
        assert_eq!(edges.len(), 2);
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.edge_ids(), vec![kept]);
        assert_eq!(store.degree(NodeId(1)), 0);
        assert_eq!(store.degree(NodeId(2)), 1);

        for edge in store.edges() {
            assert!(store.contains_node(edge.source));
            assert!(store.contains_node(edge.target));
        }
    }

    #[test]
    fn test_swap_remove_keeps_lookup_valid() {
        let mut store = store_with(5);
        store.remove_node(NodeId(1)).unwrap();

        for id in [0, 2, 3, 4] {
            assert_eq!(store.node(NodeId(id)).map(|n| n.id), Some(NodeId(id)));
        }
        assert!(store.node(NodeId(1)).is_none());
        assert!(store.remove_node(NodeId(1)).is_none());
    }

    #[test]
    fn test_parallel_edges_allowed() {
        let mut store = store_with(2);
        store.add_edge(NodeId(0), NodeId(1), W, false).unwrap();
        store.add_edge(NodeId(1), NodeId(0), W, true).unwrap();
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.degree(NodeId(0)), 2);
    }

    #[test]
    fn test_hub_members() {
        let mut store = GraphStore::new();
        store.add_node(Node::new(NodeId(0), Some(HubId(0)), 0));
        store.add_node(Node::new(NodeId(1), Some(HubId(1)), 0));
        store.add_node(Node::new(NodeId(2), Some(HubId(0)), 0));
        store.add_node(Node::new(NodeId(3), None, 0));

        assert_eq!(store.hub_members(HubId(0)), vec![NodeId(0), NodeId(2)]);
        assert!(store.hub_members(HubId(7)).is_empty());
    }
}
