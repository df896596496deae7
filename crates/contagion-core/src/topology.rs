//! Topology Mutator
//!
//! Per-tick rewiring: hubless nodes swap one random link for a link to a
//! stranger, and hubbed nodes may follow a neighbour into another hub.
//!
//! All decisions are taken against an [`AdjacencyIndex`] snapshotted at the
//! start of the tick, then applied as one batch in a fixed order:
//! remove edges, add edges, reclassify surviving edges, commit hub fields.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use contagion_events::{HubId, NodeId};

use crate::config::{HubParams, HublessParams, LinkParams};
use crate::graph::{EdgeId, GraphState, GraphStore, LinkWeights};
use crate::rng::RandomSource;

/// Tick-scoped neighbour and hub-membership index.
///
/// Rebuilt from the store every tick and dropped at tick end.
#[derive(Debug, Default)]
pub struct AdjacencyIndex {
    node_ids: Vec<NodeId>,
    neighbors: HashMap<NodeId, BTreeSet<NodeId>>,
    hub_of: HashMap<NodeId, Option<HubId>>,
    members: BTreeMap<HubId, Vec<NodeId>>,
}

impl AdjacencyIndex {
    pub fn build(store: &GraphStore) -> Self {
        let mut index = Self {
            node_ids: store.node_ids(),
            ..Default::default()
        };

        for node in store.nodes() {
            index.neighbors.insert(node.id, BTreeSet::new());
            index.hub_of.insert(node.id, node.current_hub);
            if let Some(hub) = node.current_hub {
                index.members.entry(hub).or_default().push(node.id);
            }
        }

        for edge in store.edges() {
            if let Some(set) = index.neighbors.get_mut(&edge.source) {
                set.insert(edge.target);
            }
            if let Some(set) = index.neighbors.get_mut(&edge.target) {
                set.insert(edge.source);
            }
        }

        index
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    pub fn neighbors(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.neighbors.get(&id)
    }

    pub fn is_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.neighbors.get(&a).map_or(false, |set| set.contains(&b))
    }

    pub fn hub_of(&self, id: NodeId) -> Option<HubId> {
        self.hub_of.get(&id).copied().flatten()
    }

    pub fn members(&self, hub: HubId) -> &[NodeId] {
        self.members.get(&hub).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// What one rewiring step changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyOutcome {
    pub hubless_rewires: usize,
    pub hub_switches: usize,
    pub edges_removed: usize,
    pub edges_added: usize,
    pub edges_reclassified: usize,
}

#[derive(Debug)]
struct PendingEdge {
    source: NodeId,
    target: NodeId,
    weights: LinkWeights,
    is_persistent: bool,
}

#[derive(Debug, Clone, Copy)]
struct HubSwitch {
    node: NodeId,
    from: HubId,
    to: HubId,
}

/// Batched structural edits collected during the decision phase.
#[derive(Debug, Default)]
struct MutationPlan {
    remove: Vec<EdgeId>,
    removing: HashSet<EdgeId>,
    add: Vec<PendingEdge>,
    switches: Vec<HubSwitch>,
}

impl MutationPlan {
    fn remove(&mut self, edge: EdgeId) {
        if self.removing.insert(edge) {
            self.remove.push(edge);
        }
    }
}

/// Applies hubless rewiring and hub switching for one tick.
pub fn rewire_topology<R: RandomSource>(
    state: &mut GraphState,
    hubs: &HubParams,
    hubless: &HublessParams,
    links: &LinkParams,
    rng: &mut R,
    now: u64,
) -> TopologyOutcome {
    let index = AdjacencyIndex::build(&state.store);
    let mut plan = MutationPlan::default();
    let mut outcome = TopologyOutcome::default();

    for &node in index.node_ids() {
        match index.hub_of(node) {
            None => {
                if rng.chance(hubless.rewire_probability)
                    && plan_hubless_rewire(&state.store, &index, node, links, rng, &mut plan)
                {
                    outcome.hubless_rewires += 1;
                }
            }
            Some(hub) => {
                if rng.chance(hubs.hub_switch_probability)
                    && plan_hub_switch(&state.store, &index, node, hub, hubs, links, rng, &mut plan)
                {
                    outcome.hub_switches += 1;
                }
            }
        }
    }

    apply_plan(&mut state.store, plan, links, now, &mut outcome);
    outcome
}

/// Drops one random link and links to a random non-neighbour instead.
fn plan_hubless_rewire<R: RandomSource>(
    store: &GraphStore,
    index: &AdjacencyIndex,
    node: NodeId,
    links: &LinkParams,
    rng: &mut R,
    plan: &mut MutationPlan,
) -> bool {
    let Some(neighbors) = index.neighbors(node) else {
        return false;
    };
    if neighbors.is_empty() {
        return false;
    }

    let strangers: Vec<NodeId> = index
        .node_ids()
        .iter()
        .copied()
        .filter(|&n| n != node && !neighbors.contains(&n))
        .collect();
    if strangers.is_empty() {
        return false;
    }

    let current: Vec<NodeId> = neighbors.iter().copied().collect();
    let Some(old) = rng.pick(&current) else {
        return false;
    };
    let Some(old_edge) = store.edge_between(node, old) else {
        return false;
    };
    let Some(new) = rng.pick(&strangers) else {
        return false;
    };

    plan.remove(old_edge);
    plan.add.push(PendingEdge {
        source: node,
        target: new,
        weights: links.inter(),
        is_persistent: false,
    });
    true
}

/// Moves `node` towards the hub of a random neighbour in another hub.
#[allow(clippy::too_many_arguments)]
fn plan_hub_switch<R: RandomSource>(
    store: &GraphStore,
    index: &AdjacencyIndex,
    node: NodeId,
    old_hub: HubId,
    hubs: &HubParams,
    links: &LinkParams,
    rng: &mut R,
    plan: &mut MutationPlan,
) -> bool {
    let Some(neighbors) = index.neighbors(node) else {
        return false;
    };

    let elsewhere: Vec<NodeId> = neighbors
        .iter()
        .copied()
        .filter(|&n| matches!(index.hub_of(n), Some(h) if h != old_hub))
        .collect();
    let Some(new_hub) = rng.pick(&elsewhere).and_then(|n| index.hub_of(n)) else {
        return false;
    };

    // Links into the old hub, in discovery order
    let old_links: Vec<EdgeId> = store
        .incident_edges(node)
        .iter()
        .copied()
        .filter(|&e| {
            store
                .edge(e)
                .and_then(|edge| edge.other(node))
                .map_or(false, |other| index.hub_of(other) == Some(old_hub))
        })
        .collect();

    let drop_count =
        ((old_links.len() as f64 * hubs.switch_removal_fraction).floor() as usize).min(old_links.len());
    for &edge in old_links.iter().take(drop_count) {
        plan.remove(edge);
    }

    let candidates: Vec<NodeId> = index
        .members(new_hub)
        .iter()
        .copied()
        .filter(|&m| m != node && !index.is_connected(node, m))
        .collect();
    for target in rng.choose_distinct(&candidates, drop_count) {
        plan.add.push(PendingEdge {
            source: node,
            target,
            weights: links.intra(),
            is_persistent: true,
        });
    }

    plan.switches.push(HubSwitch {
        node,
        from: old_hub,
        to: new_hub,
    });
    tracing::trace!(%node, from = %old_hub, to = %new_hub, dropped = drop_count, "hub switch planned");
    true
}

fn apply_plan(
    store: &mut GraphStore,
    plan: MutationPlan,
    links: &LinkParams,
    now: u64,
    outcome: &mut TopologyOutcome,
) {
    for edge in plan.remove {
        if store.remove_edge(edge).is_some() {
            outcome.edges_removed += 1;
        }
    }

    let mut added: HashSet<EdgeId> = HashSet::new();
    for pending in plan.add {
        if let Some(id) = store.add_edge(
            pending.source,
            pending.target,
            pending.weights,
            pending.is_persistent,
        ) {
            added.insert(id);
        }
    }
    outcome.edges_added = added.len();

    // Surviving links back into the old hub now bridge old and new hub.
    // Hub fields are still uncommitted here, so every node reads its
    // start-of-tick hub.
    let inter = links.inter();
    for switch in &plan.switches {
        let incident: Vec<EdgeId> = store.incident_edges(switch.node).to_vec();
        for edge_id in incident {
            if added.contains(&edge_id) {
                continue;
            }
            let other_hub = store
                .edge(edge_id)
                .and_then(|edge| edge.other(switch.node))
                .and_then(|other| store.node(other))
                .and_then(|other| other.current_hub);
            if other_hub != Some(switch.from) {
                continue;
            }
            if let Some(edge) = store.edge_mut(edge_id) {
                edge.set_weights(inter);
                outcome.edges_reclassified += 1;
            }
        }
    }

    for switch in plan.switches {
        if let Some(node) = store.node_mut(switch.node) {
            node.current_hub = Some(switch.to);
            node.last_switch_time = now;
        }
    }
}
