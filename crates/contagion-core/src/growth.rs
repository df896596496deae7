//! Growth Engine
//!
//! Adds new healthy members every tick, either into a random hub (linked to
//! hub-mates and to a few members of other hubs) or as hubless nodes with
//! sparse random links.

use contagion_events::{HubId, NodeId};

use crate::config::SimulationParams;
use crate::graph::GraphState;
use crate::rng::RandomSource;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrowthOutcome {
    pub hubbed: usize,
    pub hubless: usize,
    pub edges_added: usize,
}

impl GrowthOutcome {
    pub fn nodes_added(&self) -> usize {
        self.hubbed + self.hubless
    }
}

/// Appends exactly `growth.rate` nodes.
pub fn grow_community<R: RandomSource>(
    state: &mut GraphState,
    params: &SimulationParams,
    rng: &mut R,
    now: u64,
) -> GrowthOutcome {
    let mut outcome = GrowthOutcome::default();

    for _ in 0..params.growth.rate {
        let join_hub = rng.chance(params.growth.hub_probability);
        let hub = if join_hub {
            rng.pick_index(params.hubs.num_hubs as usize)
                .map(|h| HubId(h as u32))
        } else {
            None
        };

        match hub {
            Some(hub) => {
                outcome.edges_added += add_hubbed_node(state, params, hub, rng, now);
                outcome.hubbed += 1;
            }
            None => {
                outcome.edges_added += add_hubless_node(state, params, rng, now);
                outcome.hubless += 1;
            }
        }
    }

    outcome
}

fn add_hubbed_node<R: RandomSource>(
    state: &mut GraphState,
    params: &SimulationParams,
    hub: HubId,
    rng: &mut R,
    now: u64,
) -> usize {
    let id = state.spawn_node(Some(hub), now);

    let mut mates: Vec<NodeId> = Vec::new();
    let mut others: Vec<NodeId> = Vec::new();
    for node in state.store.nodes().filter(|n| n.id != id) {
        match node.current_hub {
            Some(h) if h == hub => mates.push(node.id),
            Some(_) => others.push(node.id),
            None => {}
        }
    }

    let mut added = 0;
    let count = rng.count_in(
        params.hubs.min_intra_hub_connections,
        params.hubs.num_intra_hub_connections,
    );
    for mate in rng.choose_distinct(&mates, count) {
        if state.store.add_edge(id, mate, params.links.intra(), true).is_some() {
            added += 1;
        }
    }

    let count = params.hubs.num_inter_hub_connections.min(others.len());
    for other in rng.choose_distinct(&others, count) {
        if state.store.add_edge(id, other, params.links.inter(), true).is_some() {
            added += 1;
        }
    }

    added
}

fn add_hubless_node<R: RandomSource>(
    state: &mut GraphState,
    params: &SimulationParams,
    rng: &mut R,
    now: u64,
) -> usize {
    let id = state.spawn_node(None, now);
    let population: Vec<NodeId> = state
        .store
        .node_ids()
        .into_iter()
        .filter(|&n| n != id)
        .collect();

    // Inclusive range [min_connections, num_connections]
    let min = params.hubless.min_connections;
    let span = params.hubless.num_connections.saturating_sub(min) + 1;
    let count = rng.count_in(min, span);

    let mut added = 0;
    for target in rng.choose_distinct(&population, count) {
        if state.store.add_edge(id, target, params.links.inter(), false).is_some() {
            added += 1;
        }
    }
    added
}
