//! Network Builder
//!
//! Creates the initial topology: hub communities, sparse hubless nodes,
//! intra-hub links and a few bridges between every pair of hubs. The first
//! node built is infected as patient zero.

use contagion_events::{HubId, NodeId};

use crate::config::SimulationParams;
use crate::graph::GraphState;
use crate::rng::RandomSource;

/// Builds a fresh graph, replacing nothing: callers swap it in whole.
pub fn build_network<R: RandomSource>(
    params: &SimulationParams,
    rng: &mut R,
    now: u64,
) -> GraphState {
    let mut state = GraphState::new(params.run.history_limit);
    let hubs = &params.hubs;
    let intra = params.links.intra();
    let inter = params.links.inter();

    // Every node in construction order; hubless nodes draw their links from it
    let mut built: Vec<NodeId> = Vec::new();

    let mut members: Vec<Vec<NodeId>> = Vec::with_capacity(hubs.num_hubs as usize);
    for hub in 0..hubs.num_hubs {
        let hub_nodes: Vec<NodeId> = (0..hubs.nodes_per_hub)
            .map(|_| state.spawn_node(Some(HubId(hub)), now))
            .collect();
        built.extend_from_slice(&hub_nodes);
        members.push(hub_nodes);
    }

    for _ in 0..params.hubless.initial_count {
        let id = state.spawn_node(None, now);
        let count = rng.count_in(params.hubless.min_connections, params.hubless.num_connections);
        let targets = rng.choose_distinct(&built, count);
        for target in targets {
            state.store.add_edge(id, target, inter, false);
        }
        built.push(id);
    }

    for hub_nodes in &members {
        for &node in hub_nodes {
            let mates: Vec<NodeId> = hub_nodes.iter().copied().filter(|&m| m != node).collect();
            let count = rng.count_in(
                hubs.min_intra_hub_connections,
                hubs.num_intra_hub_connections,
            );
            for mate in rng.choose_distinct(&mates, count) {
                state.store.add_edge(node, mate, intra, true);
            }
        }
    }

    for (i, hub_a) in members.iter().enumerate() {
        for hub_b in members.iter().skip(i + 1) {
            let samples_a = rng.choose_distinct(hub_a, hubs.hub_sample_size);
            let samples_b = rng.choose_distinct(hub_b, hubs.hub_sample_size);
            for &a in &samples_a {
                for &b in &samples_b {
                    state.store.add_edge(a, b, inter, true);
                }
            }
        }
    }

    if let Some(&first) = built.first() {
        if let Some(node) = state.store.node_mut(first) {
            node.infect(now);
        }
    }

    tracing::info!(
        nodes = state.store.node_count(),
        edges = state.store.edge_count(),
        hubs = hubs.num_hubs,
        "built initial network"
    );

    state
}
