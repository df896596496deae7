//! Whole-run properties of the simulation.
//!
//! These drive the public `Simulation` API over many ticks and check the
//! structural and epidemiological guarantees after every tick.

use std::collections::HashSet;

use contagion_core::graph::GraphState;
use contagion_core::{Simulation, SimulationParams, SimRng};
use contagion_events::{GraphSnapshot, NodeId, NodeStatus};

const STEP_MS: u64 = 1000;

/// Small but busy network: every stochastic stage fires regularly.
fn busy_params() -> SimulationParams {
    let mut params = SimulationParams::default();
    params.hubs.num_hubs = 4;
    params.hubs.nodes_per_hub = 12;
    params.hubs.hub_switch_probability = 0.3;
    params.hubless.initial_count = 15;
    params.hubless.rewire_probability = 0.5;
    params.disease.transmission_probability = 0.3;
    params.disease.death_probability = 0.02;
    params.disease.partial_infection_probability = 0.1;
    params.disease.recovery_time = 3000;
    params.disease.immunity_duration = 4000;
    params.vaccination.start_time = 10_000;
    params.growth.rate = 2;
    params
}

/// No randomness outside what a test turns back on.
fn still_params() -> SimulationParams {
    let mut params = SimulationParams::default();
    params.hubs.num_hubs = 0;
    params.hubs.hub_switch_probability = 0.0;
    params.hubless.initial_count = 0;
    params.hubless.rewire_probability = 0.0;
    params.disease.transmission_probability = 0.0;
    params.disease.death_probability = 0.0;
    params.disease.partial_infection_probability = 0.0;
    params.vaccination.start_time = u64::MAX / 2;
    params.growth.rate = 0;
    params
}

/// A status change a node can make within one tick: a single legal step or
/// two in a row (e.g. immunity wanes then the node is reinfected).
fn reachable_within_tick(from: NodeStatus, to: NodeStatus) -> bool {
    from.can_transition_to(to)
        || NodeStatus::ALL
            .iter()
            .any(|&mid| from.can_transition_to(mid) && mid.can_transition_to(to))
}

fn assert_well_formed(snapshot: &GraphSnapshot) {
    let ids = snapshot.node_ids();
    assert_eq!(ids.len(), snapshot.node_count(), "duplicate node ids on day {}", snapshot.day);
    assert!(
        snapshot.dangling_edges().is_empty(),
        "dangling edges on day {}",
        snapshot.day
    );
    for edge in &snapshot.edges {
        assert_ne!(edge.source, edge.target, "self loop on day {}", snapshot.day);
    }
    for node in &snapshot.nodes {
        assert!(node.alive, "dead node {} still in graph", node.id);
        assert_ne!(node.status, NodeStatus::Dead);
        if node.status == NodeStatus::Infected {
            assert!(node.infected_at.is_some());
        }
    }
}

fn chain(params: &SimulationParams, len: u64) -> GraphState {
    let mut state = GraphState::default();
    let ids: Vec<NodeId> = (0..len).map(|_| state.spawn_node(None, 0)).collect();
    for pair in ids.windows(2) {
        state
            .store
            .add_edge(pair[0], pair[1], params.links.inter(), false)
            .unwrap();
    }
    state
}

#[test]
fn test_graph_stays_well_formed() {
    for seed in [1, 2, 3] {
        let mut sim = Simulation::new(busy_params(), seed, 0);
        assert_well_formed(&sim.snapshot());

        for tick in 1..=60 {
            sim.tick(tick * STEP_MS).unwrap();
            assert_well_formed(&sim.snapshot());
        }
    }
}

#[test]
fn test_ids_are_never_reused() {
    let mut sim = Simulation::new(busy_params(), 4, 0);
    let mut seen: HashSet<NodeId> = sim.snapshot().node_ids();
    let mut highest = seen.iter().copied().max().unwrap();

    for tick in 1..=60 {
        sim.tick(tick * STEP_MS).unwrap();
        let mut fresh: Vec<NodeId> = sim
            .snapshot()
            .node_ids()
            .into_iter()
            .filter(|&id| seen.insert(id))
            .collect();
        fresh.sort_unstable();

        if let (Some(&lowest), Some(&newest)) = (fresh.first(), fresh.last()) {
            assert!(lowest > highest, "{} issued after {}", lowest, highest);
            highest = newest;
        }
    }
}

#[test]
fn test_status_changes_are_legal() {
    let mut sim = Simulation::new(busy_params(), 5, 0);
    let mut previous = sim.snapshot();

    for tick in 1..=60 {
        sim.tick(tick * STEP_MS).unwrap();
        let current = sim.snapshot();
        for node in &current.nodes {
            if let Some(before) = previous.node(node.id) {
                assert!(
                    reachable_within_tick(before.status, node.status),
                    "{}: {} -> {} on day {}",
                    node.id,
                    before.status,
                    node.status,
                    current.day
                );
            } else {
                // Newcomers join healthy, then the later stages may reach them
                assert!(reachable_within_tick(NodeStatus::Healthy, node.status));
            }
        }
        previous = current;
    }
}

#[test]
fn test_statistics_match_graph() {
    let mut sim = Simulation::new(busy_params(), 6, 0);
    for tick in 1..=30 {
        let stats = sim.tick(tick * STEP_MS).unwrap();
        let snapshot = sim.snapshot();
        assert_eq!(stats.counts(), snapshot.counts());
        assert_eq!(stats.counts().total(), snapshot.node_count());
        assert_eq!(stats.dead, snapshot.death_count);
        assert_eq!(stats.day, tick);
        assert_eq!(stats.latest().map(|e| e.day), Some(tick));
    }
}

#[test]
fn test_history_is_bounded() {
    let mut params = busy_params();
    params.run.history_limit = 10;
    let mut sim = Simulation::new(params, 7, 0);

    let mut stats = None;
    for tick in 1..=25 {
        stats = sim.tick(tick * STEP_MS);
    }
    let stats = stats.unwrap();
    assert_eq!(stats.history.len(), 10);
    assert_eq!(stats.history.first().map(|e| e.day), Some(16));
    assert_eq!(stats.history.last().map(|e| e.day), Some(25));
}

#[test]
fn test_transmission_does_not_chain_within_tick() {
    let mut params = still_params();
    params.disease.transmission_probability = 1.0;
    params.disease.recovery_time = 1_000_000;

    let mut state = chain(&params, 3);
    let (a, b, c) = (NodeId(0), NodeId(1), NodeId(2));
    state.store.node_mut(a).unwrap().infect(0);

    let mut sim = Simulation::with_graph(params, state, SimRng::seeded(8), 0);

    sim.tick(STEP_MS).unwrap();
    assert_eq!(sim.state().store.node(b).unwrap().status, NodeStatus::Infected);
    assert_eq!(sim.state().store.node(c).unwrap().status, NodeStatus::Healthy);

    sim.tick(2 * STEP_MS).unwrap();
    assert_eq!(sim.state().store.node(c).unwrap().status, NodeStatus::Infected);
}

#[test]
fn test_certain_death_removes_node_and_edges() {
    let mut params = still_params();
    params.disease.death_probability = 1.0;

    let mut state = chain(&params, 3);
    let middle = NodeId(1);
    state.store.node_mut(middle).unwrap().infect(0);

    let mut sim = Simulation::with_graph(params, state, SimRng::seeded(9), 0);
    let stats = sim.tick(STEP_MS).unwrap();

    assert_eq!(stats.dead, 1);
    assert_eq!(stats.infected, 0);
    assert!(!sim.state().store.contains_node(middle));
    assert_eq!(sim.state().store.edge_count(), 0);
    assert_eq!(sim.state().store.node_count(), 2);
}

#[test]
fn test_growth_is_exact_without_deaths() {
    let mut params = busy_params();
    params.disease.death_probability = 0.0;
    params.growth.rate = 5;
    let mut sim = Simulation::new(params, 10, 0);

    let mut expected = sim.state().store.node_count();
    for tick in 1..=20 {
        sim.tick(tick * STEP_MS).unwrap();
        expected += 5;
        assert_eq!(sim.state().store.node_count(), expected);
    }
}

#[test]
fn test_single_node_lifecycle() {
    let mut params = still_params();
    params.hubless.initial_count = 1;
    params.disease.recovery_time = 2500;
    params.disease.immunity_duration = 2000;

    let mut sim = Simulation::new(params, 11, 0);
    let only = NodeId(0);
    assert_eq!(sim.state().store.node_count(), 1);
    assert_eq!(sim.state().store.edge_count(), 0);

    let mut statuses = Vec::new();
    for tick in 1..=6 {
        sim.tick(tick * STEP_MS).unwrap();
        statuses.push(sim.state().store.node(only).unwrap().status);
    }

    use NodeStatus::*;
    assert_eq!(
        statuses,
        vec![Infected, Infected, Recovered, Recovered, Recovered, Healthy]
    );
    assert_eq!(sim.state().store.node(only).unwrap().recovered_at, None);
}

#[test]
fn test_two_node_transmission() {
    let mut params = still_params();
    params.disease.transmission_probability = 1.0;
    params.disease.recovery_time = 1_000_000;

    let mut state = chain(&params, 2);
    state.store.node_mut(NodeId(0)).unwrap().infect(0);

    let mut sim = Simulation::with_graph(params, state, SimRng::seeded(12), 0);
    let stats = sim.tick(STEP_MS).unwrap();

    assert_eq!(stats.infected, 2);
    assert_eq!(stats.healthy, 0);
}

#[test]
fn test_vaccination_fires_exactly_once() {
    let mut params = still_params();
    params.hubless.initial_count = 40;
    params.vaccination.start_time = 5000;
    params.vaccination.probability = 0.5;
    let mut sim = Simulation::new(params, 13, 0);

    let mut fired = Vec::new();
    for tick in 1..=30 {
        sim.tick(tick * STEP_MS).unwrap();
        if let Some(count) = sim.last_report().vaccinated {
            fired.push((tick, count));
        }
    }

    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].0, 6);
    assert!(fired[0].1 > 0);
    assert_eq!(fired[0].1, sim.statistics().vaccinated);
    assert_eq!(sim.vaccination().fired_at(), Some(6000));
}

#[test]
fn test_vaccination_latches_with_nobody_eligible() {
    let mut params = still_params();
    params.hubless.initial_count = 1;
    params.disease.recovery_time = 1_000_000;
    params.vaccination.start_time = 2000;
    params.vaccination.probability = 1.0;
    let mut sim = Simulation::new(params, 14, 0);

    let mut fired = Vec::new();
    for tick in 1..=6 {
        sim.tick(tick * STEP_MS).unwrap();
        if let Some(count) = sim.last_report().vaccinated {
            fired.push((tick, count));
        }
    }

    // The only node is patient zero, still infected
    assert_eq!(fired, vec![(3, 0)]);
    assert_eq!(sim.vaccination().fired_at(), Some(3000));
}
