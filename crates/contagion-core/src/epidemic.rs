//! Epidemic Engine
//!
//! Per-tick health transitions: death or recovery of infected nodes, waning
//! immunity, then one transmission trial per edge, then removal of the dead.

use std::collections::HashMap;

use contagion_events::{NodeId, NodeStatus};

use crate::config::DiseaseParams;
use crate::graph::{GraphState, Node};
use crate::rng::RandomSource;

/// What one epidemic step changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpidemicOutcome {
    pub infections: usize,
    pub breakthroughs: usize,
    pub recoveries: usize,
    pub waned: usize,
    /// Nodes that died and were removed this tick.
    pub deaths: Vec<NodeId>,
    pub edges_removed: usize,
}

/// Advances every node's health status by one tick.
pub fn spread_infection<R: RandomSource>(
    state: &mut GraphState,
    disease: &DiseaseParams,
    rng: &mut R,
    now: u64,
) -> EpidemicOutcome {
    let mut outcome = EpidemicOutcome::default();

    progress_nodes(state, disease, rng, now, &mut outcome);
    transmit_along_edges(state, disease, rng, now, &mut outcome);

    for &dead in &outcome.deaths {
        if let Some((_, edges)) = state.store.remove_node(dead) {
            outcome.edges_removed += edges.len();
        }
    }

    outcome
}

/// Node pass: independent of edges.
fn progress_nodes<R: RandomSource>(
    state: &mut GraphState,
    disease: &DiseaseParams,
    rng: &mut R,
    now: u64,
    outcome: &mut EpidemicOutcome,
) {
    for node in state.store.nodes_mut() {
        match node.status {
            NodeStatus::Infected => {
                // Death is checked first and takes priority over recovery
                if rng.chance(disease.death_probability) {
                    node.die();
                    outcome.deaths.push(node.id);
                } else if Node::elapsed_since(node.infected_at, now)
                    .map_or(false, |t| t > disease.recovery_time)
                {
                    node.recover(now);
                    outcome.recoveries += 1;
                }
            }
            NodeStatus::Recovered => {
                if Node::elapsed_since(node.recovered_at, now)
                    .map_or(false, |t| t > disease.immunity_duration)
                {
                    node.lose_immunity();
                    outcome.waned += 1;
                }
            }
            NodeStatus::Vaccinated => {
                if Node::elapsed_since(node.vaccinated_at, now)
                    .map_or(false, |t| t > disease.immunity_duration)
                {
                    node.lose_immunity();
                    outcome.waned += 1;
                }
            }
            NodeStatus::Healthy | NodeStatus::Dead => {}
        }
    }
    state.death_count += outcome.deaths.len() as u64;
}

/// Edge pass: one trial per edge. Infectiousness is judged on the statuses
/// left by the node pass, so a node infected during this pass does not
/// spread further until the next tick.
fn transmit_along_edges<R: RandomSource>(
    state: &mut GraphState,
    disease: &DiseaseParams,
    rng: &mut R,
    now: u64,
    outcome: &mut EpidemicOutcome,
) {
    let infectious: HashMap<NodeId, bool> = state
        .store
        .nodes()
        .map(|n| (n.id, n.is_infected()))
        .collect();
    let endpoints: Vec<(NodeId, NodeId)> = state
        .store
        .edges()
        .map(|e| (e.source, e.target))
        .collect();

    for (source, target) in endpoints {
        let source_infectious = infectious.get(&source).copied().unwrap_or(false);
        let target_infectious = infectious.get(&target).copied().unwrap_or(false);

        let exposed = match (source_infectious, target_infectious) {
            (true, false) => target,
            (false, true) => source,
            _ => continue,
        };
        let Some(node) = state.store.node_mut(exposed) else {
            continue;
        };

        match node.status {
            NodeStatus::Healthy => {
                if rng.chance(disease.transmission_probability) {
                    node.infect(now);
                    outcome.infections += 1;
                }
            }
            NodeStatus::Recovered | NodeStatus::Vaccinated => {
                if rng.chance(disease.partial_infection_probability) {
                    node.infect(now);
                    outcome.breakthroughs += 1;
                }
            }
            // Already infected by another edge this tick, or dead
            NodeStatus::Infected | NodeStatus::Dead => {}
        }
    }
}
