//! Immunization Scheduler
//!
//! One-time mass vaccination once enough time has passed since the
//! simulation started.

use bevy_ecs::prelude::*;

use contagion_events::NodeStatus;

use crate::config::VaccinationParams;
use crate::graph::GraphState;
use crate::rng::RandomSource;

/// Latch for the single mass-vaccination event of a run.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct VaccinationCampaign {
    fired_at: Option<u64>,
}

impl VaccinationCampaign {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fired(&self) -> bool {
        self.fired_at.is_some()
    }

    /// Time the campaign ran, if it has.
    pub fn fired_at(&self) -> Option<u64> {
        self.fired_at
    }

    /// Vaccinates each healthy node with `params.probability` the first time
    /// `now - simulation_start` exceeds `params.start_time`.
    ///
    /// Returns the number of nodes vaccinated on the tick it fires, `None`
    /// on every other tick.
    pub fn maybe_vaccinate<R: RandomSource>(
        &mut self,
        state: &mut GraphState,
        params: &VaccinationParams,
        simulation_start: u64,
        rng: &mut R,
        now: u64,
    ) -> Option<usize> {
        if self.has_fired() || now.saturating_sub(simulation_start) <= params.start_time {
            return None;
        }
        self.fired_at = Some(now);

        let mut vaccinated = 0;
        for node in state.store.nodes_mut() {
            if node.status == NodeStatus::Healthy && rng.chance(params.probability) {
                node.vaccinate(now);
                vaccinated += 1;
            }
        }

        tracing::info!(vaccinated, day = state.day, "mass vaccination");
        Some(vaccinated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contagion_events::NodeId;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn population(n: usize) -> GraphState {
        let mut state = GraphState::default();
        for _ in 0..n {
            state.spawn_node(None, 0);
        }
        state
    }

    fn params(probability: f64) -> VaccinationParams {
        VaccinationParams {
            probability,
            start_time: 1000,
        }
    }

    #[test]
    fn test_waits_for_start_time() {
        let mut state = population(5);
        let mut campaign = VaccinationCampaign::new();
        let mut rng = SmallRng::seed_from_u64(1);

        assert_eq!(campaign.maybe_vaccinate(&mut state, &params(1.0), 500, &mut rng, 1500), None);
        assert!(!campaign.has_fired());

        assert_eq!(campaign.maybe_vaccinate(&mut state, &params(1.0), 500, &mut rng, 1501), Some(5));
        assert_eq!(campaign.fired_at(), Some(1501));
        assert_eq!(state.counts().vaccinated, 5);
    }

    #[test]
    fn test_fires_only_once() {
        let mut state = population(4);
        let mut campaign = VaccinationCampaign::new();
        let mut rng = SmallRng::seed_from_u64(2);

        assert!(campaign.maybe_vaccinate(&mut state, &params(0.0), 0, &mut rng, 2000).is_some());
        assert_eq!(state.counts().vaccinated, 0);

        for now in 2001..2010 {
            assert!(campaign.maybe_vaccinate(&mut state, &params(1.0), 0, &mut rng, now).is_none());
        }
        assert_eq!(state.counts().vaccinated, 0);
    }

    #[test]
    fn test_only_healthy_nodes_are_vaccinated() {
        let mut state = population(3);
        state.store.node_mut(NodeId(0)).unwrap().infect(0);
        {
            let node = state.store.node_mut(NodeId(1)).unwrap();
            node.infect(0);
            node.recover(10);
        }
        let mut campaign = VaccinationCampaign::new();
        let mut rng = SmallRng::seed_from_u64(3);

        let vaccinated = campaign.maybe_vaccinate(&mut state, &params(1.0), 0, &mut rng, 5000);

        assert_eq!(vaccinated, Some(1));
        let node = state.store.node(NodeId(2)).unwrap();
        assert_eq!(node.status, NodeStatus::Vaccinated);
        assert_eq!(node.vaccinated_at, Some(5000));
        assert_eq!(state.store.node(NodeId(0)).unwrap().status, NodeStatus::Infected);
        assert_eq!(state.store.node(NodeId(1)).unwrap().status, NodeStatus::Recovered);
    }

    #[test]
    fn test_vaccination_rate_within_tolerance() {
        let mut state = population(5000);
        let mut campaign = VaccinationCampaign::new();
        let mut rng = SmallRng::seed_from_u64(4);

        let vaccinated = campaign
            .maybe_vaccinate(&mut state, &params(0.3), 0, &mut rng, 1001)
            .unwrap();
        let rate = vaccinated as f64 / 5000.0;
        assert!((rate - 0.3).abs() < 0.03, "observed rate {}", rate);
    }
}
