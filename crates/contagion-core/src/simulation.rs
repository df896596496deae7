//! Simulation Driver
//!
//! Owns the graph and runs the tick pipeline:
//! growth → epidemic → topology → vaccination → statistics.
//!
//! Each stage is a system in a chained, single-threaded `bevy_ecs` schedule,
//! so every stage sees the mutations of the one before it and nothing can
//! observe the graph mid-tick.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;

use contagion_events::{GraphSnapshot, TickStatistics};

use crate::builder::build_network;
use crate::config::SimulationParams;
use crate::epidemic::{spread_infection, EpidemicOutcome};
use crate::graph::GraphState;
use crate::growth::{grow_community, GrowthOutcome};
use crate::immunization::VaccinationCampaign;
use crate::rng::SimRng;
use crate::topology::{rewire_topology, TopologyOutcome};

/// Simulation start time and the timestamp of the tick in progress (ms).
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationClock {
    pub start: u64,
    pub now: u64,
}

impl SimulationClock {
    pub fn elapsed(&self) -> u64 {
        self.now.saturating_sub(self.start)
    }
}

/// Per-stage results of the most recent tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct TickReport {
    pub growth: GrowthOutcome,
    pub epidemic: EpidemicOutcome,
    pub topology: TopologyOutcome,
    /// Set on the one tick the mass vaccination fires.
    pub vaccinated: Option<usize>,
    pub statistics: TickStatistics,
}

/// System: add new members
pub fn growth_system(
    mut state: ResMut<GraphState>,
    params: Res<SimulationParams>,
    mut rng: ResMut<SimRng>,
    clock: Res<SimulationClock>,
    mut report: ResMut<TickReport>,
) {
    report.growth = grow_community(&mut state, &params, &mut rng.0, clock.now);
}

/// System: health transitions, transmission and removal of the dead
pub fn epidemic_system(
    mut state: ResMut<GraphState>,
    params: Res<SimulationParams>,
    mut rng: ResMut<SimRng>,
    clock: Res<SimulationClock>,
    mut report: ResMut<TickReport>,
) {
    report.epidemic = spread_infection(&mut state, &params.disease, &mut rng.0, clock.now);
}

/// System: hubless rewiring and hub switching
pub fn topology_system(
    mut state: ResMut<GraphState>,
    params: Res<SimulationParams>,
    mut rng: ResMut<SimRng>,
    clock: Res<SimulationClock>,
    mut report: ResMut<TickReport>,
) {
    report.topology = rewire_topology(
        &mut state,
        &params.hubs,
        &params.hubless,
        &params.links,
        &mut rng.0,
        clock.now,
    );
}

/// System: one-time mass vaccination
pub fn vaccination_system(
    mut state: ResMut<GraphState>,
    params: Res<SimulationParams>,
    mut rng: ResMut<SimRng>,
    clock: Res<SimulationClock>,
    mut campaign: ResMut<VaccinationCampaign>,
    mut report: ResMut<TickReport>,
) {
    report.vaccinated = campaign.maybe_vaccinate(
        &mut state,
        &params.vaccination,
        clock.start,
        &mut rng.0,
        clock.now,
    );
}

/// System: append this tick's counts to the history
pub fn statistics_system(mut state: ResMut<GraphState>, mut report: ResMut<TickReport>) {
    state.record_history();
    report.statistics = state.statistics();

    tracing::debug!(
        day = state.day,
        nodes = state.store.node_count(),
        edges = state.store.edge_count(),
        grown = report.growth.nodes_added(),
        infections = report.epidemic.infections + report.epidemic.breakthroughs,
        recoveries = report.epidemic.recoveries,
        deaths = report.epidemic.deaths.len(),
        rewires = report.topology.hubless_rewires,
        switches = report.topology.hub_switches,
        "tick complete"
    );
}

fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            growth_system,
            epidemic_system,
            topology_system,
            vaccination_system,
            statistics_system,
        )
            .chain(),
    );
    schedule
}

/// The engine-facing API consumed by the UI layer.
pub struct Simulation {
    world: World,
    schedule: Schedule,
    paused: bool,
    pending_params: Option<SimulationParams>,
}

impl Simulation {
    /// Builds a network from `params` with a seeded generator.
    pub fn new(params: SimulationParams, seed: u64, now: u64) -> Self {
        Self::with_rng(params, SimRng::seeded(seed), now)
    }

    pub fn with_rng(params: SimulationParams, rng: SimRng, now: u64) -> Self {
        let mut sim = Self::empty(rng);
        sim.initialize(params, now);
        sim
    }

    /// Starts from a prepared graph instead of building one.
    pub fn with_graph(params: SimulationParams, state: GraphState, rng: SimRng, now: u64) -> Self {
        let mut sim = Self::empty(rng);
        sim.install(params, state, now);
        sim
    }

    fn empty(rng: SimRng) -> Self {
        let mut world = World::new();
        world.insert_resource(rng);
        Self {
            world,
            schedule: build_schedule(),
            paused: false,
            pending_params: None,
        }
    }

    /// Rebuilds the topology from scratch and resets every counter, the
    /// history, the vaccination latch and the start time.
    pub fn initialize(&mut self, params: SimulationParams, now: u64) {
        let state = self
            .world
            .resource_scope(|_, mut rng: Mut<SimRng>| build_network(&params, &mut rng.0, now));
        self.install(params, state, now);
    }

    fn install(&mut self, params: SimulationParams, state: GraphState, now: u64) {
        self.world.insert_resource(params);
        self.world.insert_resource(state);
        self.world.insert_resource(VaccinationCampaign::new());
        self.world.insert_resource(SimulationClock { start: now, now });
        self.world.insert_resource(TickReport::default());
        self.pending_params = None;
    }

    /// Advances one tick. Returns `None` while paused.
    pub fn tick(&mut self, now: u64) -> Option<TickStatistics> {
        if self.paused {
            return None;
        }

        if let Some(params) = self.pending_params.take() {
            self.world
                .resource_mut::<GraphState>()
                .set_history_limit(params.run.history_limit);
            self.world.insert_resource(params);
        }

        self.world.resource_mut::<SimulationClock>().now = now;
        self.world.resource_mut::<GraphState>().day += 1;
        self.world.insert_resource(TickReport::default());

        self.schedule.run(&mut self.world);

        Some(self.world.resource::<TickReport>().statistics.clone())
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Queues parameters to take effect at the start of the next tick.
    ///
    /// Structural parameters (hub counts, initial population) only matter
    /// at build time; call [`Simulation::initialize`] to apply those.
    pub fn update_params(&mut self, params: SimulationParams) {
        self.pending_params = Some(params);
    }

    pub fn params(&self) -> &SimulationParams {
        self.world.resource::<SimulationParams>()
    }

    pub fn state(&self) -> &GraphState {
        self.world.resource::<GraphState>()
    }

    pub fn clock(&self) -> SimulationClock {
        *self.world.resource::<SimulationClock>()
    }

    pub fn day(&self) -> u64 {
        self.state().day
    }

    pub fn last_report(&self) -> &TickReport {
        self.world.resource::<TickReport>()
    }

    pub fn vaccination(&self) -> &VaccinationCampaign {
        self.world.resource::<VaccinationCampaign>()
    }

    pub fn statistics(&self) -> TickStatistics {
        self.state().statistics()
    }

    /// Consistent copy of the graph for renderers.
    pub fn snapshot(&self) -> GraphSnapshot {
        self.state().snapshot(self.clock().now)
    }
}
