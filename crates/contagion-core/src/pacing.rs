//! Tick pacing: a virtual clock for batch runs and a wall-clock interval
//! for live runs.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::MissedTickBehavior;

use contagion_events::TickStatistics;

use crate::simulation::Simulation;

/// Why a paced run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Completed,
    Interrupted,
}

/// Milliseconds since the Unix epoch.
pub fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Runs `ticks` ticks back to back, advancing a virtual clock by `step_ms`
/// from the simulation's start time.
pub fn run_virtual<F>(sim: &mut Simulation, step_ms: u64, ticks: u64, mut on_tick: F)
where
    F: FnMut(&Simulation, &TickStatistics),
{
    let mut now = sim.clock().now;
    for _ in 0..ticks {
        now += step_ms;
        if let Some(stats) = sim.tick(now) {
            on_tick(sim, &stats);
        }
    }
}

/// Ticks once per `interval` of wall time until `max_ticks` ticks have run
/// or Ctrl-C arrives. A tick in progress always completes.
///
/// `clock` supplies the timestamp handed to each tick. Paused ticks do not
/// count towards `max_ticks`.
pub async fn run_paced<C, F>(
    sim: &mut Simulation,
    interval: Duration,
    max_ticks: u64,
    mut clock: C,
    mut on_tick: F,
) -> StopReason
where
    C: FnMut() -> u64,
    F: FnMut(&Simulation, &TickStatistics),
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick of an interval completes immediately
    ticker.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut completed = 0;
    while completed < max_ticks {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(completed, "interrupted, stopping between ticks");
                return StopReason::Interrupted;
            }
            _ = ticker.tick() => {
                if let Some(stats) = sim.tick(clock()) {
                    completed += 1;
                    on_tick(sim, &stats);
                }
            }
        }
    }
    StopReason::Completed
}
