//! Epidemic simulation over an evolving contact network.
//!
//! A population split into hub communities plus loosely attached hubless
//! members catches, spreads and recovers from a disease while the network
//! itself grows and rewires every tick.
//!
//! # Modules
//!
//! - [`config`]: TOML parameters and their validation
//! - [`rng`]: the random source every stage draws from
//! - [`graph`]: node and edge arena with the per-run counters and history
//! - [`builder`]: initial topology
//! - [`epidemic`]: health transitions and transmission
//! - [`topology`]: hubless rewiring and hub switching
//! - [`growth`]: new members joining each tick
//! - [`immunization`]: the one-time mass vaccination
//! - [`simulation`]: the tick pipeline and its public API
//! - [`pacing`]: virtual and wall-clock tick runners
//! - [`output`]: JSON files written at the end of a run
//! - [`logging`]: `tracing` subscriber setup for the binary

pub mod builder;
pub mod config;
pub mod epidemic;
pub mod graph;
pub mod growth;
pub mod immunization;
pub mod logging;
pub mod output;
pub mod pacing;
pub mod rng;
pub mod simulation;
pub mod topology;

pub use config::{ConfigError, SimulationParams};
pub use graph::{GraphState, GraphStore};
pub use rng::{RandomSource, SimRng};
pub use simulation::{Simulation, SimulationClock, TickReport};
