//! Configuration System
//!
//! Loads simulation parameters from a TOML file. Every table and field falls
//! back to its default, so a partial file only overrides what it names.
//!
//! The engine assumes sanitized input; [`SimulationParams::validate`] is the
//! gate callers run before handing parameters over.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::graph::LinkWeights;

/// Default tuning file path
pub const DEFAULT_CONFIG_PATH: &str = "contagion.toml";

/// Complete parameter set for one simulation run.
#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub hubs: HubParams,
    pub hubless: HublessParams,
    pub links: LinkParams,
    pub disease: DiseaseParams,
    pub vaccination: VaccinationParams,
    pub growth: GrowthParams,
    pub render: RenderHints,
    pub run: RunParams,
}

/// Hub topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubParams {
    pub num_hubs: u32,
    pub nodes_per_hub: usize,
    /// Lower bound of hub-mates each member links to.
    pub min_intra_hub_connections: usize,
    /// Width of the random range added on top of the lower bound.
    pub num_intra_hub_connections: usize,
    /// Cap on other-hub links made by a newly grown hub member.
    pub num_inter_hub_connections: usize,
    /// Members drawn from each side when bridging two hubs.
    pub hub_sample_size: usize,
    pub hub_switch_probability: f64,
    /// Share of old-hub links dropped when a node switches hub.
    pub switch_removal_fraction: f64,
}

impl Default for HubParams {
    fn default() -> Self {
        Self {
            num_hubs: 10,
            nodes_per_hub: 30,
            min_intra_hub_connections: 3,
            num_intra_hub_connections: 3,
            num_inter_hub_connections: 3,
            hub_sample_size: 2,
            hub_switch_probability: 0.1,
            switch_removal_fraction: 0.7,
        }
    }
}

/// Hubless population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HublessParams {
    pub initial_count: usize,
    pub min_connections: usize,
    /// Range width at build time; inclusive upper bound for grown nodes.
    pub num_connections: usize,
    pub rewire_probability: f64,
}

impl Default for HublessParams {
    fn default() -> Self {
        Self {
            initial_count: 100,
            min_connections: 5,
            num_connections: 5,
            rewire_probability: 0.1,
        }
    }
}

/// Edge strength/distance constants, passed through to the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkParams {
    pub inter_hub_strength: f64,
    pub intra_hub_strength: f64,
    pub inter_hub_distance: f64,
    pub intra_hub_distance: f64,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            inter_hub_strength: 0.05,
            intra_hub_strength: 0.9,
            inter_hub_distance: 140.0,
            intra_hub_distance: 60.0,
        }
    }
}

impl LinkParams {
    /// High strength, short distance.
    pub fn intra(&self) -> LinkWeights {
        LinkWeights::new(self.intra_hub_strength, self.intra_hub_distance)
    }

    /// Low strength, long distance. Also used for hubless links.
    pub fn inter(&self) -> LinkWeights {
        LinkWeights::new(self.inter_hub_strength, self.inter_hub_distance)
    }
}

/// Epidemiology. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseParams {
    pub transmission_probability: f64,
    pub death_probability: f64,
    pub partial_infection_probability: f64,
    pub recovery_time: u64,
    pub immunity_duration: u64,
}

impl Default for DiseaseParams {
    fn default() -> Self {
        Self {
            transmission_probability: 0.02,
            death_probability: 0.01,
            partial_infection_probability: 0.01,
            recovery_time: 15_000,
            immunity_duration: 30_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaccinationParams {
    pub probability: f64,
    /// Delay (ms) after simulation start before the mass vaccination.
    pub start_time: u64,
}

impl Default for VaccinationParams {
    fn default() -> Self {
        Self {
            probability: 0.3,
            start_time: 100_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthParams {
    /// New nodes per tick.
    pub rate: usize,
    /// Chance a new node joins a hub rather than staying hubless.
    pub hub_probability: f64,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            rate: 3,
            hub_probability: 0.6,
        }
    }
}

/// Display settings for the renderer. Carried, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderHints {
    pub node_radius: f64,
    pub charge_strength: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub alpha: f64,
}

impl Default for RenderHints {
    fn default() -> Self {
        Self {
            node_radius: 6.0,
            charge_strength: -100.0,
            zoom_min: 0.1,
            zoom_max: 4.0,
            alpha: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParams {
    /// Wall-clock cadence between ticks.
    pub tick_interval_ms: u64,
    /// Statistics history entries kept.
    pub history_limit: usize,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            history_limit: 100,
        }
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid parameter `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SimulationParams {
    /// Loads parameters from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parses parameters from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks ranges the engine takes for granted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("hubs.hub_switch_probability", self.hubs.hub_switch_probability),
            ("hubs.switch_removal_fraction", self.hubs.switch_removal_fraction),
            ("hubless.rewire_probability", self.hubless.rewire_probability),
            ("disease.transmission_probability", self.disease.transmission_probability),
            ("disease.death_probability", self.disease.death_probability),
            (
                "disease.partial_infection_probability",
                self.disease.partial_infection_probability,
            ),
            ("vaccination.probability", self.vaccination.probability),
            ("growth.hub_probability", self.growth.hub_probability),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{} is outside [0, 1]", value),
                });
            }
        }

        let weights = [
            ("links.inter_hub_strength", self.links.inter_hub_strength),
            ("links.intra_hub_strength", self.links.intra_hub_strength),
            ("links.inter_hub_distance", self.links.inter_hub_distance),
            ("links.intra_hub_distance", self.links.intra_hub_distance),
        ];
        for (field, value) in weights {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be finite".to_string(),
                });
            }
        }

        if self.hubless.num_connections < self.hubless.min_connections {
            return Err(ConfigError::Invalid {
                field: "hubless.num_connections",
                reason: format!(
                    "upper bound {} is below min_connections {}",
                    self.hubless.num_connections, self.hubless.min_connections
                ),
            });
        }

        if self.run.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "run.tick_interval_ms",
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Contagion network simulation parameters
# Durations are in milliseconds of simulated wall-clock time.

[hubs]
num_hubs = 10
nodes_per_hub = 30
min_intra_hub_connections = 3
num_intra_hub_connections = 3
num_inter_hub_connections = 3
hub_sample_size = 2
hub_switch_probability = 0.1
switch_removal_fraction = 0.7

[hubless]
initial_count = 100
min_connections = 5
num_connections = 5
rewire_probability = 0.1

[links]
inter_hub_strength = 0.05
intra_hub_strength = 0.9
inter_hub_distance = 140.0
intra_hub_distance = 60.0

[disease]
transmission_probability = 0.02
death_probability = 0.01
partial_infection_probability = 0.01
recovery_time = 15000
immunity_duration = 30000

[vaccination]
probability = 0.3
start_time = 100000

[growth]
rate = 3
hub_probability = 0.6

[render]
node_radius = 6.0
charge_strength = -100.0
zoom_min = 0.1
zoom_max = 4.0
alpha = 0.5

[run]
tick_interval_ms = 1000
history_limit = 100
"#
    .to_string()
}
