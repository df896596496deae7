//! Health status of a node and the legal transitions between statuses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Epidemiological status of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Healthy,
    Infected,
    Recovered,
    Vaccinated,
    /// Transient: a dead node is removed from the graph in the same tick.
    Dead,
}

impl NodeStatus {
    /// All statuses, in display order.
    pub const ALL: [NodeStatus; 5] = [
        NodeStatus::Healthy,
        NodeStatus::Infected,
        NodeStatus::Recovered,
        NodeStatus::Vaccinated,
        NodeStatus::Dead,
    ];

    /// Returns true if moving from `self` to `next` is a legal transition.
    ///
    /// Staying in the same status is not a transition and is always allowed.
    pub fn can_transition_to(self, next: NodeStatus) -> bool {
        use NodeStatus::*;

        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Healthy, Infected)
                | (Healthy, Vaccinated)
                | (Infected, Recovered)
                | (Infected, Dead)
                | (Recovered, Infected)
                | (Recovered, Healthy)
                | (Vaccinated, Infected)
                | (Vaccinated, Healthy)
        )
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeStatus::Healthy => "healthy",
            NodeStatus::Infected => "infected",
            NodeStatus::Recovered => "recovered",
            NodeStatus::Vaccinated => "vaccinated",
            NodeStatus::Dead => "dead",
        };
        f.write_str(name)
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown node status: '{}'", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for NodeStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "healthy" => Ok(NodeStatus::Healthy),
            "infected" => Ok(NodeStatus::Infected),
            "recovered" => Ok(NodeStatus::Recovered),
            "vaccinated" => Ok(NodeStatus::Vaccinated),
            "dead" => Ok(NodeStatus::Dead),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}
