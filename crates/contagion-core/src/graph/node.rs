//! Node
//!
//! An individual in the contact network and its health bookkeeping.

use contagion_events::{HubId, NodeId, NodeSnapshot, NodeStatus};

/// An individual.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub status: NodeStatus,
    pub infected_at: Option<u64>,
    pub recovered_at: Option<u64>,
    pub vaccinated_at: Option<u64>,
    /// False only once the node has died.
    pub alive: bool,
    /// Community assignment; `None` for hubless nodes.
    pub current_hub: Option<HubId>,
    /// Time of the last hub reassignment (creation time until then).
    pub last_switch_time: u64,
}

impl Node {
    /// Creates a healthy node.
    pub fn new(id: NodeId, hub: Option<HubId>, now: u64) -> Self {
        Self {
            id,
            status: NodeStatus::Healthy,
            infected_at: None,
            recovered_at: None,
            vaccinated_at: None,
            alive: true,
            current_hub: hub,
            last_switch_time: now,
        }
    }

    pub fn is_hubless(&self) -> bool {
        self.current_hub.is_none()
    }

    pub fn is_infected(&self) -> bool {
        self.status == NodeStatus::Infected
    }

    /// Also drops any immunity timestamps left by a breakthrough infection.
    pub fn infect(&mut self, now: u64) {
        self.transition(NodeStatus::Infected);
        self.infected_at = Some(now);
        self.recovered_at = None;
        self.vaccinated_at = None;
    }

    pub fn recover(&mut self, now: u64) {
        self.transition(NodeStatus::Recovered);
        self.recovered_at = Some(now);
    }

    pub fn vaccinate(&mut self, now: u64) {
        self.transition(NodeStatus::Vaccinated);
        self.vaccinated_at = Some(now);
    }

    /// Drops temporary immunity: Recovered or Vaccinated back to Healthy.
    pub fn lose_immunity(&mut self) {
        match self.status {
            NodeStatus::Recovered => self.recovered_at = None,
            NodeStatus::Vaccinated => self.vaccinated_at = None,
            _ => return,
        }
        self.transition(NodeStatus::Healthy);
    }

    pub fn die(&mut self) {
        self.transition(NodeStatus::Dead);
        self.alive = false;
    }

    /// Milliseconds spent in the timed status that `stamp` marks, if set.
    pub fn elapsed_since(stamp: Option<u64>, now: u64) -> Option<u64> {
        stamp.map(|t| now.saturating_sub(t))
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            id: self.id,
            status: self.status,
            infected_at: self.infected_at,
            recovered_at: self.recovered_at,
            vaccinated_at: self.vaccinated_at,
            alive: self.alive,
            current_hub: self.current_hub,
            last_switch_time: self.last_switch_time,
        }
    }

    fn transition(&mut self, next: NodeStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal transition {} -> {} for {}",
            self.status,
            next,
            self.id
        );
        self.status = next;
    }
}
