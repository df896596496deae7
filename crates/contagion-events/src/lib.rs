//! Shared data types for the contagion network simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine produces them; renderers and chart front-ends consume them.

pub mod ids;
pub mod snapshot;
pub mod stats;
pub mod status;

pub use ids::{HubId, NodeId};
pub use snapshot::{EdgeSnapshot, GraphSnapshot, NodeSnapshot};
pub use stats::{HistoryEntry, StatusCounts, TickStatistics};
pub use status::{NodeStatus, ParseStatusError};
