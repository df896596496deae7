//! Graph Storage
//!
//! Nodes and edges live in id-keyed tables; edges refer to nodes by
//! [`NodeId`](contagion_events::NodeId) only, never by reference.

pub mod edge;
pub mod node;
pub mod state;
pub mod store;

pub use edge::{Edge, EdgeId, LinkWeights};
pub use node::Node;
pub use state::GraphState;
pub use store::GraphStore;
