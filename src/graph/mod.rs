pub mod node;
pub mod link;
pub mod graph;

pub use node::{Node, NodeId, NodeKind};
pub use link::{Link, LinkId, LinkKind};
pub use graph::Graph;
