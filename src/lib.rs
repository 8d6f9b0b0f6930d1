pub mod error;
pub mod math;
pub mod activation;
pub mod graph;
pub mod network;
pub mod optim;
pub mod loss;
pub mod train;

// Convenience re-exports
pub use error::{NeuroError, Result};
pub use math::random::Uniform;
pub use activation::activation::ActivationFunction;
pub use graph::{Graph, Link, LinkKind, Node, NodeKind};
pub use network::{
    AdalineNetwork, FlatReader, FlatWriter, LayeredNetwork, NetworkKind, NetworkBlueprint, NeuralNetwork,
    SelfOrganizingNetwork, SomConfig, Supervised, UpdateRule,
};
pub use optim::rprop::RpropConfig;
pub use loss::mse::MseLoss;
pub use train::{train_loop, train_network, TrainConfig};
