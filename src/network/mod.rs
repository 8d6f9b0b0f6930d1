pub mod kind;
pub mod flat;
pub mod network;
pub mod adaline;
pub mod layered;
pub mod som;
pub mod blueprint;

pub use kind::NetworkKind;
pub use flat::{FlatReader, FlatWriter};
pub use network::{NeuralNetwork, Supervised};
pub use adaline::AdalineNetwork;
pub use layered::{LayeredNetwork, UpdateRule};
pub use som::{SelfOrganizingNetwork, SomConfig};
pub use blueprint::NetworkBlueprint;
