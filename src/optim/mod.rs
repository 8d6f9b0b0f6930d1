pub mod sgd;
pub mod rprop;

pub use sgd::Sgd;
pub use rprop::{RpropConfig, ResilientState};
