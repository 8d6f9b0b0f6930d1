pub mod random;
pub mod rounding;

pub use random::Uniform;
pub use rounding::round_away_from_zero;
