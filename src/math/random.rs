use rand::prelude::*;
use rand::rngs::StdRng;

/// Uniform sampler used for initial link weights.
///
/// `Uniform::new()` draws its seed from the OS; `Uniform::seeded()` gives a
/// reproducible stream, which is what the tests use.
#[derive(Debug, Clone)]
pub struct Uniform {
    rng: StdRng,
}

impl Uniform {
    pub fn new() -> Uniform {
        Uniform { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Uniform {
        Uniform { rng: StdRng::seed_from_u64(seed) }
    }

    /// Samples a value in `[min, max)`.
    ///
    /// Swapped bounds are normalized rather than rejected, and a degenerate
    /// range (`min == max`) returns that single value without consuming
    /// randomness.
    pub fn sample(&mut self, min: f64, max: f64) -> f64 {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        if min == max {
            return max;
        }
        self.rng.gen::<f64>() * (max - min) + min
    }
}

impl Default for Uniform {
    fn default() -> Self {
        Uniform::new()
    }
}
