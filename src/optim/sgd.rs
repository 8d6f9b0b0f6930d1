/// Gradient descent with momentum, as carried by a back-propagation node.
///
/// Learning rate and momentum live on the destination node of a link, so a
/// fresh `Sgd` is taken from that node for every update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64, momentum: f64) -> Sgd {
        Sgd { learning_rate, momentum }
    }

    /// Raw per-sample weight change: `learning_rate * error * source_value`.
    pub fn delta(&self, error: f64, source_value: f64) -> f64 {
        self.learning_rate * error * source_value
    }

    /// Applies `delta` plus the momentum share of the previous delta, then
    /// remembers `delta` (without momentum) for the next step.
    pub fn step(&self, weight: &mut f64, delta: f64, previous: &mut f64) {
        *weight += delta + self.momentum * *previous;
        *previous = delta;
    }

    /// Applies the mean of `accumulator` over `samples` as a single step and
    /// clears the accumulator. Nothing happens for an empty epoch.
    pub fn batch_step(&self, weight: &mut f64, accumulator: &mut f64, previous: &mut f64, samples: usize) {
        if samples == 0 {
            return;
        }
        let delta = *accumulator / samples as f64;
        self.step(weight, delta, previous);
        *accumulator = 0.0;
    }
}
