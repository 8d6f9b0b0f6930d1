use serde::{Serialize, Deserialize};

/// Resilient back-propagation constants shared by every link of a network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpropConfig {
    /// Step growth factor after two same-sign gradients (> 1).
    pub eta_plus: f64,
    /// Step shrink factor after a sign flip (< 1).
    pub eta_minus: f64,
    pub initial_eta: f64,
    pub max_eta: f64,
    pub min_eta: f64,
    /// Weight decay coefficient.
    pub decay: f64,
}

impl Default for RpropConfig {
    fn default() -> Self {
        RpropConfig {
            eta_plus: 1.2,
            eta_minus: 0.5,
            initial_eta: 0.05,
            max_eta: 50.0,
            min_eta: 1.0e-6,
            decay: 0.0,
        }
    }
}

/// Per-link RPROP state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResilientState {
    /// Gradient applied at the previous epoch; zero after a sign flip.
    pub delta: f64,
    /// Sum of per-sample deltas since the last epoch.
    pub accumulator: f64,
    /// Current adaptive step size.
    pub eta: f64,
}

impl ResilientState {
    pub fn new(config: &RpropConfig) -> ResilientState {
        ResilientState {
            delta: 0.0,
            accumulator: 0.0,
            eta: config.initial_eta,
        }
    }
}

impl RpropConfig {
    /// Runs one epoch boundary for a single link.
    ///
    /// Only the sign of the epoch-averaged gradient moves the weight; its
    /// magnitude is ignored. A sign flip shrinks the step and skips the move.
    pub fn step(&self, weight: &mut f64, state: &mut ResilientState, samples: usize) {
        if samples == 0 {
            return;
        }
        let gradient = -state.accumulator / samples as f64;
        let product = state.delta * gradient;
        let decayed = gradient - self.decay * *weight;

        if product >= 0.0 {
            if product > 0.0 {
                state.eta = (state.eta * self.eta_plus).min(self.max_eta);
            }
            *weight -= sign(gradient) * state.eta + self.decay * *weight;
            state.delta = decayed;
        } else {
            state.eta = (state.eta * self.eta_minus).max(self.min_eta);
            state.delta = 0.0;
        }
        state.accumulator = 0.0;
    }
}

// f64::signum maps 0.0 to 1.0; a zero gradient must not move the weight.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
