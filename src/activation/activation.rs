use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Transfer functions applied by feed-forward nodes to their weighted input sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    /// Pass-through; the base behavior of a node with no transfer of its own.
    Identity,
    /// Logistic sigmoid, used by every back-propagation node.
    Sigmoid,
    /// Hard limiter used by the Adaline output: `-1` below zero, `1` otherwise.
    Sign,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Identity => x,
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Sign => if x < 0.0 { -1.0 } else { 1.0 },
        }
    }

    /// Derivative expressed in terms of the node's output `y = f(x)`.
    ///
    /// Back-propagation only ever has the post-activation value at hand, so the
    /// sigmoid case is the familiar `y * (1 - y)`. The sign limiter is not
    /// differentiable; Adaline trains on the raw sum instead and gets `1.0`.
    pub fn derivative_from_output(&self, y: f64) -> f64 {
        match self {
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Sigmoid => y * (1.0 - y),
            ActivationFunction::Sign => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ActivationFunction;

    #[test]
    fn sigmoid_is_centered_at_half() {
        assert_eq!(ActivationFunction::Sigmoid.function(0.0), 0.5);
        assert!(ActivationFunction::Sigmoid.function(10.0) > 0.99);
        assert!(ActivationFunction::Sigmoid.function(-10.0) < 0.01);
    }

    #[test]
    fn sign_treats_zero_as_positive() {
        assert_eq!(ActivationFunction::Sign.function(-0.1), -1.0);
        assert_eq!(ActivationFunction::Sign.function(0.0), 1.0);
        assert_eq!(ActivationFunction::Sign.function(3.0), 1.0);
    }

    #[test]
    fn sigmoid_derivative_uses_output() {
        assert_eq!(ActivationFunction::Sigmoid.derivative_from_output(0.5), 0.25);
        assert_eq!(ActivationFunction::Identity.derivative_from_output(0.7), 1.0);
    }
}
