use crate::{
    error::{NeuroError, Result},
    loss::mse::MseLoss,
    network::network::{NeuralNetwork, Supervised},
};

/// One pass over the samples in order: forward, learn, and an epoch boundary
/// every `batch_size` samples (`0` = only at the end). Returns the mean MSE
/// measured before each update.
pub fn train_network<N: Supervised + ?Sized>(
    network: &mut N,
    inputs: &[Vec<f64>],
    expected_outputs: &[Vec<f64>],
    batch_size: usize,
) -> Result<f64> {
    let order: Vec<usize> = (0..inputs.len()).collect();
    train_pass(network, inputs, expected_outputs, &order, batch_size)
}

pub(crate) fn train_pass<N: Supervised + ?Sized>(
    network: &mut N,
    inputs: &[Vec<f64>],
    expected_outputs: &[Vec<f64>],
    order: &[usize],
    batch_size: usize,
) -> Result<f64> {
    check_pairs(inputs, expected_outputs)?;
    if order.is_empty() {
        return Ok(0.0);
    }

    let mut total_loss = 0.0;
    let mut pending = 0;
    for &idx in order {
        // Forward pass
        let output = network.forward(&inputs[idx])?;
        total_loss += MseLoss::loss(&output, &expected_outputs[idx]);

        // Error signals and link deltas
        network.learn(&expected_outputs[idx])?;
        pending += 1;

        if pending == batch_size {
            network.epoch(pending);
            pending = 0;
        }
    }
    if pending > 0 {
        network.epoch(pending);
    }

    Ok(total_loss / order.len() as f64)
}

/// Index of the first `1.0` in a one-hot target.
pub fn pattern_index(target: &[f64]) -> Option<usize> {
    target.iter().position(|&t| t == 1.0)
}

/// Fraction of samples whose best output node is the target's pattern index.
pub fn accuracy<N: NeuralNetwork + ?Sized>(
    network: &mut N,
    inputs: &[Vec<f64>],
    expected_outputs: &[Vec<f64>],
) -> Result<f64> {
    check_pairs(inputs, expected_outputs)?;
    if inputs.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0;
    for (input, expected) in inputs.iter().zip(expected_outputs) {
        network.run(input)?;
        if let Some(best) = network.best_output_index() {
            if pattern_index(expected) == Some(best) {
                correct += 1;
            }
        }
    }
    Ok(correct as f64 / inputs.len() as f64)
}

fn check_pairs(inputs: &[Vec<f64>], expected_outputs: &[Vec<f64>]) -> Result<()> {
    if inputs.len() != expected_outputs.len() {
        return Err(NeuroError::LengthMismatch {
            what: "sample set",
            expected: inputs.len(),
            found: expected_outputs.len(),
        });
    }
    Ok(())
}
