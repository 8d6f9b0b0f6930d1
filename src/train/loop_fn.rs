use std::sync::atomic::Ordering;
use std::time::Instant;

use log::info;
use rand::seq::SliceRandom;

use crate::error::Result;
use crate::network::network::Supervised;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;
use crate::train::trainer::{accuracy, train_pass};

/// Trains `network` for `config.epochs` passes and returns the mean training
/// loss of the **last completed pass**.
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
pub fn train_loop<N: Supervised + ?Sized>(
    network: &mut N,
    inputs: &[Vec<f64>],
    expected_outputs: &[Vec<f64>],
    config: &TrainConfig,
) -> Result<f64> {
    let mut last_train_loss = 0.0;
    let mut order: Vec<usize> = (0..inputs.len()).collect();

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            break;
        }

        let t_start = Instant::now();

        if config.shuffle {
            order.shuffle(&mut rand::thread_rng());
        }
        let train_loss = train_pass(network, inputs, expected_outputs, &order, config.batch_size)?;
        last_train_loss = train_loss;

        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        let train_accuracy = if config.track_accuracy {
            Some(accuracy(network, inputs, expected_outputs)?)
        } else {
            None
        };

        info!("epoch {}/{}: loss = {:.6}", epoch, config.epochs, train_loss);

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            train_accuracy,
            elapsed_ms,
        };

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }
    }

    Ok(last_train_loss)
}

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::{mpsc, Arc};

    use super::*;
    use crate::math::random::Uniform;
    use crate::network::layered::LayeredNetwork;
    use crate::optim::rprop::RpropConfig;

    fn and_samples() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let inputs = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        let targets = vec![vec![0.0], vec![0.0], vec![0.0], vec![1.0]];
        (inputs, targets)
    }

    #[test]
    fn sends_one_stats_per_pass() {
        let (inputs, targets) = and_samples();
        let mut network = LayeredNetwork::rprop_with(RpropConfig::default(), &[2, 1], &mut Uniform::seeded(8)).unwrap();
        let (tx, rx) = mpsc::channel();
        let config = TrainConfig { progress_tx: Some(tx), track_accuracy: true, ..TrainConfig::new(5, 0) };
        train_loop(&mut network, &inputs, &targets, &config).unwrap();
        drop(config);

        let stats: Vec<EpochStats> = rx.iter().collect();
        assert_eq!(stats.len(), 5);
        assert_eq!(stats[4].epoch, 5);
        assert!(stats.iter().all(|s| s.train_accuracy.is_some()));
    }

    #[test]
    fn stop_flag_prevents_training() {
        let (inputs, targets) = and_samples();
        let mut network = LayeredNetwork::rprop_with(RpropConfig::default(), &[2, 1], &mut Uniform::seeded(8)).unwrap();
        let before = network.clone();
        let config = TrainConfig { stop_flag: Some(Arc::new(AtomicBool::new(true))), ..TrainConfig::new(5, 0) };
        let loss = train_loop(&mut network, &inputs, &targets, &config).unwrap();
        assert_eq!(loss, 0.0);
        assert_eq!(network, before);
    }

    #[test]
    fn rprop_learns_one_hot_mapping() {
        let inputs = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let targets = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let mut network = LayeredNetwork::rprop_with(RpropConfig::default(), &[2, 2], &mut Uniform::seeded(21)).unwrap();
        let first = train_loop(&mut network, &inputs, &targets, &TrainConfig::new(1, 0)).unwrap();
        let last = train_loop(&mut network, &inputs, &targets, &TrainConfig::new(300, 0)).unwrap();
        assert!(last < first);
        assert!(last < 0.05);
    }
}
