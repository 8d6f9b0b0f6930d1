use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};
use crate::train::epoch_stats::EpochStats;

/// Settings for a `train_loop` run.
pub struct TrainConfig {
    /// Full passes over the training data.
    pub epochs: usize,
    /// Samples between epoch boundaries. `0` puts a single boundary at the
    /// end of each pass.
    pub batch_size: usize,
    /// Present samples in a fresh random order every pass.
    pub shuffle: bool,
    /// Also report the share of samples whose best output node matches the
    /// target's first `1.0`.
    pub track_accuracy: bool,
    /// One `EpochStats` is sent per pass; a dropped receiver ends the run.
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    /// Checked before every pass.
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig`: sequential order, no accuracy, no
    /// progress channel and no stop flag.
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            shuffle: false,
            track_accuracy: false,
            progress_tx: None,
            stop_flag: None,
        }
    }
}
