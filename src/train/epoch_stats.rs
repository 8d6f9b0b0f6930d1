use serde::{Serialize, Deserialize};

/// Per-pass training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `EpochStats` value at the end of every completed pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based pass number.
    pub epoch: usize,
    /// Total passes requested for this run.
    pub total_epochs: usize,
    /// Mean training loss over all samples in this pass.
    pub train_loss: f64,
    /// Fraction of samples classified correctly, when tracked.
    pub train_accuracy: Option<f64>,
    /// Wall-clock duration of this single pass in milliseconds.
    pub elapsed_ms: u64,
}
