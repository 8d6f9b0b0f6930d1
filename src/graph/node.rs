use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::graph::link::LinkId;
use crate::network::flat::{FlatReader, FlatWriter};
use crate::optim::sgd::Sgd;

/// Index of a node inside its network's node arena.
pub type NodeId = usize;

/// What a node does when it runs, plus the per-node training parameters the
/// kind needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// Clamped to an externally supplied value.
    Input,
    /// Constant value fixed at construction.
    Bias,
    /// Weighted sum through the sign limiter.
    Adaline,
    /// Back-propagation node between input and output layers.
    Hidden { learning_rate: f64, momentum: f64 },
    /// Back-propagation node in the last layer.
    Output { learning_rate: f64, momentum: f64 },
    /// Self-organizing map cell; its value is the Euclidean distance between
    /// the input vector and its incoming weights.
    Competitive,
}

impl NodeKind {
    /// Transfer applied to the weighted sum. Kinds without one of their own
    /// pass the sum through unchanged.
    pub fn activation(&self) -> ActivationFunction {
        match self {
            NodeKind::Adaline => ActivationFunction::Sign,
            NodeKind::Hidden { .. } | NodeKind::Output { .. } => ActivationFunction::Sigmoid,
            _ => ActivationFunction::Identity,
        }
    }

    /// Optimizer parameters for links ending at this node.
    pub fn sgd(&self) -> Sgd {
        match *self {
            NodeKind::Hidden { learning_rate, momentum } | NodeKind::Output { learning_rate, momentum } => {
                Sgd::new(learning_rate, momentum)
            }
            _ => Sgd::new(0.0, 0.0),
        }
    }
}

/// A graph vertex. Owned by the network's arena and linked by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    value: f64,
    error: f64,
    in_links: Vec<LinkId>,
    out_links: Vec<LinkId>,
    kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Node {
        Node {
            value: 0.0,
            error: 0.0,
            in_links: Vec::new(),
            out_links: Vec::new(),
            kind,
        }
    }

    pub fn bias(value: f64) -> Node {
        Node { value, ..Node::new(NodeKind::Bias) }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Sets the node's output. A bias node ignores this: its value is fixed
    /// when it is built.
    pub fn set_value(&mut self, value: f64) {
        if self.kind != NodeKind::Bias {
            self.value = value;
        }
    }

    /// Training signal. Self-organizing cells have none and always report `0`.
    pub fn error(&self) -> f64 {
        match self.kind {
            NodeKind::Competitive => 0.0,
            _ => self.error,
        }
    }

    /// Sets the training signal. A no-op on self-organizing cells.
    pub fn set_error(&mut self, error: f64) {
        if self.kind != NodeKind::Competitive {
            self.error = error;
        }
    }

    pub fn in_links(&self) -> &[LinkId] {
        &self.in_links
    }

    pub fn out_links(&self) -> &[LinkId] {
        &self.out_links
    }

    pub(crate) fn attach_in(&mut self, link: LinkId) {
        self.in_links.push(link);
    }

    pub(crate) fn attach_out(&mut self, link: LinkId) {
        self.out_links.push(link);
    }

    /// Base fields first (value, error), then whatever the kind adds.
    pub(crate) fn write(&self, writer: &mut FlatWriter) {
        writer.push(self.value);
        writer.push(self.error);
        if let NodeKind::Hidden { learning_rate, momentum } | NodeKind::Output { learning_rate, momentum } = self.kind {
            writer.push(momentum);
            writer.push(learning_rate);
        }
    }

    /// Restores raw state in `write` order. Bypasses the bias guard so a
    /// stored bias value comes back as it was.
    pub(crate) fn read(&mut self, reader: &mut FlatReader) -> Result<()> {
        self.value = reader.read()?;
        self.error = reader.read()?;
        if let NodeKind::Hidden { learning_rate, momentum } | NodeKind::Output { learning_rate, momentum } = &mut self.kind {
            *momentum = reader.read()?;
            *learning_rate = reader.read()?;
        }
        Ok(())
    }
}
