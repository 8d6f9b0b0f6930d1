use std::ops::Range;

use crate::error::{NeuroError, Result};
use crate::graph::graph::Graph;
use crate::graph::node::{Node, NodeId};
use crate::network::kind::NetworkKind;

/// Behavior shared by every network family.
///
/// Implementors supply the type tag, the node arena and where the input and
/// output nodes sit in it; node access, output collection and best-node
/// selection come for free.
pub trait NeuralNetwork {
    fn kind(&self) -> NetworkKind;

    fn graph(&self) -> &Graph;

    fn graph_mut(&mut self) -> &mut Graph;

    /// Arena positions of the input nodes.
    fn input_range(&self) -> Range<NodeId>;

    /// Arena positions of the output nodes. Empty for self-organizing maps.
    fn output_range(&self) -> Range<NodeId>;

    /// Clamps the input nodes to `input` and evaluates every other node in
    /// dependency order.
    fn run(&mut self, input: &[f64]) -> Result<()>;

    /// Epoch boundary after `samples` presentations.
    fn epoch(&mut self, samples: usize);

    /// Serializes the whole network into a flat buffer.
    fn to_flat(&self) -> Vec<f64>;

    /// Replaces this network with the one stored in `data`. On error `self`
    /// is left untouched.
    fn load_flat(&mut self, data: &[f64]) -> Result<()>;

    fn node_count(&self) -> usize {
        self.graph().node_count()
    }

    fn link_count(&self) -> usize {
        self.graph().link_count()
    }

    fn input_count(&self) -> usize {
        self.input_range().len()
    }

    fn output_count(&self) -> usize {
        self.output_range().len()
    }

    fn input_node(&self, index: usize) -> Result<&Node> {
        let id = checked("input", self.input_range(), index)?;
        Ok(self.graph().node(id))
    }

    fn output_node(&self, index: usize) -> Result<&Node> {
        let id = checked("output", self.output_range(), index)?;
        Ok(self.graph().node(id))
    }

    fn output_node_mut(&mut self, index: usize) -> Result<&mut Node> {
        let id = checked("output", self.output_range(), index)?;
        Ok(self.graph_mut().node_mut(id))
    }

    /// Current output activations.
    fn outputs(&self) -> Vec<f64> {
        self.graph().nodes()[self.output_range()].iter().map(Node::value).collect()
    }

    /// `run` followed by `outputs`.
    fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.run(input)?;
        Ok(self.outputs())
    }

    /// Picks the dominant output node.
    ///
    /// A node replaces the current best when its value is strictly greater,
    /// or when it is at least as large and its error is smaller than the
    /// best's. The running maximum starts at `0`, so `None` comes back only
    /// when every output is negative or there are no outputs.
    fn best_output_index(&self) -> Option<usize> {
        let mut best = None;
        let mut max_value = 0.0;
        let mut min_error = f64::INFINITY;
        for (i, node) in self.graph().nodes()[self.output_range()].iter().enumerate() {
            if node.value() > max_value || (node.value() >= max_value && node.error() < min_error) {
                max_value = node.value();
                min_error = node.error();
                best = Some(i);
            }
        }
        best
    }
}

/// Networks trained against a target vector.
pub trait Supervised: NeuralNetwork {
    /// Computes error signals for the last `run` against `target` and feeds the
    /// resulting deltas into the links.
    fn learn(&mut self, target: &[f64]) -> Result<()>;
}

pub(crate) fn checked(role: &'static str, range: Range<NodeId>, index: usize) -> Result<NodeId> {
    if index >= range.len() {
        return Err(NeuroError::IndexOutOfRange { role, index, count: range.len() });
    }
    Ok(range.start + index)
}
