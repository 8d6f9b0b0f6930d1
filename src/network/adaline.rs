use std::ops::Range;

use log::debug;

use crate::error::{NeuroError, Result};
use crate::graph::graph::Graph;
use crate::graph::link::LinkKind;
use crate::graph::node::{Node, NodeId, NodeKind};
use crate::math::random::Uniform;
use crate::network::flat::{FlatReader, FlatWriter};
use crate::network::kind::NetworkKind;
use crate::network::network::{NeuralNetwork, Supervised};
use crate::optim::sgd::Sgd;

/// Single adaptive linear element: `n` inputs plus a unit bias feeding one
/// sign-limited output node.
///
/// Node layout: inputs, bias, output. Link `i` joins node `i` to the output.
#[derive(Debug, Clone, PartialEq)]
pub struct AdalineNetwork {
    graph: Graph,
    learning_rate: f64,
}

impl AdalineNetwork {
    pub fn new(inputs: usize, learning_rate: f64) -> AdalineNetwork {
        AdalineNetwork::with_rng(inputs, learning_rate, &mut Uniform::new())
    }

    /// Builds the network drawing initial weights in `[-1, 1)` from `rng`.
    pub fn with_rng(inputs: usize, learning_rate: f64, rng: &mut Uniform) -> AdalineNetwork {
        AdalineNetwork::build(inputs, learning_rate, &mut || rng.sample(-1.0, 1.0))
    }

    fn build(inputs: usize, learning_rate: f64, weight: &mut dyn FnMut() -> f64) -> AdalineNetwork {
        let mut graph = Graph::with_capacity(inputs + 2, inputs + 1);
        for _ in 0..inputs {
            graph.add_node(Node::new(NodeKind::Input));
        }
        graph.add_node(Node::bias(1.0));
        let output = graph.add_node(Node::new(NodeKind::Adaline));
        for source in 0..=inputs {
            graph.link(source, output, weight(), LinkKind::Plain);
        }
        debug!("built adaline network: {} nodes, {} links", graph.node_count(), graph.link_count());
        AdalineNetwork { graph, learning_rate }
    }

    /// Restores a network from a buffer written by `to_flat`.
    pub fn from_flat(data: &[f64]) -> Result<AdalineNetwork> {
        let mut reader = FlatReader::new(data);
        reader.expect_kind(NetworkKind::Adaline)?;
        let node_count = reader.read_count()?;
        let link_count = reader.read_count()?;
        if node_count < 2 {
            return Err(NeuroError::InvalidTopology(format!(
                "adaline needs a bias and an output node, buffer declares {} nodes",
                node_count
            )));
        }
        let inputs = node_count - 2;
        if link_count != inputs + 1 {
            return Err(NeuroError::CountMismatch { field: "link count", expected: inputs + 1, found: link_count });
        }
        reader.ensure_room(&[(node_count, 2), (link_count, 1), (1, 1)])?;

        let mut network = AdalineNetwork::build(inputs, 0.0, &mut || 0.0);
        network.graph.read_nodes(0..node_count, &mut reader)?;
        network.graph.read_links(&mut reader)?;
        network.learning_rate = reader.read()?;
        debug!("loaded adaline network with {} inputs", inputs);
        Ok(network)
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    /// The sign-limited output node.
    pub fn adaline_node(&self) -> &Node {
        self.graph.node(self.output_id())
    }

    fn output_id(&self) -> NodeId {
        self.graph.node_count() - 1
    }
}

impl NeuralNetwork for AdalineNetwork {
    fn kind(&self) -> NetworkKind {
        NetworkKind::Adaline
    }

    fn graph(&self) -> &Graph {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    fn input_range(&self) -> Range<NodeId> {
        0..self.graph.node_count() - 2
    }

    fn output_range(&self) -> Range<NodeId> {
        let output = self.output_id();
        output..output + 1
    }

    fn run(&mut self, input: &[f64]) -> Result<()> {
        self.graph.clamp(self.input_range(), input)?;
        self.graph.run_node(self.output_id());
        Ok(())
    }

    fn epoch(&mut self, _samples: usize) {}

    fn to_flat(&self) -> Vec<f64> {
        let mut writer = FlatWriter::new();
        writer.push_kind(NetworkKind::Adaline);
        writer.push_count(self.graph.node_count());
        writer.push_count(self.graph.link_count());
        self.graph.write_nodes(0..self.graph.node_count(), &mut writer);
        self.graph.write_links(&mut writer);
        writer.push(self.learning_rate);
        writer.into_inner()
    }

    fn load_flat(&mut self, data: &[f64]) -> Result<()> {
        *self = AdalineNetwork::from_flat(data)?;
        Ok(())
    }
}

impl Supervised for AdalineNetwork {
    /// Widrow-Hoff rule on the raw weighted sum:
    /// `weight += learning_rate * (target - sum) * source`.
    fn learn(&mut self, target: &[f64]) -> Result<()> {
        if target.len() != 1 {
            return Err(NeuroError::LengthMismatch { what: "target", expected: 1, found: target.len() });
        }
        let output = self.output_id();
        let error = target[0] - self.graph.weighted_sum(output);
        self.graph.node_mut(output).set_error(error);

        let sgd = Sgd::new(self.learning_rate, 0.0);
        for link in self.graph.node(output).in_links().to_vec() {
            let source = self.graph.node(self.graph.link_at(link).source()).value();
            self.graph.link_at_mut(link).update_weight(sgd.delta(error, source), &sgd);
        }
        Ok(())
    }
}
