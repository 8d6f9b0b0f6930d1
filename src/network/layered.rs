use std::ops::Range;

use log::{debug, trace, warn};
use serde::{Serialize, Deserialize};

use crate::error::{NeuroError, Result};
use crate::graph::graph::Graph;
use crate::graph::link::LinkKind;
use crate::graph::node::{Node, NodeId, NodeKind};
use crate::math::random::Uniform;
use crate::network::flat::{FlatReader, FlatWriter};
use crate::network::kind::NetworkKind;
use crate::network::network::{checked, NeuralNetwork, Supervised};
use crate::optim::rprop::{RpropConfig, ResilientState};

/// When the per-sample deltas reach the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    /// Delta rule with momentum, applied after every sample.
    Immediate,
    /// Deltas accumulate and their mean is applied at each epoch.
    Batched,
    /// Resilient back-propagation at each epoch.
    Resilient,
}

impl UpdateRule {
    pub fn kind(self) -> NetworkKind {
        match self {
            UpdateRule::Immediate => NetworkKind::BackProp,
            UpdateRule::Batched => NetworkKind::EpochBackProp,
            UpdateRule::Resilient => NetworkKind::Rprop,
        }
    }

    fn link_kind(self, rprop: &RpropConfig) -> LinkKind {
        match self {
            UpdateRule::Immediate => LinkKind::Momentum { delta: 0.0 },
            UpdateRule::Batched => LinkKind::Batched { delta: 0.0, accumulator: 0.0 },
            UpdateRule::Resilient => LinkKind::Resilient(ResilientState::new(rprop)),
        }
    }
}

/// Fully connected layered back-propagation network.
///
/// Nodes are stored input layer first, then hidden layers in order, then the
/// output layer. Links are enumerated layer by layer, then by destination,
/// then by source; the flat format depends on that order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredNetwork {
    graph: Graph,
    layers: Vec<usize>,
    first_hidden: NodeId,
    first_output: NodeId,
    learning_rate: f64,
    rule: UpdateRule,
    rprop: RpropConfig,
}

impl LayeredNetwork {
    /// Plain back-propagation, weights updated after every sample.
    pub fn back_prop(learning_rate: f64, momentum: f64, layers: &[usize]) -> Result<LayeredNetwork> {
        LayeredNetwork::new(UpdateRule::Immediate, learning_rate, momentum, layers, &mut Uniform::new())
    }

    /// Back-propagation with weight updates deferred to epoch boundaries.
    pub fn epoch_back_prop(learning_rate: f64, momentum: f64, layers: &[usize]) -> Result<LayeredNetwork> {
        LayeredNetwork::new(UpdateRule::Batched, learning_rate, momentum, layers, &mut Uniform::new())
    }

    /// RPROP network with the default constants.
    pub fn rprop(layers: &[usize]) -> Result<LayeredNetwork> {
        LayeredNetwork::rprop_with(RpropConfig::default(), layers, &mut Uniform::new())
    }

    /// RPROP network. Learning rate is fixed at `1` and momentum at `0`; only
    /// the gradient sign matters.
    pub fn rprop_with(config: RpropConfig, layers: &[usize], rng: &mut Uniform) -> Result<LayeredNetwork> {
        LayeredNetwork::build(UpdateRule::Resilient, config, 1.0, 0.0, layers, &mut || rng.sample(-1.0, 1.0))
    }

    /// Builds a network from layer widths (input first, output last), drawing
    /// initial weights in `[-1, 1)` from `rng`.
    pub fn new(
        rule: UpdateRule,
        learning_rate: f64,
        momentum: f64,
        layers: &[usize],
        rng: &mut Uniform,
    ) -> Result<LayeredNetwork> {
        LayeredNetwork::build(rule, RpropConfig::default(), learning_rate, momentum, layers, &mut || {
            rng.sample(-1.0, 1.0)
        })
    }

    fn build(
        rule: UpdateRule,
        rprop: RpropConfig,
        learning_rate: f64,
        momentum: f64,
        layers: &[usize],
        weight: &mut dyn FnMut() -> f64,
    ) -> Result<LayeredNetwork> {
        if layers.len() < 2 {
            return Err(NeuroError::InvalidTopology(format!(
                "a layered network needs at least 2 layers, got {}",
                layers.len()
            )));
        }
        let (node_count, link_count) = topology_counts(layers)?;
        let mut graph = Graph::with_capacity(node_count, link_count);

        for _ in 0..layers[0] {
            graph.add_node(Node::new(NodeKind::Input));
        }
        let first_hidden = graph.node_count();
        for &width in &layers[1..layers.len() - 1] {
            for _ in 0..width {
                graph.add_node(Node::new(NodeKind::Hidden { learning_rate, momentum }));
            }
        }
        let first_output = graph.node_count();
        for _ in 0..layers[layers.len() - 1] {
            graph.add_node(Node::new(NodeKind::Output { learning_rate, momentum }));
        }

        let mut source_start = 0;
        let mut target_start = first_hidden;
        for pair in layers.windows(2) {
            for j in 0..pair[1] {
                for k in 0..pair[0] {
                    graph.link(source_start + k, target_start + j, weight(), rule.link_kind(&rprop));
                }
            }
            source_start = target_start;
            target_start += pair[1];
        }

        debug!(
            "built {:?} network {:?}: {} nodes, {} links",
            rule.kind(),
            layers,
            graph.node_count(),
            graph.link_count()
        );
        Ok(LayeredNetwork {
            graph,
            layers: layers.to_vec(),
            first_hidden,
            first_output,
            learning_rate,
            rule,
            rprop,
        })
    }

    /// Restores a network of the given rule from a buffer written by `to_flat`.
    pub fn from_flat(rule: UpdateRule, data: &[f64]) -> Result<LayeredNetwork> {
        LayeredNetwork::from_flat_with(rule, RpropConfig::default(), data)
    }

    /// Restores an RPROP network. Buffers written by an epoch network (which
    /// carry no step sizes) are accepted too; their links start again at
    /// `initial_eta`.
    pub fn rprop_from_flat(config: RpropConfig, data: &[f64]) -> Result<LayeredNetwork> {
        LayeredNetwork::from_flat_with(UpdateRule::Resilient, config, data)
    }

    fn from_flat_with(rule: UpdateRule, rprop: RpropConfig, data: &[f64]) -> Result<LayeredNetwork> {
        let mut reader = FlatReader::new(data);
        let layer_count = reader.read_count()?;
        reader.ensure_room(&[(layer_count, 1)])?;
        let layers = (0..layer_count)
            .map(|_| reader.read_count())
            .collect::<Result<Vec<usize>>>()?;

        let expected = rule.kind();
        let found = reader.read_kind(expected)?;
        let legacy = match (rule, found) {
            (_, kind) if kind == expected => false,
            (UpdateRule::Resilient, NetworkKind::EpochBackProp) => true,
            (_, kind) => {
                return Err(NeuroError::FormatMismatch { expected, found: kind.tag() as f64 });
            }
        };

        let node_count = reader.read_count()?;
        let link_count = reader.read_count()?;
        let (expected_nodes, expected_links) = topology_counts(&layers)?;
        if node_count != expected_nodes {
            return Err(NeuroError::CountMismatch { field: "node count", expected: expected_nodes, found: node_count });
        }
        if link_count != expected_links {
            return Err(NeuroError::CountMismatch { field: "link count", expected: expected_links, found: link_count });
        }
        // Two values per node and one per link at the least, then the rate.
        reader.ensure_room(&[(node_count, 2), (link_count, 1), (1, 1)])?;

        let stored_rule = if legacy { UpdateRule::Batched } else { rule };
        let mut network = LayeredNetwork::build(stored_rule, rprop, 0.0, 0.0, &layers, &mut || 0.0)?;

        network.graph.read_nodes(0..node_count, &mut reader)?;
        network.graph.read_links(&mut reader)?;
        network.learning_rate = reader.read()?;

        if legacy {
            warn!("epoch back-propagation buffer loaded as RPROP; step sizes reset to {}", rprop.initial_eta);
            network.graph.promote_links(&rprop);
            network.rule = UpdateRule::Resilient;
        }
        debug!("loaded {:?} network {:?} from {} values", network.kind(), network.layers, reader.position());
        Ok(network)
    }

    pub fn rule(&self) -> UpdateRule {
        self.rule
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn rprop_config(&self) -> &RpropConfig {
        &self.rprop
    }

    /// Replaces the RPROP constants. Step sizes already adapted are kept.
    pub fn set_rprop_config(&mut self, config: RpropConfig) {
        self.rprop = config;
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    pub fn layer_width(&self, index: usize) -> Result<usize> {
        self.layers.get(index).copied().ok_or(NeuroError::IndexOutOfRange {
            role: "layer",
            index,
            count: self.layers.len(),
        })
    }

    pub fn hidden_count(&self) -> usize {
        self.first_output - self.first_hidden
    }

    pub fn hidden_node(&self, index: usize) -> Result<&Node> {
        let id = checked("hidden", self.first_hidden..self.first_output, index)?;
        Ok(self.graph.node(id))
    }
}

impl NeuralNetwork for LayeredNetwork {
    fn kind(&self) -> NetworkKind {
        self.rule.kind()
    }

    fn graph(&self) -> &Graph {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    fn input_range(&self) -> Range<NodeId> {
        0..self.first_hidden
    }

    fn output_range(&self) -> Range<NodeId> {
        self.first_output..self.graph.node_count()
    }

    fn run(&mut self, input: &[f64]) -> Result<()> {
        self.graph.clamp(self.input_range(), input)?;
        self.graph.run_range(self.first_hidden..self.graph.node_count());
        Ok(())
    }

    fn epoch(&mut self, samples: usize) {
        if self.rule == UpdateRule::Immediate {
            return;
        }
        trace!("{:?} epoch over {} samples", self.rule, samples);
        self.graph.epoch(samples, &self.rprop);
    }

    /// Layout: layer count, layer widths, type tag, node count, link count,
    /// node states, link states, learning rate.
    fn to_flat(&self) -> Vec<f64> {
        let mut writer = FlatWriter::new();
        writer.push_count(self.layers.len());
        for &width in &self.layers {
            writer.push_count(width);
        }
        writer.push_kind(self.kind());
        writer.push_count(self.graph.node_count());
        writer.push_count(self.graph.link_count());
        self.graph.write_nodes(0..self.graph.node_count(), &mut writer);
        self.graph.write_links(&mut writer);
        writer.push(self.learning_rate);
        writer.into_inner()
    }

    fn load_flat(&mut self, data: &[f64]) -> Result<()> {
        *self = LayeredNetwork::from_flat_with(self.rule, self.rprop, data)?;
        Ok(())
    }
}

impl Supervised for LayeredNetwork {
    /// Output error: `v * (1 - v) * (target - v)`. Hidden error:
    /// `v * (1 - v) * Σ(weight * downstream error)`, computed back to front.
    /// Each link then receives `learning_rate * error * source`.
    fn learn(&mut self, target: &[f64]) -> Result<()> {
        let outputs = self.output_range();
        if target.len() != outputs.len() {
            return Err(NeuroError::LengthMismatch { what: "target", expected: outputs.len(), found: target.len() });
        }
        for (id, &expected) in outputs.zip(target) {
            let node = self.graph.node_mut(id);
            let value = node.value();
            let slope = node.kind().activation().derivative_from_output(value);
            node.set_error(slope * (expected - value));
        }
        for id in (self.first_hidden..self.first_output).rev() {
            let node = self.graph.node(id);
            let slope = node.kind().activation().derivative_from_output(node.value());
            let error = slope * self.graph.weighted_out_error(id);
            self.graph.node_mut(id).set_error(error);
        }
        self.graph.update_weights();
        Ok(())
    }
}

/// Node and link counts of a fully connected stack of `layers`.
fn topology_counts(layers: &[usize]) -> Result<(usize, usize)> {
    let nodes = layers.iter().try_fold(0usize, |total, &width| total.checked_add(width));
    let links = layers
        .windows(2)
        .try_fold(0usize, |total, pair| pair[0].checked_mul(pair[1]).and_then(|n| total.checked_add(n)));
    match (nodes, links) {
        (Some(nodes), Some(links)) => Ok((nodes, links)),
        _ => Err(NeuroError::InvalidTopology(format!(
            "{} layers whose node or link count overflows",
            layers.len()
        ))),
    }
}
