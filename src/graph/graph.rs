use std::ops::Range;

use crate::error::{NeuroError, Result};
use crate::graph::link::{Link, LinkId, LinkKind};
use crate::graph::node::{Node, NodeId, NodeKind};
use crate::network::flat::{FlatReader, FlatWriter};
use crate::optim::rprop::RpropConfig;

/// Node and link arenas. Links refer to nodes by index and nodes list their
/// links by index, so there are no ownership cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl Graph {
    pub fn with_capacity(nodes: usize, links: usize) -> Graph {
        Graph {
            nodes: Vec::with_capacity(nodes),
            links: Vec::with_capacity(links),
        }
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Creates a link from `from` to `to`, registering it as an outgoing link
    /// of `from` and an incoming link of `to`. This is the only way a link
    /// gets endpoints.
    pub fn link(&mut self, from: NodeId, to: NodeId, weight: f64, kind: LinkKind) -> LinkId {
        let id = self.links.len();
        self.links.push(Link::new(from, to, weight, kind));
        self.nodes[from].attach_out(id);
        self.nodes[to].attach_in(id);
        id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn link_at(&self, id: LinkId) -> &Link {
        &self.links[id]
    }

    pub fn link_at_mut(&mut self, id: LinkId) -> &mut Link {
        &mut self.links[id]
    }

    /// Copies `input` into the nodes of `range`.
    pub fn clamp(&mut self, range: Range<NodeId>, input: &[f64]) -> Result<()> {
        if input.len() != range.len() {
            return Err(NeuroError::LengthMismatch {
                what: "input",
                expected: range.len(),
                found: input.len(),
            });
        }
        for (node, &value) in self.nodes[range].iter_mut().zip(input) {
            node.set_value(value);
        }
        Ok(())
    }

    /// `Σ source.value * weight` over the incoming links of `id`.
    pub fn weighted_sum(&self, id: NodeId) -> f64 {
        self.nodes[id]
            .in_links()
            .iter()
            .map(|&l| {
                let link = &self.links[l];
                self.nodes[link.source()].value() * link.weight()
            })
            .sum()
    }

    /// `Σ target.error * weight` over the outgoing links of `id`.
    pub fn weighted_out_error(&self, id: NodeId) -> f64 {
        self.nodes[id]
            .out_links()
            .iter()
            .map(|&l| {
                let link = &self.links[l];
                self.nodes[link.target()].error() * link.weight()
            })
            .sum()
    }

    /// Euclidean distance between the source values of `id`'s incoming links
    /// and the weights of those links.
    pub fn distance(&self, id: NodeId) -> f64 {
        self.nodes[id]
            .in_links()
            .iter()
            .map(|&l| {
                let link = &self.links[l];
                (self.nodes[link.source()].value() - link.weight()).powi(2)
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Recomputes the value of `id` from its incoming links.
    pub fn run_node(&mut self, id: NodeId) {
        let kind = *self.nodes[id].kind();
        let value = match kind {
            NodeKind::Input | NodeKind::Bias => return,
            NodeKind::Competitive => self.distance(id),
            _ => kind.activation().function(self.weighted_sum(id)),
        };
        self.nodes[id].set_value(value);
    }

    /// Runs every node in `range`, in order.
    pub fn run_range(&mut self, range: Range<NodeId>) {
        for id in range {
            self.run_node(id);
        }
    }

    /// Pushes `learning_rate * target.error * source.value` (with the rate and
    /// momentum of each link's target node) into every link.
    pub fn update_weights(&mut self) {
        for link in &mut self.links {
            let sgd = self.nodes[link.target()].kind().sgd();
            let delta = sgd.delta(self.nodes[link.target()].error(), self.nodes[link.source()].value());
            link.update_weight(delta, &sgd);
        }
    }

    /// Epoch boundary for every link.
    pub fn epoch(&mut self, samples: usize, rprop: &RpropConfig) {
        for link in &mut self.links {
            let sgd = self.nodes[link.target()].kind().sgd();
            link.epoch(samples, &sgd, rprop);
        }
    }

    pub(crate) fn promote_links(&mut self, rprop: &RpropConfig) {
        for link in &mut self.links {
            link.promote_to_resilient(rprop);
        }
    }

    pub(crate) fn write_nodes(&self, range: Range<NodeId>, writer: &mut FlatWriter) {
        for node in &self.nodes[range] {
            node.write(writer);
        }
    }

    pub(crate) fn read_nodes(&mut self, range: Range<NodeId>, reader: &mut FlatReader) -> Result<()> {
        for node in &mut self.nodes[range] {
            node.read(reader)?;
        }
        Ok(())
    }

    pub(crate) fn write_links(&self, writer: &mut FlatWriter) {
        for link in &self.links {
            link.write(writer);
        }
    }

    pub(crate) fn read_links(&mut self, reader: &mut FlatReader) -> Result<()> {
        for link in &mut self.links {
            link.read(reader)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_inputs_one_output() -> Graph {
        let mut graph = Graph::default();
        let a = graph.add_node(Node::new(NodeKind::Input));
        let b = graph.add_node(Node::new(NodeKind::Input));
        let out = graph.add_node(Node::new(NodeKind::Output { learning_rate: 0.5, momentum: 0.0 }));
        graph.link(a, out, 0.5, LinkKind::Momentum { delta: 0.0 });
        graph.link(b, out, -0.25, LinkKind::Momentum { delta: 0.0 });
        graph
    }

    #[test]
    fn link_registers_both_endpoints() {
        let graph = two_inputs_one_output();
        assert_eq!(graph.node(0).out_links(), &[0]);
        assert_eq!(graph.node(1).out_links(), &[1]);
        assert_eq!(graph.node(2).in_links(), &[0, 1]);
        assert_eq!(graph.link_at(1).source(), 1);
        assert_eq!(graph.link_at(1).target(), 2);
    }

    #[test]
    fn run_node_applies_sigmoid_to_weighted_sum() {
        let mut graph = two_inputs_one_output();
        graph.clamp(0..2, &[1.0, 2.0]).unwrap();
        graph.run_node(2);
        assert_eq!(graph.weighted_sum(2), 0.0);
        assert_eq!(graph.node(2).value(), 0.5);
    }

    #[test]
    fn input_nodes_keep_their_value() {
        let mut graph = two_inputs_one_output();
        graph.clamp(0..2, &[0.3, 0.4]).unwrap();
        graph.run_node(0);
        assert_eq!(graph.node(0).value(), 0.3);
    }

    #[test]
    fn clamp_checks_length() {
        let mut graph = two_inputs_one_output();
        assert!(matches!(
            graph.clamp(0..2, &[1.0]),
            Err(NeuroError::LengthMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn competitive_node_measures_distance() {
        let mut graph = Graph::default();
        let a = graph.add_node(Node::new(NodeKind::Input));
        let b = graph.add_node(Node::new(NodeKind::Input));
        let cell = graph.add_node(Node::new(NodeKind::Competitive));
        graph.link(a, cell, 0.0, LinkKind::Plain);
        graph.link(b, cell, 0.0, LinkKind::Plain);
        graph.clamp(0..2, &[3.0, 4.0]).unwrap();
        graph.run_node(cell);
        assert_eq!(graph.node(cell).value(), 5.0);
    }

    #[test]
    fn update_weights_uses_target_error() {
        let mut graph = two_inputs_one_output();
        graph.clamp(0..2, &[1.0, 0.5]).unwrap();
        graph.node_mut(2).set_error(0.2);
        graph.update_weights();
        assert!((graph.link_at(0).weight() - (0.5 + 0.5 * 0.2 * 1.0)).abs() < 1e-12);
        assert!((graph.link_at(1).weight() - (-0.25 + 0.5 * 0.2 * 0.5)).abs() < 1e-12);
    }
}
