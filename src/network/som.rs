use std::ops::Range;

use log::{debug, trace};
use serde::{Serialize, Deserialize};

use crate::error::{NeuroError, Result};
use crate::graph::graph::Graph;
use crate::graph::link::LinkKind;
use crate::graph::node::{Node, NodeId, NodeKind};
use crate::math::random::Uniform;
use crate::network::flat::{FlatReader, FlatWriter};
use crate::network::kind::NetworkKind;
use crate::network::network::NeuralNetwork;
use crate::optim::sgd::Sgd;

/// Shape and training schedule of a self-organizing map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SomConfig {
    pub inputs: usize,
    pub rows: usize,
    pub columns: usize,
    pub initial_learning_rate: f64,
    pub final_learning_rate: f64,
    pub initial_neighborhood: usize,
    /// The neighborhood shrinks by one every this many iterations.
    pub neighborhood_reduce_interval: usize,
    /// Iterations over which the learning rate falls to its final value.
    pub training_iterations: u64,
}

/// Kohonen map: every input node is linked to every cell of a
/// `rows x columns` grid, one weight per input dimension.
///
/// Node layout: inputs, then cells in row-major order. The links of cell `c`
/// occupy `c * inputs .. (c + 1) * inputs`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfOrganizingNetwork {
    graph: Graph,
    config: SomConfig,
    learning_rate: f64,
    iteration: u64,
    neighborhood: usize,
    winner: Option<(usize, usize)>,
}

impl SelfOrganizingNetwork {
    pub fn new(config: SomConfig) -> Result<SelfOrganizingNetwork> {
        SelfOrganizingNetwork::with_rng(config, &mut Uniform::new())
    }

    /// Builds the map drawing initial weights in `[-1, 1)` from `rng`.
    pub fn with_rng(config: SomConfig, rng: &mut Uniform) -> Result<SelfOrganizingNetwork> {
        SelfOrganizingNetwork::build(config, &mut || rng.sample(-1.0, 1.0))
    }

    fn build(config: SomConfig, weight: &mut dyn FnMut() -> f64) -> Result<SelfOrganizingNetwork> {
        let (cells, node_count, link_count) = grid_counts(&config)?;
        let mut graph = Graph::with_capacity(node_count, link_count);
        for _ in 0..config.inputs {
            graph.add_node(Node::new(NodeKind::Input));
        }
        for _ in 0..cells {
            let cell = graph.add_node(Node::new(NodeKind::Competitive));
            for input in 0..config.inputs {
                graph.link(input, cell, weight(), LinkKind::Plain);
            }
        }
        debug!(
            "built self-organizing map {}x{} over {} inputs, {} links",
            config.rows,
            config.columns,
            config.inputs,
            graph.link_count()
        );
        Ok(SelfOrganizingNetwork {
            graph,
            learning_rate: config.initial_learning_rate,
            neighborhood: config.initial_neighborhood,
            iteration: 0,
            winner: None,
            config,
        })
    }

    /// Restores a map from a buffer written by `to_flat`. The iteration
    /// counter and neighborhood start over; the learning rate is restored.
    pub fn from_flat(data: &[f64]) -> Result<SelfOrganizingNetwork> {
        let mut reader = FlatReader::new(data);
        let initial_learning_rate = reader.read()?;
        let final_learning_rate = reader.read()?;
        let initial_neighborhood = reader.read_count()?;
        let neighborhood_reduce_interval = reader.read_count()?;
        let training_iterations = reader.read_count()? as u64;
        let rows = reader.read_count()?;
        let columns = reader.read_count()?;
        reader.expect_kind(NetworkKind::SelfOrganizing)?;
        let inputs = reader.read_count()?;
        let link_count = reader.read_count()?;

        let config = SomConfig {
            inputs,
            rows,
            columns,
            initial_learning_rate,
            final_learning_rate,
            initial_neighborhood,
            neighborhood_reduce_interval,
            training_iterations,
        };
        let (cells, _, expected_links) = grid_counts(&config)?;
        if link_count != expected_links {
            return Err(NeuroError::CountMismatch { field: "link count", expected: expected_links, found: link_count });
        }
        reader.ensure_room(&[(inputs, 2), (link_count, 1), (1, 1), (cells, 2)])?;

        let mut network = SelfOrganizingNetwork::build(config, &mut || 0.0)?;
        let (inputs, cells) = (network.input_range(), network.cell_range());
        network.graph.read_nodes(inputs, &mut reader)?;
        network.graph.read_links(&mut reader)?;
        network.learning_rate = reader.read()?;
        network.graph.read_nodes(cells, &mut reader)?;
        debug!("loaded self-organizing map {}x{} from {} values", rows, columns, reader.position());
        Ok(network)
    }

    pub fn config(&self) -> &SomConfig {
        &self.config
    }

    pub fn rows(&self) -> usize {
        self.config.rows
    }

    pub fn columns(&self) -> usize {
        self.config.columns
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn current_iteration(&self) -> u64 {
        self.iteration
    }

    pub fn neighborhood_size(&self) -> usize {
        self.neighborhood
    }

    /// `(row, column)` of the closest cell at the last run.
    pub fn winner(&self) -> Option<(usize, usize)> {
        self.winner
    }

    pub fn cell(&self, row: usize, column: usize) -> Result<&Node> {
        let id = self.cell_id(row, column)?;
        Ok(self.graph.node(id))
    }

    /// Distance of every cell to the last input, row-major.
    pub fn distances(&self) -> Vec<f64> {
        self.graph.nodes()[self.cell_range()].iter().map(Node::value).collect()
    }

    /// Runs the map on `input` and pulls every cell within the current
    /// neighborhood of the winner toward it: `w += rate * (x - w)`.
    /// Returns the winner.
    pub fn train(&mut self, input: &[f64]) -> Result<(usize, usize)> {
        self.graph.clamp(self.input_range(), input)?;
        let (win_row, win_column) = self.compete();
        let sgd = Sgd::new(self.learning_rate, 0.0);

        for row in 0..self.config.rows {
            for column in 0..self.config.columns {
                if row.abs_diff(win_row).max(column.abs_diff(win_column)) > self.neighborhood {
                    continue;
                }
                let cell = self.config.inputs + row * self.config.columns + column;
                for link in self.graph.node(cell).in_links().to_vec() {
                    let current = self.graph.link_at(link);
                    let delta = sgd.delta(self.graph.node(current.source()).value() - current.weight(), 1.0);
                    self.graph.link_at_mut(link).update_weight(delta, &sgd);
                }
            }
        }
        Ok((win_row, win_column))
    }

    // Evaluates every cell and records the closest; ties go to the first in
    // row-major order.
    fn compete(&mut self) -> (usize, usize) {
        let mut best = (0, 0);
        let mut min_value = f64::INFINITY;
        for row in 0..self.config.rows {
            for column in 0..self.config.columns {
                let cell = self.config.inputs + row * self.config.columns + column;
                self.graph.run_node(cell);
                let value = self.graph.node(cell).value();
                if value < min_value {
                    min_value = value;
                    best = (row, column);
                }
            }
        }
        self.winner = Some(best);
        best
    }

    fn cell_range(&self) -> Range<NodeId> {
        self.config.inputs..self.graph.node_count()
    }

    fn cell_id(&self, row: usize, column: usize) -> Result<NodeId> {
        if row >= self.config.rows {
            return Err(NeuroError::IndexOutOfRange { role: "row", index: row, count: self.config.rows });
        }
        if column >= self.config.columns {
            return Err(NeuroError::IndexOutOfRange { role: "column", index: column, count: self.config.columns });
        }
        Ok(self.config.inputs + row * self.config.columns + column)
    }
}

/// Cell, node and link counts of a map, or an error when the grid is empty or
/// too large to address.
fn grid_counts(config: &SomConfig) -> Result<(usize, usize, usize)> {
    if config.inputs == 0 || config.rows == 0 || config.columns == 0 {
        return Err(NeuroError::InvalidTopology(format!(
            "self-organizing map needs inputs and a non-empty grid, got {} inputs on {}x{}",
            config.inputs, config.rows, config.columns
        )));
    }
    let cells = config.rows.checked_mul(config.columns);
    let counts = cells.and_then(|cells| {
        let nodes = config.inputs.checked_add(cells)?;
        let links = config.inputs.checked_mul(cells)?;
        Some((cells, nodes, links))
    });
    counts.ok_or_else(|| {
        NeuroError::InvalidTopology(format!(
            "self-organizing map {}x{} over {} inputs is too large",
            config.rows, config.columns, config.inputs
        ))
    })
}

impl NeuralNetwork for SelfOrganizingNetwork {
    fn kind(&self) -> NetworkKind {
        NetworkKind::SelfOrganizing
    }

    fn graph(&self) -> &Graph {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    fn input_range(&self) -> Range<NodeId> {
        0..self.config.inputs
    }

    /// A map has no output nodes; results are read through `winner` and
    /// `distances`.
    fn output_range(&self) -> Range<NodeId> {
        self.config.inputs..self.config.inputs
    }

    fn run(&mut self, input: &[f64]) -> Result<()> {
        self.graph.clamp(self.input_range(), input)?;
        self.compete();
        Ok(())
    }

    /// Advances the schedule by one iteration: the learning rate moves
    /// linearly from its initial to its final value over
    /// `training_iterations` and then stays there, and the neighborhood
    /// shrinks by one every `neighborhood_reduce_interval` iterations.
    fn epoch(&mut self, _samples: usize) {
        self.iteration += 1;
        let progress = if self.config.training_iterations == 0 {
            1.0
        } else {
            (self.iteration as f64 / self.config.training_iterations as f64).min(1.0)
        };
        self.learning_rate = self.config.initial_learning_rate
            - progress * (self.config.initial_learning_rate - self.config.final_learning_rate);

        let interval = self.config.neighborhood_reduce_interval as u64;
        if interval > 0 && (self.iteration + 1) % interval == 0 && self.neighborhood > 0 {
            self.neighborhood -= 1;
        }
        trace!(
            "som iteration {}: learning rate {}, neighborhood {}",
            self.iteration,
            self.learning_rate,
            self.neighborhood
        );
    }

    /// Layout: initial and final learning rate, initial neighborhood, reduce
    /// interval, training iterations, rows, columns, type tag, input count,
    /// link count, input node states, link weights, current learning rate,
    /// cell states.
    fn to_flat(&self) -> Vec<f64> {
        let mut writer = FlatWriter::new();
        writer.push(self.config.initial_learning_rate);
        writer.push(self.config.final_learning_rate);
        writer.push_count(self.config.initial_neighborhood);
        writer.push_count(self.config.neighborhood_reduce_interval);
        writer.push(self.config.training_iterations as f64);
        writer.push_count(self.config.rows);
        writer.push_count(self.config.columns);
        writer.push_kind(NetworkKind::SelfOrganizing);
        writer.push_count(self.config.inputs);
        writer.push_count(self.graph.link_count());
        self.graph.write_nodes(self.input_range(), &mut writer);
        self.graph.write_links(&mut writer);
        writer.push(self.learning_rate);
        self.graph.write_nodes(self.cell_range(), &mut writer);
        writer.into_inner()
    }

    fn load_flat(&mut self, data: &[f64]) -> Result<()> {
        *self = SelfOrganizingNetwork::from_flat(data)?;
        Ok(())
    }
}
