use crate::error::Result;
use crate::graph::node::NodeId;
use crate::network::flat::{FlatReader, FlatWriter};
use crate::optim::rprop::{RpropConfig, ResilientState};
use crate::optim::sgd::Sgd;

/// Index of a link inside its network's link arena.
pub type LinkId = usize;

/// Training state carried by a link, one variant per update family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkKind {
    /// Weight only (Adaline, self-organizing map).
    Plain,
    /// Delta rule: updated after every sample.
    Momentum { delta: f64 },
    /// Epoch rule: per-sample deltas accumulate until the epoch boundary.
    Batched { delta: f64, accumulator: f64 },
    /// RPROP: accumulates like `Batched`, moves by an adaptive step.
    Resilient(ResilientState),
}

/// Directed weighted edge. Endpoints are fixed when the link is created.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    weight: f64,
    source: NodeId,
    target: NodeId,
    kind: LinkKind,
}

impl Link {
    pub(crate) fn new(source: NodeId, target: NodeId, weight: f64, kind: LinkKind) -> Link {
        Link { weight, source, target, kind }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn kind(&self) -> &LinkKind {
        &self.kind
    }

    /// Delta applied at the last update, if this kind remembers one.
    pub fn previous_delta(&self) -> Option<f64> {
        match self.kind {
            LinkKind::Plain => None,
            LinkKind::Momentum { delta } | LinkKind::Batched { delta, .. } => Some(delta),
            LinkKind::Resilient(state) => Some(state.delta),
        }
    }

    /// Pending epoch total, for the batched kinds.
    pub fn accumulator(&self) -> Option<f64> {
        match self.kind {
            LinkKind::Batched { accumulator, .. } => Some(accumulator),
            LinkKind::Resilient(state) => Some(state.accumulator),
            _ => None,
        }
    }

    /// Current RPROP step size.
    pub fn step_size(&self) -> Option<f64> {
        match self.kind {
            LinkKind::Resilient(state) => Some(state.eta),
            _ => None,
        }
    }

    /// Feeds one per-sample delta into the link. Immediate kinds change the
    /// weight now; batched kinds only accumulate.
    pub fn update_weight(&mut self, delta: f64, sgd: &Sgd) {
        match &mut self.kind {
            LinkKind::Plain => self.weight += delta,
            LinkKind::Momentum { delta: previous } => sgd.step(&mut self.weight, delta, previous),
            LinkKind::Batched { accumulator, .. } => *accumulator += delta,
            LinkKind::Resilient(state) => state.accumulator += delta,
        }
    }

    /// Epoch boundary over `samples` presentations. A no-op for the kinds
    /// with no epoch state.
    pub fn epoch(&mut self, samples: usize, sgd: &Sgd, rprop: &RpropConfig) {
        match &mut self.kind {
            LinkKind::Plain | LinkKind::Momentum { .. } => {}
            LinkKind::Batched { delta, accumulator } => sgd.batch_step(&mut self.weight, accumulator, delta, samples),
            LinkKind::Resilient(state) => rprop.step(&mut self.weight, state, samples),
        }
    }

    /// Converts an epoch link restored from a pre-RPROP buffer.
    pub(crate) fn promote_to_resilient(&mut self, config: &RpropConfig) {
        if let LinkKind::Batched { delta, accumulator } = self.kind {
            self.kind = LinkKind::Resilient(ResilientState { delta, accumulator, eta: config.initial_eta });
        }
    }

    pub(crate) fn write(&self, writer: &mut FlatWriter) {
        writer.push(self.weight);
        match self.kind {
            LinkKind::Plain => {}
            LinkKind::Momentum { delta } => writer.push(delta),
            LinkKind::Batched { delta, accumulator } => {
                writer.push(delta);
                writer.push(accumulator);
            }
            LinkKind::Resilient(state) => {
                writer.push(state.delta);
                writer.push(state.accumulator);
                writer.push(state.eta);
            }
        }
    }

    pub(crate) fn read(&mut self, reader: &mut FlatReader) -> Result<()> {
        self.weight = reader.read()?;
        match &mut self.kind {
            LinkKind::Plain => {}
            LinkKind::Momentum { delta } => *delta = reader.read()?,
            LinkKind::Batched { delta, accumulator } => {
                *delta = reader.read()?;
                *accumulator = reader.read()?;
            }
            LinkKind::Resilient(state) => {
                state.delta = reader.read()?;
                state.accumulator = reader.read()?;
                state.eta = reader.read()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_link_applies_delta_directly() {
        let mut link = Link::new(0, 1, 0.5, LinkKind::Plain);
        link.update_weight(0.25, &Sgd::new(1.0, 0.9));
        assert_eq!(link.weight(), 0.75);
        assert_eq!(link.previous_delta(), None);
    }

    #[test]
    fn momentum_link_remembers_delta() {
        let mut link = Link::new(0, 1, 0.0, LinkKind::Momentum { delta: 0.0 });
        let sgd = Sgd::new(1.0, 0.5);
        link.update_weight(0.2, &sgd);
        link.update_weight(0.2, &sgd);
        assert!((link.weight() - 0.5).abs() < 1e-12);
        assert_eq!(link.previous_delta(), Some(0.2));
    }

    #[test]
    fn batched_link_waits_for_epoch() {
        let mut link = Link::new(0, 1, 1.0, LinkKind::Batched { delta: 0.0, accumulator: 0.0 });
        let sgd = Sgd::new(1.0, 0.0);
        link.update_weight(0.2, &sgd);
        link.update_weight(0.4, &sgd);
        assert_eq!(link.weight(), 1.0);
        assert!((link.accumulator().unwrap() - 0.6).abs() < 1e-12);

        link.epoch(2, &sgd, &RpropConfig::default());
        assert!((link.weight() - 1.3).abs() < 1e-12);
        assert_eq!(link.accumulator(), Some(0.0));
    }

    #[test]
    fn promotion_keeps_history() {
        let config = RpropConfig::default();
        let mut link = Link::new(0, 1, 1.0, LinkKind::Batched { delta: 0.1, accumulator: 0.2 });
        link.promote_to_resilient(&config);
        assert_eq!(link.previous_delta(), Some(0.1));
        assert_eq!(link.accumulator(), Some(0.2));
        assert_eq!(link.step_size(), Some(config.initial_eta));
    }

    #[test]
    fn resilient_state_round_trips() {
        let state = ResilientState { delta: -0.1, accumulator: 0.3, eta: 0.07 };
        let link = Link::new(2, 5, 0.4, LinkKind::Resilient(state));
        let mut writer = FlatWriter::new();
        link.write(&mut writer);
        let data = writer.into_inner();
        assert_eq!(data, vec![0.4, -0.1, 0.3, 0.07]);

        let config = RpropConfig::default();
        let mut restored = Link::new(2, 5, 0.0, LinkKind::Resilient(ResilientState::new(&config)));
        restored.read(&mut FlatReader::new(&data)).unwrap();
        assert_eq!(restored, link);
    }
}
