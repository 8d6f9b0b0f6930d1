use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::math::random::Uniform;
use crate::network::adaline::AdalineNetwork;
use crate::network::kind::NetworkKind;
use crate::network::layered::{LayeredNetwork, UpdateRule};
use crate::network::network::NeuralNetwork;
use crate::network::som::{SelfOrganizingNetwork, SomConfig};
use crate::optim::rprop::RpropConfig;

/// A fully serializable description of a network family and its
/// hyperparameters.
///
/// `NetworkBlueprint` can be saved to / loaded from JSON independently of the
/// trained weights, and is what pairs a flat weight buffer with the family
/// that should read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum NetworkBlueprint {
    Adaline {
        inputs: usize,
        learning_rate: f64,
    },
    BackProp {
        layers: Vec<usize>,
        learning_rate: f64,
        momentum: f64,
    },
    EpochBackProp {
        layers: Vec<usize>,
        learning_rate: f64,
        momentum: f64,
    },
    Rprop {
        layers: Vec<usize>,
        #[serde(default)]
        config: RpropConfig,
    },
    SelfOrganizing(SomConfig),
}

impl NetworkBlueprint {
    pub fn kind(&self) -> NetworkKind {
        match self {
            NetworkBlueprint::Adaline { .. } => NetworkKind::Adaline,
            NetworkBlueprint::BackProp { .. } => NetworkKind::BackProp,
            NetworkBlueprint::EpochBackProp { .. } => NetworkKind::EpochBackProp,
            NetworkBlueprint::Rprop { .. } => NetworkKind::Rprop,
            NetworkBlueprint::SelfOrganizing(_) => NetworkKind::SelfOrganizing,
        }
    }

    /// Builds a freshly initialized network.
    pub fn build(&self) -> Result<Box<dyn NeuralNetwork>> {
        self.build_with(&mut Uniform::new())
    }

    /// Builds a freshly initialized network, drawing weights from `rng`.
    pub fn build_with(&self, rng: &mut Uniform) -> Result<Box<dyn NeuralNetwork>> {
        let network: Box<dyn NeuralNetwork> = match self {
            NetworkBlueprint::Adaline { inputs, learning_rate } => {
                Box::new(AdalineNetwork::with_rng(*inputs, *learning_rate, rng))
            }
            NetworkBlueprint::BackProp { layers, learning_rate, momentum } => {
                Box::new(LayeredNetwork::new(UpdateRule::Immediate, *learning_rate, *momentum, layers, rng)?)
            }
            NetworkBlueprint::EpochBackProp { layers, learning_rate, momentum } => {
                Box::new(LayeredNetwork::new(UpdateRule::Batched, *learning_rate, *momentum, layers, rng)?)
            }
            NetworkBlueprint::Rprop { layers, config } => Box::new(LayeredNetwork::rprop_with(*config, layers, rng)?),
            NetworkBlueprint::SelfOrganizing(config) => Box::new(SelfOrganizingNetwork::with_rng(config.clone(), rng)?),
        };
        Ok(network)
    }

    /// Restores a network of this family from a flat weight buffer. Shape
    /// and trained state come from the buffer; only the RPROP constants are
    /// taken from the blueprint.
    pub fn restore(&self, data: &[f64]) -> Result<Box<dyn NeuralNetwork>> {
        let network: Box<dyn NeuralNetwork> = match self {
            NetworkBlueprint::Adaline { .. } => Box::new(AdalineNetwork::from_flat(data)?),
            NetworkBlueprint::BackProp { .. } => Box::new(LayeredNetwork::from_flat(UpdateRule::Immediate, data)?),
            NetworkBlueprint::EpochBackProp { .. } => Box::new(LayeredNetwork::from_flat(UpdateRule::Batched, data)?),
            NetworkBlueprint::Rprop { config, .. } => Box::new(LayeredNetwork::rprop_from_flat(*config, data)?),
            NetworkBlueprint::SelfOrganizing(_) => Box::new(SelfOrganizingNetwork::from_flat(data)?),
        };
        Ok(network)
    }

    /// Serializes the blueprint to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkBlueprint` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkBlueprint> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_family_tagged_json() {
        let blueprint: NetworkBlueprint = serde_json::from_str(
            r#"{ "family": "rprop", "layers": [100, 63, 26] }"#,
        )
        .unwrap();
        assert_eq!(blueprint, NetworkBlueprint::Rprop { layers: vec![100, 63, 26], config: RpropConfig::default() });
        assert_eq!(blueprint.kind(), NetworkKind::Rprop);
    }

    #[test]
    fn partial_rprop_config_keeps_defaults() {
        let blueprint: NetworkBlueprint = serde_json::from_str(
            r#"{ "family": "rprop", "layers": [2, 1], "config": { "max_eta": 10.0 } }"#,
        )
        .unwrap();
        match blueprint {
            NetworkBlueprint::Rprop { config, .. } => {
                assert_eq!(config.max_eta, 10.0);
                assert_eq!(config.eta_plus, 1.2);
            }
            other => panic!("unexpected blueprint: {:?}", other),
        }
    }

    #[test]
    fn som_blueprint_is_flattened() {
        let json = r#"{
            "family": "self_organizing",
            "inputs": 4, "rows": 3, "columns": 3,
            "initial_learning_rate": 0.5, "final_learning_rate": 0.05,
            "initial_neighborhood": 2, "neighborhood_reduce_interval": 10,
            "training_iterations": 100
        }"#;
        let blueprint: NetworkBlueprint = serde_json::from_str(json).unwrap();
        let network = blueprint.build_with(&mut Uniform::seeded(3)).unwrap();
        assert_eq!(network.kind(), NetworkKind::SelfOrganizing);
        assert_eq!(network.link_count(), 4 * 9);
    }

    #[test]
    fn built_kind_matches_blueprint() {
        let blueprints = [
            NetworkBlueprint::Adaline { inputs: 3, learning_rate: 0.1 },
            NetworkBlueprint::BackProp { layers: vec![3, 2, 1], learning_rate: 0.3, momentum: 0.9 },
            NetworkBlueprint::EpochBackProp { layers: vec![3, 2, 1], learning_rate: 0.3, momentum: 0.9 },
            NetworkBlueprint::Rprop { layers: vec![3, 2, 1], config: RpropConfig::default() },
        ];
        for blueprint in blueprints {
            let network = blueprint.build_with(&mut Uniform::seeded(9)).unwrap();
            assert_eq!(network.kind(), blueprint.kind());
            let restored = blueprint.restore(&network.to_flat()).unwrap();
            assert_eq!(restored.graph(), network.graph());
        }
    }

    #[test]
    fn json_file_round_trip() {
        let path = std::env::temp_dir().join(format!("neurograph-blueprint-{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        let blueprint = NetworkBlueprint::EpochBackProp { layers: vec![4, 3, 2], learning_rate: 0.25, momentum: 0.5 };
        blueprint.save_json(path).unwrap();
        let loaded = NetworkBlueprint::load_json(path).unwrap();
        std::fs::remove_file(path).unwrap();
        assert_eq!(loaded, blueprint);
    }
}
