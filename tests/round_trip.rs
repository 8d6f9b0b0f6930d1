//! Flat buffer persistence for every network family.

use neurograph::{
    AdalineNetwork, LayeredNetwork, NetworkKind, NeuralNetwork, NeuroError, RpropConfig,
    SelfOrganizingNetwork, SomConfig, Supervised, Uniform, UpdateRule,
};

fn layered(rule: UpdateRule, seed: u64) -> LayeredNetwork {
    LayeredNetwork::new(rule, 0.4, 0.7, &[3, 4, 2], &mut Uniform::seeded(seed)).unwrap()
}

/// Presents a couple of samples so values, errors and link history are not
/// all zero.
fn exercise<N: Supervised>(network: &mut N, input: &[f64], target: &[f64]) {
    network.run(input).unwrap();
    network.learn(target).unwrap();
    network.epoch(1);
    network.run(input).unwrap();
    network.learn(target).unwrap();
}

fn som_config() -> SomConfig {
    SomConfig {
        inputs: 3,
        rows: 2,
        columns: 2,
        initial_learning_rate: 0.6,
        final_learning_rate: 0.05,
        initial_neighborhood: 1,
        neighborhood_reduce_interval: 3,
        training_iterations: 20,
    }
}

#[test]
fn back_prop_round_trip() {
    let mut network = layered(UpdateRule::Immediate, 1);
    exercise(&mut network, &[0.1, 0.5, 0.9], &[1.0, 0.0]);
    assert!(network.graph().links().iter().any(|l| l.previous_delta() != Some(0.0)));

    let data = network.to_flat();
    let restored = LayeredNetwork::from_flat(UpdateRule::Immediate, &data).unwrap();
    assert_eq!(restored, network);
    assert_eq!(restored.to_flat(), data);
}

#[test]
fn epoch_back_prop_round_trip() {
    let mut network = layered(UpdateRule::Batched, 2);
    exercise(&mut network, &[0.3, 0.2, 0.1], &[0.0, 1.0]);
    assert!(network.graph().links().iter().any(|l| l.accumulator() != Some(0.0)));

    let data = network.to_flat();
    let restored = LayeredNetwork::from_flat(UpdateRule::Batched, &data).unwrap();
    assert_eq!(restored, network);
}

#[test]
fn rprop_round_trip_keeps_step_sizes() {
    let mut network = LayeredNetwork::rprop_with(RpropConfig::default(), &[3, 4, 2], &mut Uniform::seeded(3)).unwrap();
    for _ in 0..3 {
        exercise(&mut network, &[1.0, 0.0, 0.5], &[1.0, 0.0]);
        network.epoch(1);
    }
    assert!(network.graph().links().iter().any(|l| l.step_size() != Some(0.05)));

    let data = network.to_flat();
    let restored = LayeredNetwork::rprop_from_flat(RpropConfig::default(), &data).unwrap();
    assert_eq!(restored, network);
}

#[test]
fn adaline_round_trip() {
    let mut network = AdalineNetwork::with_rng(4, 0.05, &mut Uniform::seeded(4));
    exercise(&mut network, &[0.2, 0.4, 0.6, 0.8], &[-1.0]);

    let data = network.to_flat();
    assert_eq!(data[0], NetworkKind::Adaline.tag() as f64);
    let restored = AdalineNetwork::from_flat(&data).unwrap();
    assert_eq!(restored, network);
}

#[test]
fn som_round_trip() {
    let mut network = SelfOrganizingNetwork::with_rng(som_config(), &mut Uniform::seeded(5)).unwrap();
    for _ in 0..4 {
        network.train(&[0.9, 0.1, 0.4]).unwrap();
        network.epoch(1);
    }

    let data = network.to_flat();
    let restored = SelfOrganizingNetwork::from_flat(&data).unwrap();
    assert_eq!(restored.graph(), network.graph());
    assert_eq!(restored.config(), network.config());
    assert_eq!(restored.learning_rate(), network.learning_rate());
    assert_eq!(restored.to_flat(), data);
}

#[test]
fn load_flat_replaces_existing_network() {
    let source = layered(UpdateRule::Immediate, 6);
    let mut target = LayeredNetwork::new(UpdateRule::Immediate, 0.1, 0.0, &[1, 1], &mut Uniform::seeded(7)).unwrap();
    target.load_flat(&source.to_flat()).unwrap();
    assert_eq!(target, source);
}

#[test]
fn mismatched_tag_fails_without_mutation() {
    let epoch = layered(UpdateRule::Batched, 8);
    let mut network = layered(UpdateRule::Immediate, 9);
    let before = network.clone();

    match network.load_flat(&epoch.to_flat()) {
        Err(NeuroError::FormatMismatch { expected, found }) => {
            assert_eq!(expected, NetworkKind::BackProp);
            assert_eq!(found, NetworkKind::EpochBackProp.tag() as f64);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(network, before);
}

#[test]
fn adaline_rejects_other_families() {
    let som = SelfOrganizingNetwork::with_rng(som_config(), &mut Uniform::seeded(10)).unwrap();
    assert!(matches!(AdalineNetwork::from_flat(&som.to_flat()), Err(NeuroError::FormatMismatch { .. })));

    let back_prop = layered(UpdateRule::Immediate, 11);
    assert!(matches!(AdalineNetwork::from_flat(&back_prop.to_flat()), Err(NeuroError::FormatMismatch { .. })));
}

#[test]
fn som_rejects_wrong_tag() {
    let som = SelfOrganizingNetwork::with_rng(som_config(), &mut Uniform::seeded(12)).unwrap();
    let mut data = som.to_flat();
    data[7] = NetworkKind::BackProp.tag() as f64;
    assert!(matches!(SelfOrganizingNetwork::from_flat(&data), Err(NeuroError::FormatMismatch { .. })));
}

#[test]
fn epoch_buffer_loads_as_rprop() {
    let mut epoch = layered(UpdateRule::Batched, 13);
    exercise(&mut epoch, &[0.5, 0.5, 0.5], &[1.0, 1.0]);

    let config = RpropConfig { initial_eta: 0.1, ..RpropConfig::default() };
    let restored = LayeredNetwork::rprop_from_flat(config, &epoch.to_flat()).unwrap();
    assert_eq!(restored.kind(), NetworkKind::Rprop);
    for (old, new) in epoch.graph().links().iter().zip(restored.graph().links()) {
        assert_eq!(new.weight(), old.weight());
        assert_eq!(new.previous_delta(), old.previous_delta());
        assert_eq!(new.accumulator(), old.accumulator());
        assert_eq!(new.step_size(), Some(0.1));
    }
    assert_eq!(restored.to_flat()[4], NetworkKind::Rprop.tag() as f64);
}

#[test]
fn truncated_buffer_fails() {
    let network = layered(UpdateRule::Immediate, 14);
    let data = network.to_flat();
    let result = LayeredNetwork::from_flat(UpdateRule::Immediate, &data[..data.len() - 1]);
    assert!(matches!(result, Err(NeuroError::UnexpectedEnd { .. })));
}

#[test]
fn inconsistent_counts_fail() {
    let network = layered(UpdateRule::Immediate, 15);
    let mut data = network.to_flat();
    // layer count, three widths, tag, then the node count
    data[5] += 1.0;
    let result = LayeredNetwork::from_flat(UpdateRule::Immediate, &data);
    assert!(matches!(result, Err(NeuroError::CountMismatch { field: "node count", .. })));
}

#[test]
fn overflowing_header_counts_are_errors() {
    let wide = 2f64.powi(32);
    let result = LayeredNetwork::from_flat(UpdateRule::Immediate, &[2.0, wide, wide, 1.0, 0.0, 0.0]);
    assert!(matches!(result, Err(NeuroError::InvalidTopology(_))));

    let som = [0.5, 0.1, 1.0, 1.0, 10.0, wide, wide, 2.0, 1.0, 0.0];
    assert!(matches!(SelfOrganizingNetwork::from_flat(&som), Err(NeuroError::InvalidTopology(_))));
}

#[test]
fn header_larger_than_buffer_fails_before_building() {
    let result = LayeredNetwork::from_flat(UpdateRule::Immediate, &[1.0e15, 1.0]);
    assert!(matches!(result, Err(NeuroError::UnexpectedEnd { .. })));

    let layered = [2.0, 1.0e6, 1.0e6, 1.0, 2.0e6, 1.0e12, 0.0, 0.0];
    let result = LayeredNetwork::from_flat(UpdateRule::Immediate, &layered);
    assert!(matches!(result, Err(NeuroError::UnexpectedEnd { .. })));

    let som = [0.5, 0.1, 1.0, 1.0, 10.0, 1.0e5, 1.0e5, 2.0, 1.0e3, 1.0e13, 0.0];
    assert!(matches!(SelfOrganizingNetwork::from_flat(&som), Err(NeuroError::UnexpectedEnd { .. })));

    let adaline = [0.0, 1.0e12, 1.0e12 - 1.0, 0.0];
    assert!(matches!(AdalineNetwork::from_flat(&adaline), Err(NeuroError::UnexpectedEnd { .. })));
}

#[test]
fn independent_loads_do_not_interfere() {
    let a = layered(UpdateRule::Immediate, 16);
    let b = layered(UpdateRule::Immediate, 17);
    let (data_a, data_b) = (a.to_flat(), b.to_flat());

    let handle = std::thread::spawn(move || LayeredNetwork::from_flat(UpdateRule::Immediate, &data_b).unwrap());
    let restored_a = LayeredNetwork::from_flat(UpdateRule::Immediate, &data_a).unwrap();
    let restored_b = handle.join().unwrap();
    assert_eq!(restored_a, a);
    assert_eq!(restored_b, b);
}
