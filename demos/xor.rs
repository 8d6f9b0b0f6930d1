use neurograph::{LayeredNetwork, NeuralNetwork, TrainConfig, train_loop};

fn main() -> neurograph::Result<()> {
    // Layered networks carry no bias node, so a constant third input stands in
    // for one.
    let mut network = LayeredNetwork::rprop(&[3, 4, 1])?;

    let inputs = vec![
        vec![1.0, 0.0, 1.0],
        vec![1.0, 1.0, 1.0],
        vec![0.0, 1.0, 1.0],
        vec![0.0, 0.0, 1.0],
    ];
    let expected_outputs = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];

    for round in 0..10 {
        let loss = train_loop(&mut network, &inputs, &expected_outputs, &TrainConfig::new(100, 0))?;
        println!("Epoch {}: loss = {loss:.6}", round * 100);
    }

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", &input[..2], network.forward(input)?[0]);
    }

    let flat = network.to_flat();
    println!("Serialized to {} values", flat.len());
    Ok(())
}
