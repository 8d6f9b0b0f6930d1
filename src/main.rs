// Builds a network from a JSON blueprint and prints its shape and flat size.
// The engine itself lives in the library (src/lib.rs and its modules).
//
//   cargo run -- path/to/blueprint.json
//   cargo run --example xor
use neurograph::{NetworkBlueprint, Result};

fn main() {
    let Some(path) = std::env::args().nth(1) else {
        println!("neurograph: a node/link neural network engine in Rust.");
        println!("Usage: neurograph <blueprint.json>");
        println!("Run `cargo run --example xor` to see the XOR demo.");
        return;
    };
    if let Err(err) = describe(&path) {
        eprintln!("neurograph: {}", err);
        std::process::exit(1);
    }
}

fn describe(path: &str) -> Result<()> {
    let blueprint = NetworkBlueprint::load_json(path)?;
    let network = blueprint.build()?;
    println!("family:  {:?} (tag {})", network.kind(), network.kind().tag());
    println!("inputs:  {}", network.input_count());
    println!("outputs: {}", network.output_count());
    println!("nodes:   {}", network.node_count());
    println!("links:   {}", network.link_count());
    println!("flat:    {} values", network.to_flat().len());
    Ok(())
}
