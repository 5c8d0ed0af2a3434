use clap::Parser;
use egolearn_nb::NaiveBayes;
use linfa::prelude::*;
use ndarray::array;

/// Guess the sex of a person from height, weight and foot size
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Height in meters
    #[arg(long, default_value_t = 1.81)]
    height: f64,
    /// Weight in kilograms
    #[arg(long, default_value_t = 59.)]
    weight: f64,
    /// Foot size in centimeters
    #[arg(long, default_value_t = 21.)]
    foot: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let x = array![
        [1.8288, 81.6466, 30.48],
        [1.8044, 86.1825, 27.94],
        [1.7008, 77.1107, 30.48],
        [1.8044, 74.8427, 25.40],
        [1.5240, 45.3592, 15.24],
        [1.6764, 68.0389, 20.32],
        [1.6520, 58.9670, 17.78],
        [1.7526, 68.0389, 22.86],
    ];
    let y = array![0usize, 0, 0, 0, 1, 1, 1, 1];
    let model = NaiveBayes::params().fit(&Dataset::new(x, y))?;
    println!("{model}");

    let xtest = array![[args.height, args.weight, args.foot]];
    let scores = model.log_scores(&xtest)?;
    let probas = model.predict_proba(&xtest)?;
    for (k, label) in ["male", "female"].iter().enumerate() {
        println!(
            "{label:>6}: log score = {:.4}, posterior = {:.6}",
            scores[[0, k]],
            probas[[0, k]]
        );
    }
    let guess = model.predict(&xtest);
    println!("Guess: {}", if guess[0] == 0 { "male" } else { "female" });
    Ok(())
}
