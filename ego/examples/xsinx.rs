use clap::Parser;
use egolearn_ego::{EgorBuilder, InfillStrategy};
use env_logger::{Builder, Env};
use ndarray::{array, Array2, ArrayView2};

/// A one-dimensional test function, x in [0., 25.] and min xsinx(x) ~ -15.1 at x ~ 18.9
fn xsinx(x: &ArrayView2<f64>) -> Array2<f64> {
    (x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of iterations (one new evaluation each)
    #[arg(short = 'n', long, default_value_t = 20)]
    max_iters: usize,
    /// Infill criterion: ei, sb or lcb
    #[arg(short, long, default_value = "ei")]
    infill: String,
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let infill = match args.infill.as_str() {
        "ei" => InfillStrategy::EI,
        "sb" => InfillStrategy::SB,
        "lcb" => InfillStrategy::LCB { k: 3. },
        other => anyhow::bail!("unknown infill criterion {other}, expected ei, sb or lcb"),
    };
    let doe = array![[0.], [7.], [25.]];
    let res = EgorBuilder::optimize(xsinx)
        .configure(|config| {
            let config = config
                .infill_strategy(infill)
                .doe(&doe)
                .max_iters(args.max_iters);
            match args.seed {
                Some(seed) => config.seed(seed),
                None => config,
            }
        })
        .min_within(&array![[0., 25.]])?
        .run()?;
    println!("Minimum xsinx(x) = {} at x = {}", res.y_opt, res.x_opt);
    Ok(())
}
