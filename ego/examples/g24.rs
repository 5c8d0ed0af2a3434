use clap::Parser;
use egolearn_ego::EgorBuilder;
use env_logger::{Builder, Env};
use ndarray::{array, Array2, ArrayBase, ArrayView2, Data, Ix1, Zip};

// Function G24: 1 global optimum y_opt = -5.5080 at x_opt =(2.3295, 3.1785)
fn g24(x: &ArrayBase<impl Data<Elem = f64>, Ix1>) -> f64 {
    -x[0] - x[1]
}

// Constraints >= 0
fn g24_c1(x: &ArrayBase<impl Data<Elem = f64>, Ix1>) -> f64 {
    2.0 * x[0].powf(4.0) - 8.0 * x[0].powf(3.0) + 8.0 * x[0].powf(2.0) - x[1] + 2.0
}

fn g24_c2(x: &ArrayBase<impl Data<Elem = f64>, Ix1>) -> f64 {
    4.0 * x[0].powf(4.0) - 32.0 * x[0].powf(3.0) + 88.0 * x[0].powf(2.0) - 96.0 * x[0] - x[1]
        + 36.0
}

fn f_g24(x: &ArrayView2<f64>) -> Array2<f64> {
    let mut y = Array2::zeros((x.nrows(), 3));
    Zip::from(y.rows_mut()).and(x.rows()).for_each(|mut yi, xi| {
        yi.assign(&array![g24(&xi), g24_c1(&xi), g24_c2(&xi)]);
    });
    y
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short = 'n', long, default_value_t = 40)]
    max_iters: usize,
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Directory where configuration and history are saved
    #[arg(short, long)]
    outdir: Option<String>,
}

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let xlimits = array![[0., 3.], [0., 4.]];
    let res = EgorBuilder::optimize(f_g24)
        .configure(|config| {
            let config = config
                .n_cstr(2)
                .n_doe(10)
                .max_iters(args.max_iters)
                .target(-5.5080)
                .seed(args.seed);
            match args.outdir {
                Some(outdir) => config.outdir(outdir),
                None => config,
            }
        })
        .min_within(&xlimits)?
        .run()?;
    println!("G24 optim result = {} at x = {}", res.y_opt, res.x_opt);
    Ok(())
}
