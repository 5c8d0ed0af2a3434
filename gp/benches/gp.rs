use criterion::{black_box, criterion_group, criterion_main, Criterion};
use egolearn_doe::{Lhs, SamplingMethod};
use egolearn_gp::correlation_models::SquaredExponentialCorr;
use egolearn_gp::mean_models::ConstantMean;
use egolearn_gp::GaussianProcess;
use linfa::prelude::{Dataset, Fit};
use ndarray::{Array1, Array2, Zip};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn griewank(x: &Array1<f64>) -> f64 {
    let d = Array1::linspace(1., x.len() as f64, x.len()).mapv(|v| v.sqrt());
    x.mapv(|v| v * v).sum() / 4000. - (x / &d).mapv(|v| v.cos()).fold(1., |acc, x| acc * x) + 1.0
}

fn criterion_gp(c: &mut Criterion) {
    let dims = [2, 5, 10];
    let nts = [20, 50, 100];

    let mut group = c.benchmark_group("gp");
    group.sample_size(10);
    for (&dim, &nt) in dims.iter().zip(nts.iter()) {
        let mut xlimits = Array2::zeros((dim, 2));
        xlimits.column_mut(0).fill(-600.);
        xlimits.column_mut(1).fill(600.);
        let xt = Lhs::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(nt);
        let mut yt: Array1<f64> = Array1::zeros(xt.nrows());
        Zip::from(&mut yt)
            .and(xt.rows())
            .par_for_each(|y, x| *y = griewank(&x.to_owned()));

        group.bench_function(format!("gp {dim}d {nt}pts"), |b| {
            b.iter(|| {
                black_box(
                    GaussianProcess::<f64, ConstantMean, SquaredExponentialCorr>::params(
                        ConstantMean::default(),
                        SquaredExponentialCorr::default(),
                    )
                    .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
                    .expect("GP fit error"),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_gp);
criterion_main!(benches);
