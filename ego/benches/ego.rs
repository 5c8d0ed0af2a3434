use criterion::{criterion_group, criterion_main, Criterion};
use egolearn_ego::{EgorBuilder, InfillStrategy};
use ndarray::{array, Array2, ArrayView2, Zip};

/// Rosenbrock test function: min f(x)=0 at x=(1, 1)
fn rosenb(x: &ArrayView2<f64>) -> Array2<f64> {
    let mut y: Array2<f64> = Array2::zeros((x.nrows(), 1));
    Zip::from(y.rows_mut()).and(x.rows()).par_for_each(|mut yi, xi| {
        yi.assign(&array![argmin_testfunctions::rosenbrock_ab(
            &xi.to_vec(),
            1.,
            100.
        )])
    });
    y
}

fn criterion_ego(c: &mut Criterion) {
    let xlimits = array![[-2., 2.], [-2., 2.]];
    let mut group = c.benchmark_group("ego");
    group.sample_size(10);
    group.bench_function("ego rosenbrock", |b| {
        b.iter(|| {
            std::hint::black_box(
                EgorBuilder::optimize(rosenb)
                    .configure(|config| {
                        config
                            .infill_strategy(InfillStrategy::EI)
                            .max_iters(10)
                            .target(5e-1)
                            .seed(42)
                    })
                    .min_within(&xlimits)
                    .expect("Egor configured")
                    .run()
                    .expect("Minimization"),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, criterion_ego);
criterion_main!(benches);
