use criterion::{black_box, criterion_group, criterion_main, Criterion};
use egolearn_doe::{Lhs, LhsKind, SamplingMethod};
use ndarray::aview1;

fn criterion_lhs(c: &mut Criterion) {
    let dims = [2, 20];
    let sizes = [10, 200];
    let kinds = [LhsKind::Classic, LhsKind::Maximin];

    let mut group = c.benchmark_group("doe");
    group.sample_size(10);
    let bounds = aview1(&[0., 1.]);
    for kind in kinds {
        for dim in dims {
            for size in sizes {
                group.bench_function(format!("lhs-{kind:?}-{dim}-dim-{size}-size"), |b| {
                    let xlimits = bounds.broadcast((dim, 2)).unwrap();
                    b.iter(|| black_box(Lhs::new(&xlimits).kind(kind).sample(size)));
                });
            }
        }
    }
    group.finish();
}

criterion_group!(benches, criterion_lhs);
criterion_main!(benches);
