use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;

use rand::Rng;
use rand::SeedableRng;

use fieldtree::{Columns, Count, Field, Flat, SplitMethod};

fn random_catalog(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
    let coord1: Vec<f64> = (0..n).map(|_| rng.gen_range(-1000.0..1000.0)).collect();
    let coord2: Vec<f64> = (0..n).map(|_| rng.gen_range(-1000.0..1000.0)).collect();
    let w = vec![1.0; n];
    (coord1, coord2, w)
}

fn flat_from_row(i: usize, columns: &Columns) -> Result<(f64, f64), fieldtree::FieldError> {
    Ok((columns.coord1[i], columns.coord2[i]))
}

fn partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    group
        .significance_level(0.05)
        .measurement_time(std::time::Duration::new(10, 0));

    for &n in &[1_000_usize, 10_000, 100_000] {
        let (coord1, coord2, w) = random_catalog(n, 0);

        let bench_name = format!("flat-count-n{n}");
        group.bench_function(&bench_name, |b| {
            b.iter_with_large_drop(|| {
                let columns = Columns {
                    coord1: &coord1,
                    coord2: &coord2,
                    g1: &[],
                    g2: &[],
                    k: &[],
                    w: &w,
                };
                Field::<Count, Flat>::build(columns, n, 1.0, 100.0, 0.2, SplitMethod::Mean, 0, flat_from_row).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, partition);
criterion_main!(benches);
