use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fieldplot::{
    geo::Coordinate, optimizer, packer, rng::LayoutRng, BlockConfig, Species,
};

fn hectare_pentagon() -> Vec<Coordinate> {
    vec![
        Coordinate::new(-23.31000, -51.16000),
        Coordinate::new(-23.30960, -51.15930),
        Coordinate::new(-23.31010, -51.15870),
        Coordinate::new(-23.31080, -51.15900),
        Coordinate::new(-23.31075, -51.15985),
    ]
}

fn trial_config() -> BlockConfig {
    let species = ["Soja", "Milho", "Feijão", "Trigo"]
        .iter()
        .enumerate()
        .map(|(i, name)| Species::new(format!("t{}", i + 1), *name, "#FFFFFF").unwrap())
        .collect();
    BlockConfig::new(6.0, 45.0, 0.5, species)
}

fn bench_generate(c: &mut Criterion) {
    let parcel = hectare_pentagon();
    let config = trial_config().with_rotation(37.0);
    c.bench_function("generate_layout_1ha", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        b.iter(|| packer::generate_layout(black_box(&parcel), black_box(&config), &mut rng))
    });
}

fn bench_optimize(c: &mut Criterion) {
    let parcel = hectare_pentagon();
    let config = trial_config();
    let mut group = c.benchmark_group("optimize_layout_1ha");
    group.sample_size(10);
    group.bench_function("sequential", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        b.iter(|| optimizer::optimize_layout(black_box(&parcel), &config, &mut rng))
    });
    group.bench_function("parallel", |b| {
        let rng = LayoutRng::new(1);
        b.iter(|| optimizer::optimize_layout_par(black_box(&parcel), &config, &rng))
    });
    group.finish();
}

criterion_group!(benches, bench_generate, bench_optimize);
criterion_main!(benches);
