use criterion::{criterion_group, criterion_main, Criterion};
use vbm_grid::{describe_config, generate_grid, GridParams};

fn bench_grid(c: &mut Criterion) {
    let params = GridParams::default();
    c.bench_function("grid_generate", |b| {
        b.iter(|| {
            let grid = generate_grid(&params);
            assert_eq!(grid.len(), 790);
        });
    });
    let grid = generate_grid(&params);
    c.bench_function("grid_describe", |b| {
        b.iter(|| {
            grid.iter()
                .map(|config| describe_config(config, "full sample").len())
                .sum::<usize>()
        });
    });
}

criterion_group!(benches, bench_grid);
criterion_main!(benches);
