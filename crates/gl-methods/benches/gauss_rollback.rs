use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gl_methods::{centered, FastScheme, GaussRollback, RollbackKind};
use std::hint::black_box;

const H: f64 = 0.01;
const VAR: f64 = 0.05;

fn kinked_payoff(n: usize) -> Vec<f64> {
    centered(n, H).into_iter().map(|x| (x.exp() - 1.0).max(0.0)).collect()
}

fn bench_schemes(c: &mut Criterion) {
    let n = 1024;
    let schemes = [
        ("explicit", RollbackKind::Explicit),
        ("implicit", RollbackKind::Implicit),
        ("crank_nicolson", RollbackKind::CrankNicolson),
        ("fft2", RollbackKind::Fft2),
        ("fft", RollbackKind::Fft),
        ("chain_fft2", RollbackKind::Chain(FastScheme::Fft2)),
        ("chain_crank_nicolson", RollbackKind::Chain(FastScheme::CrankNicolson)),
    ];

    let mut group = c.benchmark_group("gauss_rollback");
    group.throughput(Throughput::Elements(n as u64));
    for (name, kind) in schemes {
        let r = kind.build().assigned(n, H, VAR);
        let payoff = kinked_payoff(n);
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut v = payoff.clone();
                r.rollback(black_box(&mut v));
                black_box(v)
            })
        });
    }
    group.finish();
}

fn bench_fft_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft_rollback_size");
    for n in [256usize, 1000, 1024, 4096] {
        let r = GaussRollback::fft().assigned(n, H, VAR);
        let payoff = kinked_payoff(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &payoff, |b, p| {
            b.iter(|| {
                let mut v = p.clone();
                r.rollback(&mut v);
                black_box(v)
            })
        });
    }
    group.finish();
}

fn bench_configuration(c: &mut Criterion) {
    let proto = GaussRollback::default();
    c.bench_function("chain_fft2_assign", |b| {
        b.iter(|| black_box(proto.assigned(black_box(2048), H, VAR)))
    });
}

criterion_group!(benches, bench_schemes, bench_fft_sizes, bench_configuration);
criterion_main!(benches);
