use criterion::{criterion_group, criterion_main, Criterion};
use sable::{Position, Searcher};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_search(c: &mut Criterion) {
    let startpos = Position::start();

    c.bench_function("alpha_beta_depth_3_startpos", |b| {
        b.iter(|| Searcher::new().alpha_beta(&startpos, 3).unwrap().score)
    });

    let kiwipete: Position = KIWIPETE.parse().unwrap();
    c.bench_function("alpha_beta_depth_3_kiwipete", |b| {
        b.iter(|| Searcher::new().alpha_beta(&kiwipete, 3).unwrap().score)
    });

    c.bench_function("iterative_depth_4_startpos", |b| {
        b.iter(|| Searcher::new().iterative(&startpos, 4).unwrap().score)
    });

    c.bench_function("mtdf_depth_3_startpos", |b| {
        b.iter(|| Searcher::new().mtdf(&startpos, 3, 0).unwrap().score)
    });
}

fn bench_movegen(c: &mut Criterion) {
    let startpos = Position::start();
    c.bench_function("movegen_startpos", |b| {
        b.iter(|| startpos.legal_moves().count())
    });

    let kiwipete: Position = KIWIPETE.parse().unwrap();
    c.bench_function("movegen_kiwipete", |b| {
        b.iter(|| kiwipete.legal_moves().count())
    });
}

criterion_group!(benches, bench_search, bench_movegen);
criterion_main!(benches);
