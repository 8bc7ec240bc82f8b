use criterion::{criterion_group, criterion_main, Criterion};
use sable::evaluation::evaluate;
use sable::Position;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_evaluation(c: &mut Criterion) {
    let startpos = Position::start();
    c.bench_function("evaluate_startpos", |b| b.iter(|| evaluate(&startpos)));

    let kiwipete: Position = KIWIPETE.parse().unwrap();
    c.bench_function("evaluate_kiwipete", |b| b.iter(|| evaluate(&kiwipete)));
}

fn bench_fen(c: &mut Criterion) {
    c.bench_function("parse_fen_kiwipete", |b| {
        b.iter(|| KIWIPETE.parse::<Position>().unwrap())
    });

    let kiwipete: Position = KIWIPETE.parse().unwrap();
    c.bench_function("to_fen_kiwipete", |b| b.iter(|| kiwipete.to_fen()));
}

criterion_group!(benches, bench_evaluation, bench_fen);
criterion_main!(benches);
