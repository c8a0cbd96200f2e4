use corelib::{HashRing, NodeAddr};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn ring_with(nodes: usize) -> HashRing {
    let addrs: Vec<NodeAddr> = (0..nodes)
        .map(|i| NodeAddr::parse(&format!("10.0.{}.{}:8090", i / 256, i % 256)).unwrap())
        .collect();
    HashRing::from_nodes(&addrs).unwrap()
}

fn bench_owner(c: &mut Criterion) {
    for nodes in [3, 64, 1024] {
        let ring = ring_with(nodes);
        c.bench_function(&format!("owner/{nodes}_nodes"), |b| {
            b.iter(|| ring.owner(black_box("video-42/chunk-00017.m4s")))
        });
    }
}

criterion_group!(benches, bench_owner);
criterion_main!(benches);
