use criterion::{criterion_group, criterion_main, Criterion};
use tinmesh::{Mesh, Vertex};

fn random_vertices(n: u32) -> Vec<Vertex> {
  // Deterministic, dependency-free pseudo-random sequence (xorshift) so
  // the benchmark doesn't depend on `rand`'s non-deterministic seeding.
  let mut state = 0x2545F4914F6CDD1Du64;
  let mut next = || {
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    (state as f64) / (u64::MAX as f64)
  };
  (0..n)
    .map(|i| Vertex::new(next() * 1000.0, next() * 1000.0, 0.0, i))
    .collect()
}

fn bench_insert(c: &mut Criterion) {
  c.bench_function("insert_10k_random_vertices", |b| {
    b.iter_batched(
      || random_vertices(10_000),
      |verts| {
        let mut mesh = Mesh::new(1.0).unwrap();
        mesh.insert_all(verts).unwrap();
        mesh
      },
      criterion::BatchSize::LargeInput,
    )
  });
}

criterion_group!(benches, bench_insert);
criterion_main!(benches);
