use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tinmesh::{Mesh, Vertex};

fn build_grid_mesh(side: u32) -> Mesh {
  let mut mesh = Mesh::new(1.0).unwrap();
  let mut verts = Vec::new();
  let mut idx = 0u32;
  for i in 0..side {
    for j in 0..side {
      verts.push(Vertex::new(i as f64, j as f64, 0.0, idx));
      idx += 1;
    }
  }
  mesh.insert_all(verts).unwrap();
  mesh
}

fn bench_locate(c: &mut Criterion) {
  let mut mesh = build_grid_mesh(40);
  c.bench_function("locate_in_grid_mesh", |b| {
    b.iter(|| {
      let loc = mesh.locate(black_box(19.3), black_box(21.7));
      black_box(loc);
    })
  });
}

criterion_group!(benches, bench_locate);
criterion_main!(benches);
