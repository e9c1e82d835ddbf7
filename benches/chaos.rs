//! The hot loop: one worker iterating, and the composite of its buffer.

#[macro_use]
extern crate criterion;
extern crate chaosgame;

use chaosgame::accumulate::AccumulationBuffer;
use chaosgame::composite::composite;
use chaosgame::planes::PlaneMapper;
use chaosgame::worker::{Worker, FUSE_LENGTH};
use chaosgame::{presets, CancelToken, ColorMaps, Config};
use criterion::{black_box, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

const SIZE: usize = 256;

fn setup(name: &str) -> (Config, PlaneMapper) {
    let config = presets::config(name, &ColorMaps::default()).unwrap();
    let window = chaosgame::calibrate::calibrate(&config, &mut StdRng::seed_from_u64(1)).unwrap();
    let plane = PlaneMapper::new(SIZE, SIZE, window.percentile);
    (config, plane)
}

fn worker_steps(c: &mut Criterion) {
    for &name in &["sierpinski", "fern", "leaf"] {
        let (config, plane) = setup(name);
        c.bench_function(&format!("step {}", name), move |b| {
            let buffer = AccumulationBuffer::new(SIZE, SIZE);
            let mut worker = Worker::new(&config, &plane, &buffer, 2);
            worker.run(Some(FUSE_LENGTH), &CancelToken::new());
            b.iter(|| {
                worker.step();
                black_box(worker.point())
            })
        });
    }
}

fn composite_buffers(c: &mut Criterion) {
    let (config, plane) = setup("fern");
    let buffers: Vec<AccumulationBuffer> =
        (0..4).map(|_| AccumulationBuffer::new(SIZE, SIZE)).collect();
    for (index, buffer) in buffers.iter().enumerate() {
        Worker::new(&config, &plane, buffer, index as u64).run(Some(200_000), &CancelToken::new());
    }
    c.bench_function("composite 4 buffers", move |b| {
        b.iter(|| black_box(composite(&buffers).to_rgb()))
    });
}

criterion_group!(benches, worker_steps, composite_buffers);
criterion_main!(benches);
