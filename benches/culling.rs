use criterion::{criterion_group, criterion_main, Criterion, black_box};

use culltrack::core::camera::CameraView;
use culltrack::culling::{CullingBackend, FrustumSnapshot, ParallelBackend, SequentialBackend};
use culltrack::events::CullState;
use culltrack::math::Aabb;

use glam::Vec3;

fn scatter_bounds(count: usize) -> Vec<Aabb> {
    let mut state = 0x9e37_79b9_7f4a_7c15u64;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) as f32 / (1u64 << 31) as f32) * 2.0 - 1.0
    };
    (0..count)
        .map(|_| {
            let center = Vec3::new(next() * 250.0, next() * 50.0, next() * 250.0);
            let half = Vec3::splat(next().abs() * 4.0 + 0.5);
            Aabb::from_center_half_extent(center, half)
        })
        .collect()
}

fn snapshot() -> FrustumSnapshot {
    let camera = CameraView::perspective(
        Vec3::new(0.0, 20.0, 120.0),
        Vec3::ZERO,
        60.0,
        16.0 / 9.0,
        0.1,
        1000.0,
    );
    FrustumSnapshot::from_camera(&camera)
}

fn bench_cull_sequential_2048(c: &mut Criterion) {
    let snapshot = snapshot();
    let bounds = scatter_bounds(2048);
    let mut out = vec![CullState::INVISIBLE; bounds.len()];

    c.bench_function("cull_sequential_2048", |b| {
        b.iter(|| {
            SequentialBackend.cull(black_box(&snapshot), black_box(&bounds), &mut out);
        });
    });
}

fn bench_cull_parallel_2048(c: &mut Criterion) {
    let snapshot = snapshot();
    let bounds = scatter_bounds(2048);
    let mut out = vec![CullState::INVISIBLE; bounds.len()];

    c.bench_function("cull_parallel_2048", |b| {
        b.iter(|| {
            ParallelBackend.cull(black_box(&snapshot), black_box(&bounds), &mut out);
        });
    });
}

fn bench_cull_parallel_8192(c: &mut Criterion) {
    let snapshot = snapshot();
    let bounds = scatter_bounds(8192);
    let mut out = vec![CullState::INVISIBLE; bounds.len()];

    c.bench_function("cull_parallel_8192", |b| {
        b.iter(|| {
            ParallelBackend.cull(black_box(&snapshot), black_box(&bounds), &mut out);
        });
    });
}

fn bench_world_bounds_parallel_8192(c: &mut Criterion) {
    let local = scatter_bounds(8192);
    let transforms: Vec<glam::Mat4> = (0..local.len())
        .map(|i| glam::Mat4::from_translation(Vec3::new(i as f32 * 0.1, 0.0, 0.0)))
        .collect();
    let mut world = vec![Aabb::default(); local.len()];

    c.bench_function("world_bounds_parallel_8192", |b| {
        b.iter(|| {
            ParallelBackend.refresh_world_bounds(
                black_box(&local),
                black_box(&transforms),
                &mut world,
            );
        });
    });
}

criterion_group!(
    benches,
    bench_cull_sequential_2048,
    bench_cull_parallel_2048,
    bench_cull_parallel_8192,
    bench_world_bounds_parallel_8192
);
criterion_main!(benches);
