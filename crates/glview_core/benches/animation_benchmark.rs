//! # Animation Benchmark
//!
//! Per-frame cost of driving many animations, and of matrix composition
//! used by every draw call.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glview_core::anim::{FloatAnimation, Interpolator, RepeatCount, RepeatMode};
use glview_core::Matrix;

const ANIMATION_COUNT: usize = 10_000;

fn bench_calculate(c: &mut Criterion) {
    let mut animations: Vec<FloatAnimation> = (0..ANIMATION_COUNT)
        .map(|i| {
            FloatAnimation::float(0.0, i as f32, 300)
                .with_interpolator(Interpolator::ExponentialOut)
                .with_repeat(RepeatCount::Infinite, RepeatMode::Reverse)
        })
        .collect();
    for anim in &mut animations {
        anim.start_at(0);
    }

    let mut now = 0_u64;
    c.bench_function("calculate_10k_animations", |b| {
        b.iter(|| {
            now += 16;
            let mut sum = 0.0;
            for anim in &mut animations {
                anim.calculate(now);
                sum += anim.value();
            }
            black_box(sum)
        });
    });
}

fn bench_matrix_concat(c: &mut Criterion) {
    c.bench_function("matrix_translate_rotate_scale", |b| {
        b.iter(|| {
            let mut m = Matrix::IDENTITY;
            m.pre_translate(black_box(12.0), black_box(40.0));
            m.pre_rotate(black_box(33.0));
            m.pre_scale(black_box(1.5), black_box(0.75));
            black_box(m.invert())
        });
    });
}

criterion_group!(benches, bench_calculate, bench_matrix_concat);
criterion_main!(benches);
