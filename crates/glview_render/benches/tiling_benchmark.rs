//! # Tiling Benchmark
//!
//! Tile planning for large images, and the software canvas paths a frame
//! spends most of its time in.

#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glview_render::image::{plan_tiles, FrameSequence, StreamingEngine};
use glview_render::pixels::{PixelBuffer, Rgba};
use glview_render::{Canvas, Color, SoftwareCanvas, StreamingConfig};

fn bench_plan_tiles(c: &mut Criterion) {
    c.bench_function("plan_tiles_4096x4096", |b| {
        b.iter(|| black_box(plan_tiles(black_box(4_096), black_box(4_096))));
    });
}

fn bench_fill(c: &mut Criterion) {
    let mut canvas = SoftwareCanvas::new(256, 256);
    c.bench_function("fill_rect_rotated", |b| {
        b.iter(|| {
            canvas.save();
            canvas.translate(128.0, 128.0);
            canvas.rotate(black_box(30.0));
            canvas.fill_rect(-64.0, -64.0, 128.0, 128.0, Color::rgba(0.2, 0.4, 0.8, 0.5));
            canvas.restore();
        });
    });
}

fn bench_image_draw(c: &mut Criterion) {
    let engine = StreamingEngine::new(StreamingConfig::default());
    let pixels = PixelBuffer::from_fn(600, 300, |x, y| Rgba::new(x as u8, y as u8, 0, 255));
    let texture = engine.create_texture(Arc::new(FrameSequence::still(pixels)));
    let mut canvas = SoftwareCanvas::new(300, 150);

    c.bench_function("image_texture_draw_half_scale", |b| {
        b.iter(|| {
            texture.draw(&mut canvas, 0.0, 0.0, 300.0, 150.0);
            black_box(canvas.pixel(150, 75))
        });
    });
}

criterion_group!(benches, bench_plan_tiles, bench_fill, bench_image_draw);
criterion_main!(benches);
