//! Integration test for tiled image streaming.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use glview_core::LaunchLatch;
use glview_render::image::{plan_tiles, Frame, FrameSequence, StreamingEngine, TileClass};
use glview_render::pixels::{PixelBuffer, Rgba};
use glview_render::{
    Canvas, IdleListener, RenderHost, SoftwareCanvas, StreamingConfig, TextureCallback,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Default)]
struct RecordingHost {
    renders: AtomicUsize,
    listeners: Mutex<Vec<Box<dyn IdleListener>>>,
}

impl RenderHost for RecordingHost {
    fn request_render(&self) {
        self.renders.fetch_add(1, Ordering::Relaxed);
    }

    fn request_layout(&self) {}

    fn add_idle_listener(&self, listener: Box<dyn IdleListener>) {
        self.listeners.lock().push(listener);
    }

    fn register_launched_animation(&self, _latch: Arc<LaunchLatch>) {}
}

#[derive(Default)]
struct Invalidations(AtomicUsize);

impl TextureCallback for Invalidations {
    fn invalidate_texture(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

fn gradient(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        Rgba::new((x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8, 255)
    })
}

fn solid_frame(value: u8, delay_ms: u64) -> Frame {
    Frame::new(PixelBuffer::filled(16, 16, Rgba::new(value, 0, 0, 255)), delay_ms)
}

#[test]
fn test_random_sizes_are_covered_exactly_once() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let width = rng.gen_range(1..2_000);
        let height = rng.gen_range(1..2_000);
        let tiles = plan_tiles(width, height);

        let area: u64 = tiles
            .iter()
            .map(|t| u64::from(t.width) * u64::from(t.height))
            .sum();
        assert_eq!(area, u64::from(width) * u64::from(height), "{width}x{height}");

        for (i, a) in tiles.iter().enumerate() {
            assert!(a.width <= a.class.content_size() && a.height <= a.class.content_size());
            assert!(a.x + a.width <= width && a.y + a.height <= height);
            for b in &tiles[i + 1..] {
                assert!(
                    a.content_rect().intersection(&b.content_rect()).is_none(),
                    "{a:?} overlaps {b:?} in {width}x{height}"
                );
            }
        }
    }
}

#[test]
fn test_drawn_image_matches_source_across_seams() {
    let engine = StreamingEngine::new(StreamingConfig::default());
    let pixels = gradient(600, 300);
    let texture = engine.create_texture(Arc::new(FrameSequence::still(pixels.clone())));
    assert_eq!(texture.tile_count(), 3);

    let mut canvas = SoftwareCanvas::new(600, 300);
    texture.draw(&mut canvas, 0.0, 0.0, 600.0, 300.0);

    for (x, y) in [(0, 0), (253, 10), (254, 10), (507, 299), (508, 0), (599, 299), (300, 150)] {
        let expected = pixels.get(x, y);
        let actual = canvas.pixel(x, y);
        let close = |a: u8, b: u8| a.abs_diff(b) <= 1;
        assert!(
            close(expected.r, actual.r)
                && close(expected.g, actual.g)
                && close(expected.b, actual.b),
            "pixel ({x}, {y}): expected {expected:?}, got {actual:?}"
        );
    }
}

#[test]
fn test_recycle_returns_every_tile() {
    let engine = StreamingEngine::new(StreamingConfig::default());
    let image = Arc::new(FrameSequence::still(gradient(1_100, 600)));
    let texture = engine.create_texture(image.clone());
    let tiles = texture.tile_count();
    assert!(tiles > 0);

    texture.recycle();
    let stats = engine.pool().stats();
    assert_eq!(stats.small_free + stats.large_free, tiles);
    assert_eq!(texture.tile_count(), 0);
    assert_eq!(image.release_count(), 1);

    // Only the texture's frame state still points at the image.
    drop(texture);
    assert_eq!(Arc::strong_count(&image), 1);

    // A second image of the same shape reuses every texture.
    let before = engine.pool().stats();
    let _again = engine.create_texture(Arc::new(FrameSequence::still(gradient(1_100, 600))));
    let after = engine.pool().stats();
    assert_eq!(after.small_created, before.small_created);
    assert_eq!(after.large_created, before.large_created);
    assert_eq!(engine.pool().free_count(TileClass::Small), 0);
    assert_eq!(engine.pool().free_count(TileClass::Large), 0);
}

#[test]
fn test_zero_budget_uploads_nothing() {
    let engine = StreamingEngine::new(StreamingConfig {
        upload_budget_ms: 0,
        ..StreamingConfig::default()
    });
    let host = Arc::new(RecordingHost::default());
    let uploader = engine.uploader(host.clone());
    let texture = engine.create_texture(Arc::new(FrameSequence::still(gradient(300, 300))));
    uploader.add_texture(texture.clone());

    let mut listener = host.listeners.lock().pop().unwrap();
    let mut canvas = SoftwareCanvas::new(8, 8);

    // A zero budget never uploads.
    assert!(listener.on_idle(&mut canvas, false));
    assert!(!texture.is_ready());
    assert_eq!(canvas.stats().uploads, 0);

    uploader.clear();
    assert!(!listener.on_idle(&mut canvas, false));
    assert_eq!(uploader.pending(), 0);
}

#[test]
fn test_animation_advances_and_notifies() {
    let engine = StreamingEngine::new(StreamingConfig::default());
    let image = Arc::new(FrameSequence::animated(vec![
        solid_frame(10, 5),
        solid_frame(20, 5),
        solid_frame(30, 5),
    ]));
    let texture = engine.create_texture(image.clone());
    let counter = Arc::new(Invalidations::default());
    let weak: Weak<dyn TextureCallback> = Arc::downgrade(&counter) as Weak<Invalidations>;
    texture.set_callback(weak);

    texture.start();
    assert!(texture.is_running());
    assert!(wait_until(Duration::from_secs(5), || image.advance_count() >= 3));
    assert!(counter.0.load(Ordering::Relaxed) >= 3);

    texture.stop();
    assert!(wait_until(Duration::from_secs(5), || !texture.has_animation_task()));
    let frozen = image.advance_count();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(image.advance_count(), frozen);

    texture.recycle();
    assert_eq!(image.release_count(), 1);
}

#[test]
fn test_start_during_decode_is_honored() {
    let engine = StreamingEngine::new(StreamingConfig::default());
    let decoder = Box::new(|| {
        thread::sleep(Duration::from_millis(40));
        Ok(vec![solid_frame(1, 5), solid_frame(2, 5), solid_frame(3, 5)])
    });
    let image = Arc::new(FrameSequence::deferred(solid_frame(0, 5), decoder));
    let texture = engine.create_texture(image.clone());

    texture.start();
    assert!(wait_until(Duration::from_secs(5), || image.advance_count() >= 2));

    texture.recycle();
    assert!(wait_until(Duration::from_secs(5), || !texture.has_animation_task()));
    assert_eq!(image.release_count(), 1);
}

#[test]
fn test_recycle_during_decode_defers_release() {
    let engine = StreamingEngine::new(StreamingConfig::default());
    let decoder = Box::new(|| {
        thread::sleep(Duration::from_millis(60));
        Ok(vec![solid_frame(1, 5), solid_frame(2, 5)])
    });
    let image = Arc::new(FrameSequence::deferred(solid_frame(0, 5), decoder));
    let texture = engine.create_texture(image.clone());

    assert!(wait_until(Duration::from_secs(5), || texture.has_animation_task()));
    thread::sleep(Duration::from_millis(10));
    texture.recycle();

    assert!(wait_until(Duration::from_secs(5), || !texture.has_animation_task()));
    assert_eq!(image.release_count(), 1);
    assert_eq!(image.advance_count(), 0);
}

#[test]
fn test_draw_picks_up_new_frame() {
    let engine = StreamingEngine::new(StreamingConfig::default());
    let image = Arc::new(FrameSequence::animated(vec![
        solid_frame(10, 1_000),
        solid_frame(200, 1_000),
    ]));
    let texture = engine.create_texture(image.clone());
    let mut canvas = SoftwareCanvas::new(16, 16);

    texture.draw(&mut canvas, 0.0, 0.0, 16.0, 16.0);
    assert_eq!(canvas.pixel(8, 8).r, 10);

    texture.start();
    assert!(wait_until(Duration::from_secs(5), || image.advance_count() >= 1));
    texture.draw(&mut canvas, 0.0, 0.0, 16.0, 16.0);
    assert_eq!(canvas.pixel(8, 8).r, 200);

    texture.recycle();
}
