//! # Headless Demo
//!
//! Runs the whole pipeline without a window: a render thread drawing into a
//! `SoftwareCanvas`, an animated image streamed in tiles with a fade-in, a
//! tap on the image and a quarter turn of the display.
//!
//! ```text
//! cargo run --bin glview_demo [config.toml]
//! RUST_LOG=glview_ui=debug,glview_render=trace cargo run --bin glview_demo
//! ```

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glview::core::FrameClock;
use glview::render::image::{Frame, FrameSequence};
use glview::render::pixels::{PixelBuffer, Rgba};
use glview::ui::{ColorNode, ContainerNode, FixedOrientation, StackAxis};
use glview::{
    Color, GlRoot, GlviewConfig, ImageNode, SceneNode, SoftwareCanvas, StreamingEngine,
    TouchAction, TouchEvent,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SURFACE: (u32, u32) = (320, 240);
const FRAME_WAIT: Duration = Duration::from_secs(2);

/// A diagonal gradient whose hue shifts with `phase`.
fn gradient(width: u32, height: u32, phase: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        let t = (x + y + phase * 40) % 256;
        Rgba::new(t as u8, (255 - t) as u8, ((x * 255) / width.max(1)) as u8, 255)
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading config");
            GlviewConfig::from_file(path)?
        }
        None => GlviewConfig::default(),
    };

    let engine = StreamingEngine::new(config.streaming.clone());
    let frames = (0..6)
        .map(|phase| Frame::new(gradient(640, 360, phase), 80))
        .collect();
    let image = ImageNode::new(&engine, Arc::new(FrameSequence::animated(frames)))
        .with_fade_in(Color::BLACK, 300);
    let texture = Arc::clone(image.texture());

    let scene = SceneNode::new(
        ContainerNode::new(StackAxis::Vertical)
            .with_spacing(4.0)
            .with_background(Color::rgb(0.1, 0.1, 0.12)),
    )
    .with_child(SceneNode::new(
        ColorNode::new(Color::rgb(0.9, 0.4, 0.1)).with_size(0.0, 24.0),
    ))
    .with_child(image.into_node());

    let orientation = Arc::new(FixedOrientation::new(0, 0));
    let root = GlRoot::from_config(&config)?;
    root.set_orientation_source(Some(orientation.clone()));
    root.set_content_pane(Some(scene));
    root.surface_created(Box::new(SoftwareCanvas::new(SURFACE.0, SURFACE.1)))?;
    root.surface_changed(SURFACE.0, SURFACE.1)?;
    if !root.wait_for_frames(1, FRAME_WAIT) {
        warn!("first frame did not arrive");
    }

    let started = Instant::now();
    while !texture.is_ready() && started.elapsed() < FRAME_WAIT {
        thread::sleep(Duration::from_millis(4));
    }
    info!(
        ready = texture.is_ready(),
        tiles = texture.tile_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "image uploaded"
    );

    // Let the animation and the fade run for a while.
    thread::sleep(Duration::from_millis(600));

    let now = engine.clock().now_ms();
    let (cx, cy) = (SURFACE.0 as f32 / 2.0, SURFACE.1 as f32 / 2.0);
    let down = root.dispatch_touch(TouchEvent::new(TouchAction::Down, cx, cy, now));
    let up = root.dispatch_touch(TouchEvent::new(TouchAction::Up, cx, cy, now + 50));
    info!(down, up, "tap dispatched");

    orientation.set(90, 90);
    let before = root.stats().frames;
    root.request_render();
    if !root.wait_for_frames(before + 1, FRAME_WAIT) {
        warn!("rotated frame did not arrive");
    }
    info!(
        rotation = root.display_rotation(),
        compensation = root.compensation(),
        "display rotated"
    );

    root.pause();
    let stats = root.stats();
    info!(
        frames = stats.frames,
        slow_frames = stats.slow_frames,
        last_frame_ms = stats.last_frame_ms,
        idle_runs = stats.idle_runs,
        "render loop stats"
    );
    let pool = engine.pool().stats();
    let workers = engine.worker_stats();
    info!(?pool, ?workers, "streaming stats");

    drop(root);
    if !engine.shutdown(Duration::from_secs(1)) {
        warn!("decode workers did not exit in time");
    }
    Ok(())
}
