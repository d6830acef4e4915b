//! Image content: a streamed texture drawn fit-center.

use std::sync::{Arc, Weak};

use glview_core::LaunchLatch;
use glview_render::image::{ImageSource, ImageTexture, StreamingEngine, Uploader};
use glview_render::{Canvas, Color, Drawable, FadeTexture, RenderHost, TextureCallback};
use tracing::debug;

use super::{MeasureSpec, NodeContent, SceneNode};

/// Turns "new frame decoded" into a render request.
struct FrameRequest(Arc<dyn RenderHost>);

impl TextureCallback for FrameRequest {
    fn invalidate_texture(&self) {
        self.0.request_render();
    }
}

/// Shows one image scaled to fit, centered.
///
/// On attach the tiles are queued for background upload and animation
/// starts. Pause stops the animation and resume restarts it. Detach
/// recycles the texture, so a detached node shows nothing anymore.
pub struct ImageNode {
    engine: StreamingEngine,
    texture: Arc<ImageTexture>,
    fade_in: Option<(Color, u64)>,
    fade: Option<FadeTexture<Arc<ImageTexture>>>,
    latch: Option<Arc<LaunchLatch>>,
    host: Option<Arc<dyn RenderHost>>,
    uploader: Option<Uploader>,
    callback: Option<Arc<FrameRequest>>,
    paused: bool,
}

impl std::fmt::Debug for ImageNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageNode")
            .field("texture", &self.texture)
            .field("fading", &self.fade.is_some())
            .field("attached", &self.host.is_some())
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

impl ImageNode {
    /// Creates the texture for `image` on `engine`.
    #[must_use]
    pub fn new(engine: &StreamingEngine, image: Arc<dyn ImageSource>) -> Self {
        Self::from_texture(engine, engine.create_texture(image))
    }

    /// Wraps an existing texture created on `engine`.
    #[must_use]
    pub fn from_texture(engine: &StreamingEngine, texture: Arc<ImageTexture>) -> Self {
        Self {
            engine: engine.clone(),
            texture,
            fade_in: None,
            fade: None,
            latch: None,
            host: None,
            uploader: None,
            callback: None,
            paused: false,
        }
    }

    /// Fades the image in from `color` over `duration_ms` once attached.
    #[must_use]
    pub fn with_fade_in(mut self, color: Color, duration_ms: u64) -> Self {
        self.fade_in = Some((color, duration_ms));
        self
    }

    /// Wraps the content in a node.
    #[must_use]
    pub fn into_node(self) -> SceneNode {
        SceneNode::new(self)
    }

    /// The texture.
    #[must_use]
    pub fn texture(&self) -> &Arc<ImageTexture> {
        &self.texture
    }

    /// Whether a fade-in is still running.
    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    fn fit_center(&self, width: f32, height: f32) -> (f32, f32, f32, f32) {
        let (iw, ih) = (self.texture.width() as f32, self.texture.height() as f32);
        if iw <= 0.0 || ih <= 0.0 {
            return (0.0, 0.0, 0.0, 0.0);
        }
        let scale = (width / iw).min(height / ih);
        let (w, h) = (iw * scale, ih * scale);
        ((width - w) / 2.0, (height - h) / 2.0, w, h)
    }
}

impl NodeContent for ImageNode {
    fn measure(
        &mut self,
        width: MeasureSpec,
        height: MeasureSpec,
        _children: &mut [SceneNode],
    ) -> (f32, f32) {
        (
            width.resolve(self.texture.width() as f32),
            height.resolve(self.texture.height() as f32),
        )
    }

    fn render(&mut self, canvas: &mut dyn Canvas, width: f32, height: f32) {
        let (x, y, w, h) = self.fit_center(width, height);
        let Some(fade) = &mut self.fade else {
            self.texture.draw(canvas, x, y, w, h);
            return;
        };

        if let Some(start) = self.latch.as_ref().and_then(|latch| latch.take()) {
            fade.set_start_time(start);
        }
        let animating = fade.update(self.engine.clock().now_ms());
        fade.draw(canvas, x, y, w, h);
        if animating {
            if let Some(host) = &self.host {
                host.request_render();
            }
        } else {
            self.fade = None;
            self.latch = None;
        }
    }

    fn on_attach(&mut self, host: &Arc<dyn RenderHost>) {
        if self.texture.is_recycled() {
            debug!("recycled image attached, nothing to show");
            return;
        }
        let uploader = self.engine.uploader(Arc::clone(host));
        uploader.add_texture(Arc::clone(&self.texture));
        self.uploader = Some(uploader);

        let callback = Arc::new(FrameRequest(Arc::clone(host)));
        let weak: Weak<dyn TextureCallback> = Arc::downgrade(&callback) as Weak<FrameRequest>;
        self.texture.set_callback(weak);
        self.callback = Some(callback);

        if let Some((color, duration_ms)) = self.fade_in {
            let latch = Arc::new(LaunchLatch::new());
            host.register_launched_animation(Arc::clone(&latch));
            self.latch = Some(latch);
            self.fade = Some(
                FadeTexture::fade_in(Arc::clone(&self.texture), color).with_duration(duration_ms),
            );
        }

        self.host = Some(Arc::clone(host));
        if !self.paused {
            self.texture.start();
        }
    }

    fn on_detach(&mut self) {
        self.texture.stop();
        self.texture.clear_callback();
        if let Some(uploader) = self.uploader.take() {
            uploader.clear();
        }
        self.callback = None;
        self.fade = None;
        self.latch = None;
        self.host = None;
        self.texture.recycle();
    }

    fn on_pause(&mut self) {
        self.paused = true;
        self.texture.stop();
    }

    fn on_resume(&mut self) {
        self.paused = false;
        if self.host.is_some() {
            self.texture.start();
        }
    }
}
