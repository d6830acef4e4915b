//! # Scene Tree
//!
//! A retained tree of [`SceneNode`]s. Each node owns its children and a
//! [`NodeContent`] that decides how it measures, lays out its children,
//! draws and reacts to touch.
//!
//! ```text
//! measure(spec) ─► layout(bounds) ─► render(canvas)
//!      │                 │                 │
//!  content.measure   content.layout   translate(bounds) ─► content.render ─► children
//! ```
//!
//! The tree is built on the UI thread and handed to the root; from then on
//! it is only touched under the render lock.

mod image;
mod nodes;

use std::sync::Arc;

use glview_core::Rect;
use glview_render::{Canvas, RenderHost};

use crate::input::{TouchAction, TouchEvent};

pub use image::ImageNode;
pub use nodes::{ColorNode, ContainerNode, StackAxis};

/// Size constraint handed down during measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasureSpec {
    /// The size is imposed.
    Exactly(f32),
    /// Any size up to the bound.
    AtMost(f32),
    /// No constraint.
    Unspecified,
}

impl MeasureSpec {
    /// Applies the constraint to a preferred size.
    #[must_use]
    pub fn resolve(self, preferred: f32) -> f32 {
        match self {
            Self::Exactly(size) => size,
            Self::AtMost(max) => preferred.min(max),
            Self::Unspecified => preferred,
        }
    }

    /// The bound, if there is one.
    #[must_use]
    pub fn bound(self) -> Option<f32> {
        match self {
            Self::Exactly(size) | Self::AtMost(size) => Some(size),
            Self::Unspecified => None,
        }
    }

    /// A loosened version of this spec for a child.
    #[must_use]
    pub fn loosen(self) -> Self {
        match self {
            Self::Exactly(size) | Self::AtMost(size) => Self::AtMost(size),
            Self::Unspecified => Self::Unspecified,
        }
    }
}

/// Behavior of one scene node.
///
/// Every method has a default, so a content only overrides what it needs.
/// All methods run under the render lock.
pub trait NodeContent: Send {
    /// Returns the node's size under the constraints. Measures the children
    /// it wants to size itself on.
    ///
    /// The default measures every child with the same specs and wraps the
    /// largest.
    fn measure(
        &mut self,
        width: MeasureSpec,
        height: MeasureSpec,
        children: &mut [SceneNode],
    ) -> (f32, f32) {
        let (mut w, mut h) = (0.0_f32, 0.0_f32);
        for child in children.iter_mut() {
            let (cw, ch) = child.measure(width, height);
            w = w.max(cw);
            h = h.max(ch);
        }
        (width.resolve(w), height.resolve(h))
    }

    /// Places the children inside a `width` x `height` node. The default
    /// stretches every child over the whole node.
    fn layout(&mut self, width: f32, height: f32, children: &mut [SceneNode]) {
        for child in children {
            child.layout(Rect::new(0.0, 0.0, width, height));
        }
    }

    /// Draws the node's own content in local coordinates, under its
    /// children.
    fn render(&mut self, _canvas: &mut dyn Canvas, _width: f32, _height: f32) {}

    /// Handles a touch in local coordinates. Returns true if consumed.
    fn on_touch(&mut self, _event: &TouchEvent) -> bool {
        false
    }

    /// The node joined a root.
    fn on_attach(&mut self, _host: &Arc<dyn RenderHost>) {}

    /// The node left its root.
    fn on_detach(&mut self) {}

    /// The root was paused.
    fn on_pause(&mut self) {}

    /// The root was resumed.
    fn on_resume(&mut self) {}
}

/// A node in the scene tree.
pub struct SceneNode {
    content: Box<dyn NodeContent>,
    children: Vec<SceneNode>,
    bounds: Rect,
    measured: (f32, f32),
    visible: bool,
    host: Option<Arc<dyn RenderHost>>,
    /// Child that took the current gesture's DOWN.
    touch_target: Option<usize>,
}

impl std::fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("bounds", &self.bounds)
            .field("measured", &self.measured)
            .field("visible", &self.visible)
            .field("attached", &self.is_attached())
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl SceneNode {
    /// Creates a detached, visible node.
    #[must_use]
    pub fn new(content: impl NodeContent + 'static) -> Self {
        Self {
            content: Box::new(content),
            children: Vec::new(),
            bounds: Rect::ZERO,
            measured: (0.0, 0.0),
            visible: true,
            host: None,
            touch_target: None,
        }
    }

    /// Builder form of [`add_child`](Self::add_child).
    #[must_use]
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.add_child(child);
        self
    }

    /// Appends a child on top of the others. Attaches it if this node is
    /// attached.
    pub fn add_child(&mut self, mut child: SceneNode) {
        if let Some(host) = &self.host {
            child.attach(host);
        }
        self.children.push(child);
        self.request_layout();
    }

    /// Removes and detaches the child at `index`.
    pub fn remove_child(&mut self, index: usize) -> Option<SceneNode> {
        if index >= self.children.len() {
            return None;
        }
        if let Some(target) = self.touch_target {
            if target == index {
                self.children[index].cancel_touch();
                self.touch_target = None;
            } else if target > index {
                self.touch_target = Some(target - 1);
            }
        }
        let mut child = self.children.remove(index);
        child.detach();
        self.request_layout();
        Some(child)
    }

    /// The children, bottom to top.
    #[must_use]
    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// One child, mutably.
    pub fn child_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        self.children.get_mut(index)
    }

    /// The node's content.
    #[must_use]
    pub fn content(&self) -> &dyn NodeContent {
        self.content.as_ref()
    }

    /// The node's content, mutably.
    pub fn content_mut(&mut self) -> &mut dyn NodeContent {
        self.content.as_mut()
    }

    /// Bounds in the parent's coordinates, as of the last layout.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Size from the last measure.
    #[must_use]
    pub fn measured_size(&self) -> (f32, f32) {
        self.measured
    }

    /// Whether the node draws and receives touches.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the node.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            if let Some(host) = &self.host {
                host.request_render();
            }
        }
    }

    /// Whether the node belongs to a root.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    /// Asks the root for a new layout pass.
    pub fn request_layout(&self) {
        if let Some(host) = &self.host {
            host.request_layout();
        }
    }

    /// Measures the node and stores the result.
    pub fn measure(&mut self, width: MeasureSpec, height: MeasureSpec) -> (f32, f32) {
        self.measured = self.content.measure(width, height, &mut self.children);
        self.measured
    }

    /// Places the node and lays out its children.
    pub fn layout(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.content
            .layout(bounds.width, bounds.height, &mut self.children);
    }

    /// Draws the node and its children.
    pub fn render(&mut self, canvas: &mut dyn Canvas) {
        if !self.visible {
            return;
        }
        canvas.save();
        canvas.translate(self.bounds.x, self.bounds.y);
        self.content
            .render(canvas, self.bounds.width, self.bounds.height);
        for child in &mut self.children {
            child.render(canvas);
        }
        canvas.restore();
    }

    /// Delivers a touch given in the parent's coordinates.
    ///
    /// A DOWN goes to the topmost visible child under the point, then to the
    /// node's own content. Once a child takes a DOWN, the rest of the
    /// gesture goes to it until UP or CANCEL.
    pub fn dispatch_touch(&mut self, event: &TouchEvent) -> bool {
        let local = event.offset(-self.bounds.x, -self.bounds.y);

        if let Some(index) = self.touch_target {
            if local.action == TouchAction::Down {
                // A new gesture while the last one never ended.
                if let Some(child) = self.children.get_mut(index) {
                    child.dispatch_touch(&local.with_action(TouchAction::Cancel));
                }
                self.touch_target = None;
            } else {
                let handled = self
                    .children
                    .get_mut(index)
                    .is_some_and(|child| child.dispatch_touch(&local));
                if local.action.ends_gesture() {
                    self.touch_target = None;
                }
                return handled;
            }
        }

        if local.action == TouchAction::Down {
            for index in (0..self.children.len()).rev() {
                let child = &mut self.children[index];
                if child.visible
                    && child.bounds.contains(local.x, local.y)
                    && child.dispatch_touch(&local)
                {
                    self.touch_target = Some(index);
                    return true;
                }
            }
        }
        self.content.on_touch(&local)
    }

    fn cancel_touch(&mut self) {
        let cancel = TouchEvent::new(TouchAction::Cancel, 0.0, 0.0, 0);
        if let Some(index) = self.touch_target.take() {
            if let Some(child) = self.children.get_mut(index) {
                child.cancel_touch();
            }
        }
        self.content.on_touch(&cancel);
    }

    /// Joins a root. Contents are attached parent first.
    pub fn attach(&mut self, host: &Arc<dyn RenderHost>) {
        if self.host.is_some() {
            return;
        }
        self.host = Some(Arc::clone(host));
        self.content.on_attach(host);
        for child in &mut self.children {
            child.attach(host);
        }
    }

    /// Leaves the root. Children are detached first.
    pub fn detach(&mut self) {
        if self.host.is_none() {
            return;
        }
        for child in &mut self.children {
            child.detach();
        }
        self.content.on_detach();
        self.host = None;
        self.touch_target = None;
    }

    /// Propagates a pause through the subtree.
    pub fn pause(&mut self) {
        self.content.on_pause();
        for child in &mut self.children {
            child.pause();
        }
    }

    /// Propagates a resume through the subtree.
    pub fn resume(&mut self) {
        self.content.on_resume();
        for child in &mut self.children {
            child.resume();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<String>>>);

    impl Log {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().push(entry.into());
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.lock())
        }
    }

    struct TouchLogger {
        name: &'static str,
        log: Log,
        consume: bool,
    }

    impl NodeContent for TouchLogger {
        fn on_touch(&mut self, event: &TouchEvent) -> bool {
            self.log
                .push(format!("{} {:?} {} {}", self.name, event.action, event.x, event.y));
            self.consume
        }

        fn on_attach(&mut self, _host: &Arc<dyn RenderHost>) {
            self.log.push(format!("{} attach", self.name));
        }

        fn on_detach(&mut self) {
            self.log.push(format!("{} detach", self.name));
        }
    }

    fn logger(name: &'static str, log: &Log, consume: bool) -> SceneNode {
        SceneNode::new(TouchLogger {
            name,
            log: log.clone(),
            consume,
        })
    }

    fn down(x: f32, y: f32) -> TouchEvent {
        TouchEvent::new(TouchAction::Down, x, y, 0)
    }

    #[test]
    fn test_measure_spec_resolve() {
        assert_eq!(MeasureSpec::Exactly(10.0).resolve(50.0), 10.0);
        assert_eq!(MeasureSpec::AtMost(10.0).resolve(50.0), 10.0);
        assert_eq!(MeasureSpec::AtMost(100.0).resolve(50.0), 50.0);
        assert_eq!(MeasureSpec::Unspecified.resolve(50.0), 50.0);
    }

    #[test]
    fn test_topmost_child_wins() {
        let log = Log::default();
        let mut root = logger("root", &log, false)
            .with_child(logger("bottom", &log, true))
            .with_child(logger("top", &log, true));
        root.measure(MeasureSpec::Exactly(100.0), MeasureSpec::Exactly(100.0));
        root.layout(Rect::new(0.0, 0.0, 100.0, 100.0));

        assert!(root.dispatch_touch(&down(10.0, 10.0)));
        assert_eq!(log.take(), vec!["top Down 10 10"]);
    }

    #[test]
    fn test_gesture_sticks_to_target() {
        let log = Log::default();
        let mut root = logger("root", &log, false).with_child(logger("child", &log, true));
        root.layout(Rect::new(0.0, 0.0, 100.0, 100.0));
        root.children[0].layout(Rect::new(50.0, 50.0, 50.0, 50.0));

        assert!(root.dispatch_touch(&down(60.0, 70.0)));
        // Outside the child, still delivered to it in its coordinates.
        let mv = TouchEvent::new(TouchAction::Move, 0.0, 0.0, 1);
        assert!(root.dispatch_touch(&mv));
        let up = TouchEvent::new(TouchAction::Up, 55.0, 55.0, 2);
        assert!(root.dispatch_touch(&up));
        assert_eq!(
            log.take(),
            vec!["child Down 10 20", "child Move -50 -50", "child Up 5 5"]
        );

        // The gesture is over: a MOVE now goes to the root content.
        assert!(!root.dispatch_touch(&mv));
        assert_eq!(log.take(), vec!["root Move 0 0"]);
    }

    #[test]
    fn test_unhandled_down_falls_through() {
        let log = Log::default();
        let mut root = logger("root", &log, true).with_child(logger("child", &log, false));
        root.layout(Rect::new(0.0, 0.0, 100.0, 100.0));

        assert!(root.dispatch_touch(&down(1.0, 1.0)));
        assert_eq!(log.take(), vec!["child Down 1 1", "root Down 1 1"]);
    }

    #[test]
    fn test_hidden_child_gets_nothing() {
        let log = Log::default();
        let mut root = logger("root", &log, false).with_child(logger("child", &log, true));
        root.layout(Rect::new(0.0, 0.0, 100.0, 100.0));
        root.children[0].set_visible(false);

        assert!(!root.dispatch_touch(&down(1.0, 1.0)));
        assert_eq!(log.take(), vec!["root Down 1 1"]);
    }

    #[test]
    fn test_remove_target_cancels_gesture() {
        let log = Log::default();
        let mut root = logger("root", &log, false).with_child(logger("child", &log, true));
        root.layout(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(root.dispatch_touch(&down(1.0, 1.0)));
        log.take();

        let removed = root.remove_child(0);
        assert!(removed.is_some());
        assert_eq!(log.take(), vec!["child Cancel 0 0"]);
        assert!(root.remove_child(0).is_none());
    }
}
