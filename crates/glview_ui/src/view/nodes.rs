//! Stock node contents.

use glview_core::Rect;
use glview_render::{Canvas, Color};

use super::{MeasureSpec, NodeContent, SceneNode};

/// A flat rectangle of color with a preferred size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorNode {
    color: Color,
    preferred: (f32, f32),
}

impl ColorNode {
    /// A color that fills whatever it is given.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            preferred: (0.0, 0.0),
        }
    }

    /// Sets the size reported when unconstrained.
    #[must_use]
    pub const fn with_size(mut self, width: f32, height: f32) -> Self {
        self.preferred = (width, height);
        self
    }

    /// The fill color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }
}

impl NodeContent for ColorNode {
    fn measure(
        &mut self,
        width: MeasureSpec,
        height: MeasureSpec,
        _children: &mut [SceneNode],
    ) -> (f32, f32) {
        (width.resolve(self.preferred.0), height.resolve(self.preferred.1))
    }

    fn render(&mut self, canvas: &mut dyn Canvas, width: f32, height: f32) {
        if self.color.a > 0.0 {
            canvas.fill_rect(0.0, 0.0, width, height, self.color);
        }
    }
}

/// How a [`ContainerNode`] places its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StackAxis {
    /// Every child fills the container, later children on top.
    #[default]
    Overlay,
    /// Children top to bottom at their measured height.
    Vertical,
    /// Children left to right at their measured width.
    Horizontal,
}

/// A container stacking its children along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerNode {
    axis: StackAxis,
    spacing: f32,
    background: Option<Color>,
}

impl ContainerNode {
    /// A container with the given axis and no background.
    #[must_use]
    pub const fn new(axis: StackAxis) -> Self {
        Self {
            axis,
            spacing: 0.0,
            background: None,
        }
    }

    /// Sets the gap between stacked children.
    #[must_use]
    pub const fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Fills the container before its children draw.
    #[must_use]
    pub const fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// The stacking axis.
    #[must_use]
    pub const fn axis(&self) -> StackAxis {
        self.axis
    }

    fn gaps(&self, children: usize) -> f32 {
        self.spacing * children.saturating_sub(1) as f32
    }
}

impl NodeContent for ContainerNode {
    fn measure(
        &mut self,
        width: MeasureSpec,
        height: MeasureSpec,
        children: &mut [SceneNode],
    ) -> (f32, f32) {
        let gaps = self.gaps(children.len());
        let (mut w, mut h) = (0.0_f32, 0.0_f32);
        match self.axis {
            StackAxis::Overlay => {
                for child in children.iter_mut() {
                    let (cw, ch) = child.measure(width.loosen(), height.loosen());
                    w = w.max(cw);
                    h = h.max(ch);
                }
            }
            StackAxis::Vertical => {
                for child in children.iter_mut() {
                    let (cw, ch) = child.measure(width.loosen(), MeasureSpec::Unspecified);
                    w = w.max(cw);
                    h += ch;
                }
                h += gaps;
            }
            StackAxis::Horizontal => {
                for child in children.iter_mut() {
                    let (cw, ch) = child.measure(MeasureSpec::Unspecified, height.loosen());
                    w += cw;
                    h = h.max(ch);
                }
                w += gaps;
            }
        }
        (width.resolve(w), height.resolve(h))
    }

    fn layout(&mut self, width: f32, height: f32, children: &mut [SceneNode]) {
        let mut offset = 0.0;
        for child in children {
            let (cw, ch) = child.measured_size();
            match self.axis {
                StackAxis::Overlay => child.layout(Rect::new(0.0, 0.0, width, height)),
                StackAxis::Vertical => {
                    child.layout(Rect::new(0.0, offset, width, ch));
                    offset += ch + self.spacing;
                }
                StackAxis::Horizontal => {
                    child.layout(Rect::new(offset, 0.0, cw, height));
                    offset += cw + self.spacing;
                }
            }
        }
    }

    fn render(&mut self, canvas: &mut dyn Canvas, width: f32, height: f32) {
        if let Some(color) = self.background {
            canvas.fill_rect(0.0, 0.0, width, height, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glview_render::SoftwareCanvas;

    fn bar(w: f32, h: f32) -> SceneNode {
        SceneNode::new(ColorNode::new(Color::WHITE).with_size(w, h))
    }

    #[test]
    fn test_vertical_stack() {
        let mut root = SceneNode::new(ContainerNode::new(StackAxis::Vertical).with_spacing(5.0))
            .with_child(bar(10.0, 20.0))
            .with_child(bar(30.0, 40.0));

        let size = root.measure(MeasureSpec::AtMost(100.0), MeasureSpec::Unspecified);
        assert_eq!(size, (30.0, 65.0));
        root.layout(Rect::new(0.0, 0.0, size.0, size.1));

        assert_eq!(root.children()[0].bounds(), Rect::new(0.0, 0.0, 30.0, 20.0));
        assert_eq!(root.children()[1].bounds(), Rect::new(0.0, 25.0, 30.0, 40.0));
    }

    #[test]
    fn test_horizontal_stack_respects_exact_size() {
        let mut root = SceneNode::new(ContainerNode::new(StackAxis::Horizontal))
            .with_child(bar(10.0, 20.0))
            .with_child(bar(30.0, 40.0));

        let size = root.measure(MeasureSpec::Exactly(200.0), MeasureSpec::Exactly(50.0));
        assert_eq!(size, (200.0, 50.0));
        root.layout(Rect::new(0.0, 0.0, 200.0, 50.0));
        assert_eq!(root.children()[1].bounds(), Rect::new(10.0, 0.0, 30.0, 50.0));
    }

    #[test]
    fn test_overlay_renders_in_order() {
        let mut root = SceneNode::new(
            ContainerNode::new(StackAxis::Overlay).with_background(Color::rgb(1.0, 0.0, 0.0)),
        )
        .with_child(SceneNode::new(ColorNode::new(Color::rgb(0.0, 0.0, 1.0))));
        root.measure(MeasureSpec::Exactly(8.0), MeasureSpec::Exactly(8.0));
        root.layout(Rect::new(0.0, 0.0, 8.0, 8.0));

        let mut canvas = SoftwareCanvas::new(8, 8);
        root.render(&mut canvas);
        let px = canvas.pixel(4, 4);
        assert_eq!((px.r, px.g, px.b, px.a), (0, 0, 255, 255));
    }

    #[test]
    fn test_hidden_node_draws_nothing() {
        let mut root = SceneNode::new(ColorNode::new(Color::WHITE));
        root.layout(Rect::new(0.0, 0.0, 8.0, 8.0));
        root.set_visible(false);

        let mut canvas = SoftwareCanvas::new(8, 8);
        root.render(&mut canvas);
        assert_eq!(canvas.pixel(4, 4).a, 0);
    }
}
