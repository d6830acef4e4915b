//! # GLVIEW UI
//!
//! The render-loop controller and the scene tree it drives:
//! - [`GlRoot`]: render thread, frame pipeline, freeze barrier, idle queue
//! - [`SceneNode`]: retained tree with measure, layout, render and touch
//! - [`ImageNode`]: streamed images, uploaded between frames
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use glview_render::{Color, SoftwareCanvas};
//! use glview_ui::{ColorNode, GlRoot, RootConfig, SceneNode};
//!
//! let root = GlRoot::new(RootConfig::default())?;
//! root.set_content_pane(Some(SceneNode::new(ColorNode::new(Color::WHITE))));
//! root.surface_created(Box::new(SoftwareCanvas::new(64, 64)))?;
//! root.surface_changed(64, 64)?;
//! assert!(root.wait_for_frames(1, Duration::from_secs(1)));
//! # Ok::<(), glview_ui::RootError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod input;
pub mod orientation;
pub mod root;
pub mod view;

pub use config::{GlviewConfig, RootConfig};
pub use error::{ConfigError, ConfigResult, RootError, RootResult};
pub use input::{TouchAction, TouchEvent};
pub use orientation::{FixedOrientation, OrientationSource};
pub use root::{
    compensation_matrix, BoxedCanvas, GlRoot, Lifecycle, RenderLock, RenderState, RootHandle,
    RootStats,
};
pub use view::{ColorNode, ContainerNode, ImageNode, MeasureSpec, NodeContent, SceneNode, StackAxis};
