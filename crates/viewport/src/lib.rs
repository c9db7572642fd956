//! Viewport and scene render engine.
//!
//! Maps a live world snapshot onto a pannable, zoomable 2D surface and turns
//! pointer input into viewport changes and agent selection. Nothing here
//! touches a window: the scene is painted into a [`scene::DrawList`] of
//! screen-space commands that a shell (the `viz` crate) replays.
//!
//! Components, leaves first:
//! - [`mapper`]: screen/world conversion for a [`ViewportTransform`]
//! - [`controller`]: pan, cursor-anchored zoom and camera follow
//! - [`pointer`]: drag-versus-click classification
//! - [`hit_test`]: nearest agent under a point
//! - [`scene`]: layered, deterministic painting of a snapshot
//! - [`engine`]: the composition root that ties them together

pub mod classify;
pub mod config;
pub mod controller;
pub mod engine;
pub mod mapper;
pub mod mode;
pub mod palette;
pub mod pointer;
pub mod scene;

pub use config::{CameraConfig, ConfigError, PointerConfig, RenderConfig, ViewportConfig};
pub use controller::{ScaleBounds, ViewportController};
pub use engine::{ControlSink, RenderEngine};
pub use hit_test::HitTester;
pub use mapper::{to_screen, to_world, ViewportTransform};
pub use mode::RenderMode;
pub use pointer::{GestureOutcome, GestureSink, PointerButton, PointerStateMachine};
pub use scene::{DrawCommand, DrawList, Layer, Scene, SceneRenderer, Surface, TextAnchor};

pub use bevy_color::Color;
pub use bevy_math::{Rect, Vec2};
