//! Desktop shell for the agent viewport: Bevy window, input and painting.

pub mod camera;
pub mod control;
pub mod hud;
pub mod input;
pub mod painter;
pub mod plugin;
pub mod state_loader;

pub use plugin::{Viewer, ViewerPlugin, ViewerSettings, ViewerSystems};
