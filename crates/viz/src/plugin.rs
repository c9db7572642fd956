//! Main viewer plugin that ties all systems together.

use bevy::prelude::*;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use viewport::{RenderEngine, RenderMode, ViewportConfig};

use crate::camera::CameraPlugin;
use crate::control::JsonlControlSink;
use crate::hud::HudPlugin;
use crate::input::InputPlugin;
use crate::painter::PainterPlugin;
use crate::state_loader::StateLoaderPlugin;

/// Startup options, usually from the command line.
#[derive(Resource, Debug, Clone)]
pub struct ViewerSettings {
    /// Snapshot file written by the simulation.
    pub state_path: PathBuf,
    /// JSON-lines file control commands are appended to.
    pub commands_path: PathBuf,
    pub config: ViewportConfig,
    pub mode: RenderMode,
    /// Initial window size in logical pixels.
    pub window_size: Vec2,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("output/current_state.json"),
            commands_path: PathBuf::from("output/commands.jsonl"),
            config: ViewportConfig::default(),
            mode: RenderMode::default(),
            window_size: Vec2::new(1280.0, 720.0),
        }
    }
}

/// The render engine as a Bevy resource.
#[derive(Resource)]
pub struct Viewer(pub RenderEngine);

impl Viewer {
    /// Engine configured from settings, with the command file attached.
    pub fn from_settings(settings: &ViewerSettings) -> Self {
        let mut engine = RenderEngine::new(settings.config.clone());
        engine.set_render_mode(settings.mode);
        engine.on_control(JsonlControlSink::new(settings.commands_path.clone()));
        engine.on_select(|id| match id {
            Some(id) => tracing::info!("Selected {}", id),
            None => tracing::info!("Selection cleared"),
        });
        Self(engine)
    }
}

impl Deref for Viewer {
    type Target = RenderEngine;

    fn deref(&self) -> &RenderEngine {
        &self.0
    }
}

impl DerefMut for Viewer {
    fn deref_mut(&mut self) -> &mut RenderEngine {
        &mut self.0
    }
}

/// Ordering of the viewer's per-frame work.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewerSystems {
    /// Snapshot loading.
    Ingress,
    /// Pointer and keyboard handling.
    Input,
    /// Turning the engine's frame into meshes and text.
    Paint,
}

/// Main plugin for the viewer.
///
/// Sets up the window, builds the engine from [`ViewerSettings`] and adds
/// all sub-plugins.
pub struct ViewerPlugin;

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<ViewerSettings>()
            .cloned()
            .unwrap_or_default();

        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Agent Viewport".into(),
                resolution: (settings.window_size.x, settings.window_size.y).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(viewport::palette::Palette::default().background))
        .insert_resource(Viewer::from_settings(&settings))
        .insert_resource(settings)
        .configure_sets(
            Update,
            (
                ViewerSystems::Ingress,
                ViewerSystems::Input,
                ViewerSystems::Paint,
            )
                .chain(),
        )
        .add_plugins((
            CameraPlugin,
            StateLoaderPlugin,
            InputPlugin,
            PainterPlugin,
            HudPlugin,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ViewerSettings {
            commands_path: dir.path().join("commands.jsonl"),
            mode: RenderMode::Religious,
            ..Default::default()
        };

        let mut viewer = Viewer::from_settings(&settings);
        assert_eq!(viewer.mode(), RenderMode::Religious);

        viewer.request_pause();
        let written = std::fs::read_to_string(dir.path().join("commands.jsonl")).unwrap();
        assert_eq!(written.trim(), r#"{"type":"pause"}"#);
    }
}
