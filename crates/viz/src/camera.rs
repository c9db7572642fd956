//! Camera setup and surface sizing.
//!
//! The Bevy camera never moves: pan and zoom live in the engine's viewport
//! transform and are baked into the painted geometry. The camera maps one
//! world unit to one logical pixel with the origin at the window center.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::plugin::Viewer;

/// Plugin for the fixed 2D camera and window size tracking.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_camera, size_surface_from_window))
            .add_systems(PreUpdate, track_window_resize);
    }
}

/// Marker component for the main camera.
#[derive(Component)]
pub struct MainCamera;

fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2dBundle::default(), MainCamera));
}

fn size_surface_from_window(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewer: ResMut<Viewer>,
) {
    if let Ok(window) = windows.get_single() {
        viewer.resize(window.width(), window.height());
    }
}

fn track_window_resize(
    mut resized: EventReader<WindowResized>,
    windows: Query<Entity, With<PrimaryWindow>>,
    mut viewer: ResMut<Viewer>,
) {
    let Ok(primary) = windows.get_single() else {
        resized.clear();
        return;
    };
    // Only the last size of a burst matters
    if let Some(event) = resized.read().filter(|e| e.window == primary).last() {
        viewer.resize(event.width, event.height);
    }
}

/// Convert a surface point (origin top-left, y down) to canvas space
/// (origin at the window center, y up).
pub fn surface_to_canvas(point: Vec2, surface: Vec2) -> Vec2 {
    Vec2::new(point.x - surface.x / 2.0, surface.y / 2.0 - point.y)
}
