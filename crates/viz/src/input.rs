//! Mouse and keyboard input, forwarded to the render engine.
//!
//! Window cursor positions are already in surface space (origin top-left,
//! y down), which is what the engine expects.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved, PrimaryWindow};
use viewport::PointerButton;
use world_snapshot::ControlCommand;

use crate::plugin::{Viewer, ViewerSystems};

/// Pixels scrolled per wheel line, for mice that report whole lines.
const PIXELS_PER_LINE: f32 = 100.0;

/// Speed change per `[` / `]` press.
const SPEED_STEP: f32 = 0.1;

/// Plugin for pointer and keyboard handling.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationSpeed>().add_systems(
            Update,
            (handle_pointer_input, handle_wheel_input, handle_keyboard_input)
                .chain()
                .in_set(ViewerSystems::Input),
        );
    }
}

/// Last speed requested from the simulation.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SimulationSpeed(pub f32);

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Map a Bevy mouse button to a gesture button.
pub fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Middle => Some(PointerButton::Middle),
        MouseButton::Right => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// Vertical wheel movement in surface pixels, positive when scrolling down.
pub fn wheel_delta_pixels(unit: MouseScrollUnit, y: f32) -> f32 {
    let pixels = match unit {
        MouseScrollUnit::Line => y * PIXELS_PER_LINE,
        MouseScrollUnit::Pixel => y,
    };
    // Bevy reports scrolling up as positive
    -pixels
}

/// Next speed after one step up or down, within the accepted range.
pub fn step_speed(current: f32, faster: bool) -> f32 {
    let next = if faster {
        current + SPEED_STEP
    } else {
        current - SPEED_STEP
    };
    // Round to hundredths so repeated steps don't drift
    ((next * 100.0).round() / 100.0).clamp(ControlCommand::MIN_SPEED, ControlCommand::MAX_SPEED)
}

fn handle_pointer_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut moved: EventReader<CursorMoved>,
    mut left: EventReader<CursorLeft>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewer: ResMut<Viewer>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let cursor = window.cursor_position();

    if let Some(point) = cursor {
        for &button in mouse_button.get_just_pressed() {
            if let Some(button) = pointer_button(button) {
                viewer.pointer_down(button, point);
            }
        }
    }

    for event in moved.read() {
        viewer.pointer_move(event.position);
    }

    for &button in mouse_button.get_just_released() {
        let Some(button) = pointer_button(button) else {
            continue;
        };
        match cursor {
            Some(point) => {
                let outcome = viewer.pointer_up(button, point);
                tracing::debug!("Pointer released: {:?}", outcome);
            }
            None => viewer.pointer_leave(),
        }
    }

    if left.read().last().is_some() {
        viewer.pointer_leave();
    }
}

fn handle_wheel_input(
    mut scroll: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewer: ResMut<Viewer>,
) {
    let Ok(window) = windows.get_single() else {
        scroll.clear();
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        scroll.clear();
        return;
    };

    for event in scroll.read() {
        viewer.wheel(cursor, wheel_delta_pixels(event.unit, event.y));
    }
}

fn handle_keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut viewer: ResMut<Viewer>,
    mut speed: ResMut<SimulationSpeed>,
) {
    let shift_held = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);

    // View
    if keyboard.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        viewer.zoom_in();
    }
    if keyboard.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        viewer.zoom_out();
    }
    if keyboard.just_pressed(KeyCode::Home) {
        viewer.reset_view();
    }
    if keyboard.just_pressed(KeyCode::KeyM) {
        let mode = viewer.cycle_mode();
        tracing::info!("Render mode: {}", mode);
    }

    // Selection
    if keyboard.just_pressed(KeyCode::Escape) {
        viewer.clear_selection();
    }
    if keyboard.just_pressed(KeyCode::Tab) {
        viewer.cycle_selection(!shift_held);
    }

    // Simulation control
    if keyboard.just_pressed(KeyCode::Space) {
        viewer.request_pause();
    }
    if keyboard.just_pressed(KeyCode::BracketLeft) {
        speed.0 = step_speed(speed.0, false);
        viewer.request_speed(speed.0);
    }
    if keyboard.just_pressed(KeyCode::BracketRight) {
        speed.0 = step_speed(speed.0, true);
        viewer.request_speed(speed.0);
    }
    if keyboard.just_pressed(KeyCode::KeyE) {
        viewer.request_evolution();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_button_mapping() {
        assert_eq!(pointer_button(MouseButton::Left), Some(PointerButton::Primary));
        assert_eq!(pointer_button(MouseButton::Middle), Some(PointerButton::Middle));
        assert_eq!(pointer_button(MouseButton::Right), Some(PointerButton::Secondary));
        assert_eq!(pointer_button(MouseButton::Back), None);
    }

    #[test]
    fn test_wheel_delta_direction() {
        // One line up zooms in: negative surface delta
        assert_eq!(wheel_delta_pixels(MouseScrollUnit::Line, 1.0), -100.0);
        assert_eq!(wheel_delta_pixels(MouseScrollUnit::Pixel, -12.0), 12.0);
    }

    #[test]
    fn test_step_speed() {
        assert!((step_speed(1.0, true) - 1.1).abs() < 1e-6);
        assert!((step_speed(1.0, false) - 0.9).abs() < 1e-6);
        assert_eq!(step_speed(2.0, true), 2.0);
        assert_eq!(step_speed(0.05, false), 0.01);
    }

    #[test]
    fn test_speed_steps_do_not_drift() {
        let mut speed = SimulationSpeed::default().0;
        for _ in 0..5 {
            speed = step_speed(speed, true);
        }
        for _ in 0..5 {
            speed = step_speed(speed, false);
        }
        assert!((speed - 1.0).abs() < 1e-6);
    }
}
