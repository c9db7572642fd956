//! Status HUD: render mode, world clock, selection and latest log line.

use bevy::prelude::*;
use viewport::RenderEngine;

use crate::plugin::{Viewer, ViewerSystems};
use crate::state_loader::SimulationState;

/// Plugin for the status text in the top-left corner.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud).add_systems(
            Update,
            (toggle_hud, update_hud)
                .chain()
                .in_set(ViewerSystems::Paint),
        );
    }
}

/// Marker for the HUD container node.
#[derive(Component)]
struct HudContainer;

/// Marker for the HUD text.
#[derive(Component)]
struct HudText;

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    top: Val::Px(10.0),
                    left: Val::Px(10.0),
                    padding: UiRect::all(Val::Px(8.0)),
                    flex_direction: FlexDirection::Column,
                    ..default()
                },
                background_color: Color::srgba(0.0, 0.0, 0.0, 0.6).into(),
                ..default()
            },
            HudContainer,
        ))
        .with_children(|parent| {
            parent.spawn((
                TextBundle::from_section(
                    "Waiting for simulation state...",
                    TextStyle {
                        font_size: 14.0,
                        color: Color::srgb(0.8, 0.8, 0.8),
                        ..default()
                    },
                ),
                HudText,
            ));
        });
}

/// System to toggle the HUD with F1.
fn toggle_hud(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut container: Query<&mut Visibility, With<HudContainer>>,
) {
    if !keyboard.just_pressed(KeyCode::F1) {
        return;
    }
    for mut visibility in container.iter_mut() {
        *visibility = match *visibility {
            Visibility::Hidden => Visibility::Inherited,
            _ => Visibility::Hidden,
        };
    }
}

fn update_hud(
    viewer: Res<Viewer>,
    state: Res<SimulationState>,
    mut last_generation: Local<Option<u64>>,
    mut texts: Query<&mut Text, With<HudText>>,
) {
    let generation = viewer.frame_generation();
    if *last_generation == Some(generation) && !state.is_changed() {
        return;
    }
    *last_generation = Some(generation);

    let status = status_text(&viewer, &state);
    for mut text in texts.iter_mut() {
        if let Some(section) = text.sections.first_mut() {
            section.value.clone_from(&status);
        }
    }
}

/// Multi-line status summary.
pub fn status_text(engine: &RenderEngine, state: &SimulationState) -> String {
    let mut lines = vec![format!("Mode: {}", engine.mode())];

    match engine.snapshot() {
        Some(snapshot) => {
            let mut clock = Vec::new();
            if let Some(step) = snapshot.time_step {
                clock.push(format!("Step {step}"));
            }
            if let Some(generation) = snapshot.generation {
                clock.push(format!("Gen {generation}"));
            }
            clock.push(if snapshot.is_day { "Day" } else { "Night" }.to_string());
            lines.push(clock.join(" | "));
            lines.push(format!("Agents: {}", snapshot.agents.len()));
        }
        None => lines.push("No state loaded".to_string()),
    }

    match (engine.selection(), engine.selected_agent()) {
        (Some(_), Some(agent)) if !agent.attributes.name.is_empty() => {
            lines.push(format!("Selected: {} ({})", agent.attributes.name, agent.id));
        }
        (Some(id), Some(_)) => lines.push(format!("Selected: {id}")),
        (Some(id), None) => lines.push(format!("Selected: {id} (not present)")),
        (None, _) => {}
    }

    if let Some(log) = engine.snapshot().and_then(|s| s.latest_log()) {
        lines.push(format!("Log: {log}"));
    }
    if let Some(error) = &state.last_error {
        lines.push(format!("Error: {error}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_snapshot::fixtures::sample_snapshot;

    #[test]
    fn test_status_without_state() {
        let engine = RenderEngine::default();
        let state = SimulationState {
            last_error: Some("failed to read snapshot".into()),
            ..Default::default()
        };

        assert_eq!(
            status_text(&engine, &state),
            "Mode: TERRAIN\nNo state loaded\nError: failed to read snapshot"
        );
    }

    #[test]
    fn test_status_with_selection() {
        let mut engine = RenderEngine::default();
        engine.apply_snapshot(sample_snapshot());
        engine.set_selection(Some("agent_bo"));

        let status = status_text(&engine, &SimulationState::default());
        assert_eq!(
            status,
            "Mode: TERRAIN\nStep 1742 | Gen 3 | Night\nAgents: 4\nSelected: Bo (agent_bo)\nLog: Night fell."
        );
    }

    #[test]
    fn test_status_with_stale_selection() {
        let mut engine = RenderEngine::default();
        engine.apply_snapshot(sample_snapshot());
        engine.set_selection(Some("agent_gone"));

        let status = status_text(&engine, &SimulationState::default());
        assert!(status.contains("Selected: agent_gone (not present)"));
    }
}
