//! End-to-end engine behavior over the sample world.

use std::io::Write;
use std::sync::{Arc, Mutex};

use viewport::palette::Palette;
use viewport::{
    to_world, Color, DrawCommand, Layer, PointerButton, RenderEngine, RenderMode, Vec2,
    ViewportConfig,
};
use world_snapshot::fixtures::sample_snapshot;

fn sample_engine() -> RenderEngine {
    let mut engine = RenderEngine::default();
    engine.resize(800.0, 600.0);
    engine.apply_snapshot(sample_snapshot());
    engine
}

/// Screen position of the center of cell `(x, y)` under the engine's transform.
fn cell_on_screen(engine: &RenderEngine, x: f32, y: f32) -> Vec2 {
    let t = engine.transform();
    let cell = engine.controller().cell_size();
    (Vec2::new(x, y) + 0.5) * cell * t.scale + t.offset
}

fn agent_fills(engine: &mut RenderEngine) -> Vec<Color> {
    engine
        .frame()
        .layer(Layer::Agents)
        .filter_map(|c| match c {
            DrawCommand::FillCircle { color, radius, .. } if *radius > 3.0 => Some(*color),
            _ => None,
        })
        .collect()
}

#[test]
fn test_sample_world_paints_every_layer() {
    let mut engine = sample_engine();
    engine.set_selection(Some("agent_ada"));

    assert_eq!(
        engine.frame().layers(),
        vec![
            Layer::Background,
            Layer::Terrain,
            Layer::Decoration,
            Layer::Items,
            Layer::Animals,
            Layer::Agents,
            Layer::Relationships,
            Layer::Lighting,
        ]
    );
}

#[test]
fn test_click_agent_then_empty_cell() {
    let mut engine = sample_engine();
    let selected = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&selected);
    engine.on_select(move |id| log.lock().unwrap().push(id.map(String::from)));

    let ada = cell_on_screen(&engine, 2.0, 2.0);
    engine.pointer_down(PointerButton::Primary, ada);
    engine.pointer_up(PointerButton::Primary, ada);
    assert_eq!(engine.selection(), Some("agent_ada"));

    // Camera jumped onto Ada at the follow scale
    let t = engine.transform();
    assert_eq!(t.scale, 3.5);
    assert!((cell_on_screen(&engine, 2.0, 2.0) - Vec2::new(400.0, 300.0)).length() < 1e-3);

    // Cell (0, 0) holds no agent
    let empty = cell_on_screen(&engine, 0.0, 0.0);
    engine.pointer_down(PointerButton::Primary, empty);
    engine.pointer_up(PointerButton::Primary, empty);

    assert_eq!(engine.selection(), None);
    assert_eq!(
        *selected.lock().unwrap(),
        vec![Some("agent_ada".to_string()), None]
    );
}

#[test]
fn test_selected_agent_relationships() {
    let mut engine = sample_engine();
    engine.set_selection(Some("agent_ada"));

    let lines: Vec<_> = engine
        .frame()
        .layer(Layer::Relationships)
        .cloned()
        .collect();

    // Bo (+42) and Cy (-30); Di is too weak and the last target is gone
    assert_eq!(lines.len(), 2);
    let palette = Palette::default();
    let colors: Vec<Color> = lines
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Line { color, .. } => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(colors[0], palette.opinion(42.0, 50.0));
    assert_eq!(colors[1], palette.opinion(-30.0, 50.0));
}

#[test]
fn test_selected_leader_uses_selection_outline() {
    let mut engine = sample_engine();
    let palette = Palette::default();
    engine.set_selection(Some("agent_ada"));

    let outlines: Vec<(Color, f32)> = engine
        .frame()
        .layer(Layer::Agents)
        .filter_map(|c| match c {
            DrawCommand::StrokeCircle { color, width, .. } => Some((*color, *width)),
            _ => None,
        })
        .collect();

    assert_eq!(
        outlines,
        vec![
            (palette.selected_outline, 4.0), // Ada: selected leader
            (palette.agent_outline, 2.0),    // Bo
            (palette.leader_outline, 2.0),   // Cy: leader
            (palette.agent_outline, 2.0),    // Di
        ]
    );
}

#[test]
fn test_render_modes_recolor_agents() {
    let mut engine = sample_engine();
    let palette = Palette::default();

    assert_eq!(
        agent_fills(&mut engine),
        vec![palette.female, palette.male, palette.male, palette.female]
    );

    engine.set_render_mode(RenderMode::Political);
    assert_eq!(
        agent_fills(&mut engine),
        vec![
            Color::srgb_u8(0x22, 0xc5, 0x5e),
            Color::srgb_u8(0x22, 0xc5, 0x5e),
            Color::srgb_u8(0xef, 0x44, 0x44),
            palette.female,
        ]
    );

    engine.set_render_mode(RenderMode::Religious);
    assert_eq!(
        agent_fills(&mut engine),
        vec![
            Color::srgb_u8(0xa8, 0x55, 0xf7),
            palette.male,
            palette.male,
            palette.female,
        ]
    );
}

#[test]
fn test_night_indicator_stays_put_while_panning() {
    let mut engine = sample_engine();
    let before: Vec<_> = engine.frame().layer(Layer::Lighting).cloned().collect();

    engine.pointer_down(PointerButton::Middle, Vec2::new(100.0, 100.0));
    engine.pointer_move(Vec2::new(180.0, 140.0));
    engine.pointer_up(PointerButton::Middle, Vec2::new(180.0, 140.0));
    let after: Vec<_> = engine.frame().layer(Layer::Lighting).cloned().collect();

    assert_eq!(engine.transform().offset, Vec2::new(80.0, 40.0));
    assert_eq!(before.len(), 2);
    assert_eq!(before, after);
}

#[test]
fn test_day_snapshot_has_no_lighting() {
    let mut engine = sample_engine();
    let mut day = sample_snapshot();
    day.is_day = true;
    engine.apply_snapshot(day);

    assert!(!engine.frame().has_layer(Layer::Lighting));
}

#[test]
fn test_wheel_keeps_world_point_under_cursor() {
    let mut engine = sample_engine();
    let cursor = Vec2::new(37.0, 81.0);
    let cell = engine.controller().cell_size();

    for delta in [-120.0, -120.0, 300.0, -40.0] {
        let before = to_world(cursor, &engine.transform(), cell);
        engine.wheel(cursor, delta);
        let after = to_world(cursor, &engine.transform(), cell);
        assert!((after - before).length() < 1e-3, "{before:?} moved to {after:?}");
    }
}

#[test]
fn test_engine_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[camera]\ncell_size = 20.0\ninitial_scale = 1.0\n\n[pointer]\nselect_radius = 0.3"
    )
    .unwrap();

    let config = ViewportConfig::from_file(file.path()).unwrap();
    let mut engine = RenderEngine::new(config);
    engine.resize(640.0, 480.0);
    engine.apply_snapshot(sample_snapshot());

    // Ada's center is (50, 50); 8px away is 0.4 cells, outside the radius
    let near_miss = Vec2::new(58.0, 50.0);
    engine.pointer_down(PointerButton::Primary, near_miss);
    engine.pointer_up(PointerButton::Primary, near_miss);
    assert_eq!(engine.selection(), None);

    engine.pointer_down(PointerButton::Primary, Vec2::new(52.0, 50.0));
    engine.pointer_up(PointerButton::Primary, Vec2::new(52.0, 50.0));
    assert_eq!(engine.selection(), Some("agent_ada"));
}
