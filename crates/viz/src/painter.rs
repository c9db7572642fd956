//! Painter: replays the engine's draw list as Bevy meshes and text.
//!
//! Every fill and stroke is tessellated into triangles of one vertex-colored
//! mesh, so triangles blend in exactly the order they were painted. The
//! lighting layer goes into a second mesh above the first, and text sits
//! above the mesh of the layer it was painted in:
//!
//! | z   | content                              |
//! |-----|--------------------------------------|
//! | 0.0 | world mesh, background to relations  |
//! | 1.0 | world labels                         |
//! | 2.0 | lighting mesh                        |
//! | 3.0 | lighting labels                      |

use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::view::NoFrustumCulling;
use bevy::sprite::{Anchor, MaterialMesh2dBundle, Mesh2dHandle};
use std::f32::consts::TAU;
use viewport::{DrawCommand, DrawList, Layer, TextAnchor};

use crate::camera::surface_to_canvas;
use crate::plugin::{Viewer, ViewerSystems};

const WORLD_MESH_Z: f32 = 0.0;
const WORLD_LABEL_Z: f32 = 1.0;
const OVERLAY_MESH_Z: f32 = 2.0;
const OVERLAY_LABEL_Z: f32 = 3.0;

/// Plugin that draws the engine's frames.
pub struct PainterPlugin;

impl Plugin for PainterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LabelPool>()
            .add_systems(Startup, setup_frame_meshes)
            .add_systems(Update, paint_frame.in_set(ViewerSystems::Paint));
    }
}

/// Triangle list with one color per vertex, in canvas space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
}

impl MeshBuffers {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Append one triangle, wound counter-clockwise. Degenerate triangles
    /// are dropped.
    pub fn push_triangle(&mut self, [a, mut b, mut c]: [Vec2; 3], color: [f32; 4]) {
        let winding = (b - a).perp_dot(c - a);
        if winding == 0.0 || !winding.is_finite() {
            return;
        }
        if winding < 0.0 {
            std::mem::swap(&mut b, &mut c);
        }
        for p in [a, b, c] {
            self.positions.push([p.x, p.y, 0.0]);
            self.colors.push(color);
        }
    }

    /// Append a quad given its corners in order around the edge.
    pub fn push_quad(&mut self, [a, b, c, d]: [Vec2; 4], color: [f32; 4]) {
        self.push_triangle([a, b, c], color);
        self.push_triangle([a, c, d], color);
    }

    pub fn into_mesh(self) -> Mesh {
        let count = self.positions.len();
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, vec![[0.0, 0.0, 1.0]; count])
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, vec![[0.0, 0.0]; count])
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, self.colors)
    }
}

/// Vertex color for a mesh: linear RGBA.
pub fn vertex_color(color: Color) -> [f32; 4] {
    let linear = color.to_linear();
    [linear.red, linear.green, linear.blue, linear.alpha]
}

/// Segments used to approximate a circle of `radius` pixels.
pub fn circle_segments(radius: f32) -> usize {
    ((TAU * radius / 4.0).ceil() as usize).clamp(12, 96)
}

/// Split a line into dashes of `dash` pixels separated by equal gaps.
pub fn dash_segments(from: Vec2, to: Vec2, dash: f32) -> Vec<(Vec2, Vec2)> {
    let length = from.distance(to);
    if !(dash > 0.0) || !length.is_finite() || length <= dash {
        return vec![(from, to)];
    }
    let direction = (to - from) / length;

    let mut segments = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + dash).min(length);
        segments.push((from + direction * start, from + direction * end));
        start += dash * 2.0;
    }
    segments
}

/// Converts screen-space commands into canvas-space triangles.
#[derive(Debug, Clone, Copy)]
pub struct Tessellator {
    surface: Vec2,
}

impl Tessellator {
    pub fn new(surface: Vec2) -> Self {
        Self { surface }
    }

    fn canvas(&self, point: Vec2) -> Vec2 {
        surface_to_canvas(point, self.surface)
    }

    /// Axis-aligned box between two screen corners.
    fn fill_box(&self, out: &mut MeshBuffers, min: Vec2, max: Vec2, color: [f32; 4]) {
        out.push_quad(
            [
                self.canvas(min),
                self.canvas(Vec2::new(max.x, min.y)),
                self.canvas(max),
                self.canvas(Vec2::new(min.x, max.y)),
            ],
            color,
        );
    }

    pub fn fill_rect(&self, out: &mut MeshBuffers, rect: Rect, color: [f32; 4]) {
        self.fill_box(out, rect.min, rect.max, color);
    }

    /// Outline centered on the rectangle's edge, as four non-overlapping bands.
    pub fn stroke_rect(&self, out: &mut MeshBuffers, rect: Rect, width: f32, color: [f32; 4]) {
        let half = width / 2.0;
        let outer_min = rect.min - half;
        let outer_max = rect.max + half;
        let inner_min = rect.min + half;
        let inner_max = rect.max - half;

        if inner_min.x >= inner_max.x || inner_min.y >= inner_max.y {
            self.fill_box(out, outer_min, outer_max, color);
            return;
        }
        self.fill_box(out, outer_min, Vec2::new(outer_max.x, inner_min.y), color);
        self.fill_box(out, Vec2::new(outer_min.x, inner_max.y), outer_max, color);
        self.fill_box(out, Vec2::new(outer_min.x, inner_min.y), Vec2::new(inner_min.x, inner_max.y), color);
        self.fill_box(out, Vec2::new(inner_max.x, inner_min.y), Vec2::new(outer_max.x, inner_max.y), color);
    }

    pub fn fill_circle(&self, out: &mut MeshBuffers, center: Vec2, radius: f32, color: [f32; 4]) {
        if !(radius > 0.0) {
            return;
        }
        let c = self.canvas(center);
        let points = circle_points(c, radius);
        for i in 0..points.len() {
            let next = points[(i + 1) % points.len()];
            out.push_triangle([c, points[i], next], color);
        }
    }

    /// Ring centered on the circle's edge.
    pub fn stroke_circle(
        &self,
        out: &mut MeshBuffers,
        center: Vec2,
        radius: f32,
        width: f32,
        color: [f32; 4],
    ) {
        let half = width / 2.0;
        if !(radius + half > 0.0) {
            return;
        }
        let c = self.canvas(center);
        let outer = circle_points(c, radius + half);
        let inner = circle_points_n(c, (radius - half).max(0.0), outer.len());
        for i in 0..outer.len() {
            let j = (i + 1) % outer.len();
            out.push_quad([inner[i], outer[i], outer[j], inner[j]], color);
        }
    }

    pub fn fill_triangle(&self, out: &mut MeshBuffers, points: [Vec2; 3], color: [f32; 4]) {
        out.push_triangle(points.map(|p| self.canvas(p)), color);
    }

    pub fn stroke_triangle(
        &self,
        out: &mut MeshBuffers,
        points: [Vec2; 3],
        width: f32,
        color: [f32; 4],
    ) {
        for i in 0..3 {
            self.line(out, points[i], points[(i + 1) % 3], width, color);
        }
    }

    pub fn line(&self, out: &mut MeshBuffers, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
        let (a, b) = (self.canvas(from), self.canvas(to));
        let length = a.distance(b);
        if !(length > 0.0) {
            return;
        }
        let normal = (b - a).perp() / length * (width / 2.0);
        out.push_quad([a + normal, b + normal, b - normal, a - normal], color);
    }

    pub fn dashed_line(
        &self,
        out: &mut MeshBuffers,
        from: Vec2,
        to: Vec2,
        width: f32,
        dash: f32,
        color: [f32; 4],
    ) {
        for (a, b) in dash_segments(from, to, dash) {
            self.line(out, a, b, width, color);
        }
    }
}

fn circle_points(center: Vec2, radius: f32) -> Vec<Vec2> {
    circle_points_n(center, radius, circle_segments(radius))
}

fn circle_points_n(center: Vec2, radius: f32, segments: usize) -> Vec<Vec2> {
    (0..segments)
        .map(|i| {
            let angle = TAU * i as f32 / segments as f32;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// One text label, in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub text: String,
    pub position: Vec2,
    pub z: f32,
    pub size: f32,
    pub color: Color,
    pub anchor: TextAnchor,
}

/// A draw list converted for Bevy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintedFrame {
    /// Every layer below the lighting overlay.
    pub world: MeshBuffers,
    /// The screen-space lighting layer.
    pub overlay: MeshBuffers,
    pub labels: Vec<LabelSpec>,
}

/// Convert a draw list painted for a surface of `surface` pixels.
pub fn paint(list: &DrawList, surface: Vec2) -> PaintedFrame {
    let tess = Tessellator::new(surface);
    let mut frame = PaintedFrame::default();

    for entry in list.entries() {
        let is_overlay = entry.layer == Layer::Lighting;
        let out = if is_overlay {
            &mut frame.overlay
        } else {
            &mut frame.world
        };

        match &entry.command {
            DrawCommand::FillRect { rect, color } => tess.fill_rect(out, *rect, vertex_color(*color)),
            DrawCommand::StrokeRect { rect, color, width } => {
                tess.stroke_rect(out, *rect, *width, vertex_color(*color))
            }
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => tess.fill_circle(out, *center, *radius, vertex_color(*color)),
            DrawCommand::StrokeCircle {
                center,
                radius,
                color,
                width,
            } => tess.stroke_circle(out, *center, *radius, *width, vertex_color(*color)),
            DrawCommand::FillTriangle { points, color } => {
                tess.fill_triangle(out, *points, vertex_color(*color))
            }
            DrawCommand::StrokeTriangle {
                points,
                color,
                width,
            } => tess.stroke_triangle(out, *points, *width, vertex_color(*color)),
            DrawCommand::Line {
                from,
                to,
                color,
                width,
                dash,
            } => match dash {
                Some(dash) => tess.dashed_line(out, *from, *to, *width, *dash, vertex_color(*color)),
                None => tess.line(out, *from, *to, *width, vertex_color(*color)),
            },
            DrawCommand::Text {
                position,
                text,
                size,
                color,
                anchor,
            } => frame.labels.push(LabelSpec {
                text: text.clone(),
                position: surface_to_canvas(*position, surface),
                z: if is_overlay {
                    OVERLAY_LABEL_Z
                } else {
                    WORLD_LABEL_Z
                },
                size: *size,
                color: *color,
                anchor: *anchor,
            }),
        }
    }
    frame
}

/// Which frame mesh an entity shows.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum FrameMesh {
    World,
    Overlay,
}

/// Text entities reused across frames.
#[derive(Resource, Default)]
struct LabelPool {
    entities: Vec<Entity>,
}

#[derive(Component)]
struct PooledLabel;

fn setup_frame_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    // White base color: vertex colors pass through unchanged
    let material = materials.add(ColorMaterial::from(Color::WHITE));

    for (kind, z) in [
        (FrameMesh::World, WORLD_MESH_Z),
        (FrameMesh::Overlay, OVERLAY_MESH_Z),
    ] {
        commands.spawn((
            MaterialMesh2dBundle {
                mesh: Mesh2dHandle(meshes.add(MeshBuffers::default().into_mesh())),
                material: material.clone(),
                transform: Transform::from_xyz(0.0, 0.0, z),
                visibility: Visibility::Hidden,
                ..default()
            },
            // The mesh is replaced in place, so its bounds go stale
            NoFrustumCulling,
            kind,
        ));
    }
}

fn paint_frame(
    mut commands: Commands,
    mut viewer: ResMut<Viewer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut frame_meshes: Query<(&FrameMesh, &Mesh2dHandle, &mut Visibility), Without<PooledLabel>>,
    mut pool: ResMut<LabelPool>,
    mut labels: Query<(&mut Text, &mut Transform, &mut Anchor, &mut Visibility), With<PooledLabel>>,
) {
    if !viewer.refresh() {
        return;
    }
    let surface = viewer.controller().surface_size();
    let painted = paint(viewer.last_frame(), surface);
    tracing::trace!(
        "Painted frame {} ({} + {} triangles, {} labels)",
        viewer.frame_generation(),
        painted.world.triangle_count(),
        painted.overlay.triangle_count(),
        painted.labels.len()
    );

    let PaintedFrame {
        world,
        overlay,
        labels: painted_labels,
    } = painted;
    let mut world = Some(world);
    let mut overlay = Some(overlay);

    for (kind, handle, mut visibility) in frame_meshes.iter_mut() {
        let buffers = match kind {
            FrameMesh::World => world.take(),
            FrameMesh::Overlay => overlay.take(),
        };
        let Some(buffers) = buffers else {
            continue;
        };
        *visibility = if buffers.is_empty() {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
        if let Some(mesh) = meshes.get_mut(&handle.0) {
            *mesh = buffers.into_mesh();
        }
    }

    sync_labels(&mut commands, &mut pool, &mut labels, painted_labels);
}

fn text_for(label: &LabelSpec) -> Text {
    let justify = match label.anchor {
        TextAnchor::BottomCenter => JustifyText::Center,
        TextAnchor::BottomRight => JustifyText::Right,
    };
    Text::from_section(
        label.text.clone(),
        TextStyle {
            font_size: label.size,
            color: label.color,
            ..default()
        },
    )
    .with_justify(justify)
}

fn anchor_for(anchor: TextAnchor) -> Anchor {
    match anchor {
        TextAnchor::BottomCenter => Anchor::BottomCenter,
        TextAnchor::BottomRight => Anchor::BottomRight,
    }
}

/// Show one pooled text entity per label, spawning more when needed and
/// hiding the rest.
fn sync_labels(
    commands: &mut Commands,
    pool: &mut LabelPool,
    labels: &mut Query<(&mut Text, &mut Transform, &mut Anchor, &mut Visibility), With<PooledLabel>>,
    labels_to_show: Vec<LabelSpec>,
) {
    let shown = labels_to_show.len();
    for (index, label) in labels_to_show.into_iter().enumerate() {
        let translation = label.position.extend(label.z);

        if let Some(&entity) = pool.entities.get(index) {
            if let Ok((mut text, mut transform, mut anchor, mut visibility)) = labels.get_mut(entity) {
                *text = text_for(&label);
                transform.translation = translation;
                *anchor = anchor_for(label.anchor);
                *visibility = Visibility::Inherited;
            }
            continue;
        }

        let entity = commands
            .spawn((
                Text2dBundle {
                    text: text_for(&label),
                    text_anchor: anchor_for(label.anchor),
                    transform: Transform::from_translation(translation),
                    ..default()
                },
                PooledLabel,
            ))
            .id();
        pool.entities.push(entity);
    }

    for &entity in pool.entities.iter().skip(shown) {
        if let Ok((_, _, _, mut visibility)) = labels.get_mut(entity) {
            *visibility = Visibility::Hidden;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewport::Surface;

    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    fn is_ccw(buffers: &MeshBuffers) -> bool {
        buffers.positions.chunks(3).all(|t| {
            let (a, b, c) = (Vec2::new(t[0][0], t[0][1]), Vec2::new(t[1][0], t[1][1]), Vec2::new(t[2][0], t[2][1]));
            (b - a).perp_dot(c - a) > 0.0
        })
    }

    #[test]
    fn test_vertex_color_is_linear() {
        assert_eq!(vertex_color(Color::WHITE), WHITE);
        let grey = vertex_color(Color::srgb(0.5, 0.5, 0.5));
        assert!(grey[0] < 0.25 && grey[0] > 0.2);
    }

    #[test]
    fn test_circle_segments_bounds() {
        assert_eq!(circle_segments(1.0), 12);
        assert_eq!(circle_segments(10_000.0), 96);
        assert!(circle_segments(40.0) > 12);
    }

    #[test]
    fn test_dash_segments() {
        let dashes = dash_segments(Vec2::ZERO, Vec2::new(22.0, 0.0), 5.0);
        assert_eq!(
            dashes,
            vec![
                (Vec2::ZERO, Vec2::new(5.0, 0.0)),
                (Vec2::new(10.0, 0.0), Vec2::new(15.0, 0.0)),
                (Vec2::new(20.0, 0.0), Vec2::new(22.0, 0.0)),
            ]
        );
        // Shorter than one dash: solid
        assert_eq!(dash_segments(Vec2::ZERO, Vec2::new(3.0, 0.0), 5.0).len(), 1);
        assert_eq!(dash_segments(Vec2::ZERO, Vec2::new(30.0, 0.0), 0.0).len(), 1);
    }

    #[test]
    fn test_fill_rect_in_canvas_space() {
        let tess = Tessellator::new(Vec2::new(100.0, 100.0));
        let mut out = MeshBuffers::default();
        tess.fill_rect(&mut out, Rect::new(0.0, 0.0, 10.0, 20.0), WHITE);

        assert_eq!(out.triangle_count(), 2);
        assert!(out.positions.contains(&[-50.0, 50.0, 0.0]));
        assert!(out.positions.contains(&[-40.0, 30.0, 0.0]));
        assert!(is_ccw(&out));
    }

    #[test]
    fn test_stroke_rect_bands() {
        let tess = Tessellator::new(Vec2::new(100.0, 100.0));
        let mut out = MeshBuffers::default();
        tess.stroke_rect(&mut out, Rect::new(10.0, 10.0, 30.0, 30.0), 2.0, WHITE);
        assert_eq!(out.triangle_count(), 8);

        // Too thin to have a hole: filled
        let mut thin = MeshBuffers::default();
        tess.stroke_rect(&mut thin, Rect::new(10.0, 10.0, 11.0, 11.0), 2.0, WHITE);
        assert_eq!(thin.triangle_count(), 2);
    }

    #[test]
    fn test_circles_and_rings() {
        let tess = Tessellator::new(Vec2::new(100.0, 100.0));
        let mut out = MeshBuffers::default();

        tess.fill_circle(&mut out, Vec2::new(50.0, 50.0), 5.0, WHITE);
        assert_eq!(out.triangle_count(), circle_segments(5.0));

        out = MeshBuffers::default();
        tess.stroke_circle(&mut out, Vec2::new(50.0, 50.0), 5.0, 2.0, WHITE);
        assert_eq!(out.triangle_count(), circle_segments(6.0) * 2);
        assert!(is_ccw(&out));

        out = MeshBuffers::default();
        tess.fill_circle(&mut out, Vec2::new(50.0, 50.0), 0.0, WHITE);
        assert!(out.is_empty());
    }

    #[test]
    fn test_triangles_wound_ccw_after_flip() {
        let tess = Tessellator::new(Vec2::new(100.0, 100.0));
        let mut out = MeshBuffers::default();
        tess.fill_triangle(
            &mut out,
            [Vec2::new(10.0, 0.0), Vec2::new(20.0, 20.0), Vec2::new(0.0, 20.0)],
            WHITE,
        );
        tess.stroke_triangle(
            &mut out,
            [Vec2::new(10.0, 0.0), Vec2::new(20.0, 20.0), Vec2::new(0.0, 20.0)],
            1.0,
            WHITE,
        );
        assert_eq!(out.triangle_count(), 1 + 3 * 2);
        assert!(is_ccw(&out));
    }

    #[test]
    fn test_degenerate_shapes_dropped() {
        let tess = Tessellator::new(Vec2::new(100.0, 100.0));
        let mut out = MeshBuffers::default();
        tess.line(&mut out, Vec2::ONE, Vec2::ONE, 2.0, WHITE);
        tess.fill_triangle(&mut out, [Vec2::ZERO, Vec2::ONE, Vec2::splat(2.0)], WHITE);
        assert!(out.is_empty());
    }

    #[test]
    fn test_paint_routes_layers() {
        let mut list = DrawList::new();
        list.begin_layer(Layer::Background);
        list.draw(DrawCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 800.0, 600.0),
            color: Color::BLACK,
        });
        list.begin_layer(Layer::Agents);
        list.draw(DrawCommand::Text {
            position: Vec2::new(400.0, 290.0),
            text: "Ada".into(),
            size: 10.0,
            color: Color::WHITE,
            anchor: TextAnchor::BottomCenter,
        });
        list.begin_layer(Layer::Relationships);
        list.draw(DrawCommand::Line {
            from: Vec2::new(0.0, 0.0),
            to: Vec2::new(22.0, 0.0),
            color: Color::WHITE,
            width: 2.0,
            dash: Some(5.0),
        });
        list.begin_layer(Layer::Lighting);
        list.draw(DrawCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 800.0, 600.0),
            color: Color::BLACK.with_alpha(0.6),
        });
        list.draw(DrawCommand::Text {
            position: Vec2::new(780.0, 40.0),
            text: "NIGHT".into(),
            size: 24.0,
            color: Color::WHITE,
            anchor: TextAnchor::BottomRight,
        });

        let frame = paint(&list, Vec2::new(800.0, 600.0));

        // Background quad plus three dashes
        assert_eq!(frame.world.triangle_count(), 2 + 3 * 2);
        assert_eq!(frame.overlay.triangle_count(), 2);
        assert_eq!(frame.overlay.colors[0][3], 0.6);

        assert_eq!(frame.labels.len(), 2);
        assert_eq!(frame.labels[0].position, Vec2::new(0.0, 10.0));
        assert_eq!(frame.labels[0].z, WORLD_LABEL_Z);
        assert_eq!(frame.labels[1].position, Vec2::new(380.0, 260.0));
        assert_eq!(frame.labels[1].z, OVERLAY_LABEL_Z);
    }

    #[test]
    fn test_into_mesh_vertex_count() {
        let mut out = MeshBuffers::default();
        out.push_quad([Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y], WHITE);
        let mesh = out.into_mesh();
        assert_eq!(mesh.count_vertices(), 6);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_some());
    }
}
