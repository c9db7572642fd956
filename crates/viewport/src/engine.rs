//! Render engine: the composition root.
//!
//! Owns the current snapshot, the viewport controller, the pointer state
//! machine, the selection and the render mode. Every input event runs to
//! completion synchronously; any change that affects the picture marks the
//! frame dirty, and the next [`RenderEngine::frame`] call repaints it from
//! scratch.

use bevy_math::Vec2;
use world_snapshot::{AgentSnapshot, ControlCommand, Snapshot};

use crate::config::ViewportConfig;
use crate::controller::ViewportController;
use crate::hit_test::HitTester;
use crate::mapper::{cell_center, to_world, ViewportTransform};
use crate::mode::RenderMode;
use crate::pointer::{GestureOutcome, GestureSink, PointerButton, PointerStateMachine};
use crate::scene::{DrawList, Scene, SceneRenderer};

/// Receives control requests bound for the simulation.
///
/// Fire-and-forget: nothing is returned to the engine.
pub trait ControlSink: Send + Sync {
    fn send(&mut self, command: ControlCommand);
}

impl<F> ControlSink for F
where
    F: FnMut(ControlCommand) + Send + Sync,
{
    fn send(&mut self, command: ControlCommand) {
        self(command)
    }
}

type SelectHook = Box<dyn FnMut(Option<&str>) + Send + Sync>;

/// Routes pointer gestures into the controller, remembering any click.
struct GestureRouter<'a> {
    controller: &'a mut ViewportController,
    panned: bool,
    click: Option<Vec2>,
}

impl<'a> GestureRouter<'a> {
    fn new(controller: &'a mut ViewportController) -> Self {
        Self {
            controller,
            panned: false,
            click: None,
        }
    }
}

impl GestureSink for GestureRouter<'_> {
    fn pan(&mut self, delta: Vec2) {
        self.controller.pan(delta);
        self.panned = true;
    }

    fn click(&mut self, point: Vec2) {
        self.click = Some(point);
    }
}

pub struct RenderEngine {
    config: ViewportConfig,
    snapshot: Option<Snapshot>,
    controller: ViewportController,
    pointer: PointerStateMachine,
    hit_tester: HitTester,
    renderer: SceneRenderer,
    mode: RenderMode,
    selection: Option<String>,
    on_select: Option<SelectHook>,
    control: Option<Box<dyn ControlSink>>,
    frame: DrawList,
    dirty: bool,
    frame_generation: u64,
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl RenderEngine {
    pub fn new(config: ViewportConfig) -> Self {
        let controller = ViewportController::new(&config.camera);
        Self {
            pointer: PointerStateMachine::new(config.pointer.click_threshold),
            hit_tester: HitTester::new(config.pointer.select_radius),
            renderer: SceneRenderer::new(controller.cell_size(), config.render.clone()),
            controller,
            config,
            snapshot: None,
            mode: RenderMode::default(),
            selection: None,
            on_select: None,
            control: None,
            frame: DrawList::new(),
            dirty: true,
            frame_generation: 0,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn transform(&self) -> ViewportTransform {
        self.controller.transform()
    }

    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    pub fn renderer(&self) -> &SceneRenderer {
        &self.renderer
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.is_dragging()
    }

    // --- Ingress ---

    /// Replace the current snapshot wholesale.
    ///
    /// Transform and gesture state are untouched, so a snapshot arriving
    /// mid-drag does not interrupt the drag.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        tracing::debug!(
            agents = snapshot.agents.len(),
            items = snapshot.items.len(),
            is_day = snapshot.is_day,
            "snapshot applied"
        );
        self.snapshot = Some(snapshot);
        self.dirty = true;

        // An id missing from the new snapshot implicitly deselects
        if self.selection.is_some() && self.selected_agent().is_none() {
            tracing::debug!(selection = ?self.selection, "selected agent left the snapshot");
            self.select(None);
        }
    }

    /// Set the drawing surface size in pixels.
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.controller.set_surface_size(Vec2::new(width, height)) {
            self.dirty = true;
        }
    }

    // --- Pointer input ---

    /// Button pressed at a screen point. Returns false if ignored.
    pub fn pointer_down(&mut self, button: PointerButton, point: Vec2) -> bool {
        self.pointer.press(button, point)
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        let mut router = GestureRouter::new(&mut self.controller);
        self.pointer.moved(point, &mut router);
        if router.panned {
            self.dirty = true;
        }
    }

    /// Button released. A click selects the agent under the point, or
    /// clears the selection when there is none.
    pub fn pointer_up(&mut self, button: PointerButton, point: Vec2) -> GestureOutcome {
        let mut router = GestureRouter::new(&mut self.controller);
        let outcome = self.pointer.release(button, point, &mut router);
        let (panned, click) = (router.panned, router.click);

        if panned {
            self.dirty = true;
        }
        if let Some(point) = click {
            let hit = self.agent_at(point).map(String::from);
            self.select(hit);
        }
        outcome
    }

    /// Pointer left the surface: abandon the gesture without a click.
    pub fn pointer_leave(&mut self) {
        self.pointer.cancel();
    }

    /// Wheel scrolled by `delta_y` pixels at a screen point. Scrolling up
    /// (negative delta) zooms in.
    pub fn wheel(&mut self, point: Vec2, delta_y: f32) -> bool {
        let scale = self.controller.transform().scale;
        let delta = -delta_y * self.config.camera.wheel_sensitivity * scale;
        let changed = self.controller.zoom_at(point, delta);
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Id of the agent under a screen point.
    pub fn agent_at(&self, point: Vec2) -> Option<&str> {
        let transform = self.controller.transform();
        if !transform.is_valid() {
            return None;
        }
        let world = to_world(point, &transform, self.controller.cell_size());
        let snapshot = self.snapshot.as_ref()?;
        self.hit_tester.find_nearest(world, &snapshot.agents)
    }

    // --- View controls ---

    pub fn zoom_in(&mut self) {
        if self.controller.zoom_centered(self.config.camera.zoom_step) {
            self.dirty = true;
        }
    }

    pub fn zoom_out(&mut self) {
        if self.controller.zoom_centered(1.0 / self.config.camera.zoom_step) {
            self.dirty = true;
        }
    }

    /// Back to the startup offset and scale.
    pub fn reset_view(&mut self) {
        self.controller.reset();
        self.dirty = true;
    }

    // --- Selection ---

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// The selected agent, if it exists in the current snapshot.
    pub fn selected_agent(&self) -> Option<&AgentSnapshot> {
        let id = self.selection.as_deref()?;
        self.snapshot.as_ref()?.agent(id)
    }

    /// Register the selection callback, replacing any previous one.
    pub fn on_select<F>(&mut self, callback: F)
    where
        F: FnMut(Option<&str>) + Send + Sync + 'static,
    {
        self.on_select = Some(Box::new(callback));
    }

    /// Select an agent by id, or clear the selection.
    ///
    /// Behaves exactly like a canvas click resolving to `id`.
    pub fn set_selection(&mut self, id: Option<&str>) {
        self.select(id.map(String::from));
    }

    pub fn clear_selection(&mut self) {
        self.select(None);
    }

    /// Step the selection through the snapshot's agents, wrapping around.
    pub fn cycle_selection(&mut self, forward: bool) {
        let next = {
            let Some(snapshot) = self.snapshot.as_ref() else {
                return;
            };
            let agents = &snapshot.agents;
            if agents.is_empty() {
                return;
            }
            let count = agents.len();
            let current = self
                .selection
                .as_deref()
                .and_then(|id| agents.iter().position(|a| a.id == id));
            let index = match (current, forward) {
                (Some(i), true) => (i + 1) % count,
                (Some(i), false) => (i + count - 1) % count,
                (None, true) => 0,
                (None, false) => count - 1,
            };
            agents[index].id.clone()
        };
        self.select(Some(next));
    }

    fn select(&mut self, id: Option<String>) {
        let changed = self.selection != id;
        self.selection = id;

        if changed {
            self.dirty = true;
            tracing::debug!(selection = ?self.selection, "selection changed");
            self.follow_selection();
        }
        if let Some(hook) = self.on_select.as_mut() {
            hook(self.selection.as_deref());
        }
    }

    /// One-shot camera jump onto the selected agent.
    fn follow_selection(&mut self) {
        let Some(target) = self
            .selected_agent()
            .map(|agent| cell_center(Vec2::new(agent.x, agent.y)))
        else {
            return;
        };
        if self
            .controller
            .follow_target(target, self.config.camera.follow_scale)
        {
            self.dirty = true;
        }
    }

    // --- Render mode ---

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        if self.mode != mode {
            tracing::debug!(%mode, "render mode changed");
            self.mode = mode;
            self.dirty = true;
        }
    }

    /// Switch to the next render mode and return it.
    pub fn cycle_mode(&mut self) -> RenderMode {
        self.set_render_mode(self.mode.next());
        self.mode
    }

    // --- Control egress ---

    /// Register the sink that receives control requests.
    pub fn on_control(&mut self, sink: impl ControlSink + 'static) {
        self.control = Some(Box::new(sink));
    }

    pub fn request_pause(&mut self) {
        self.send_control(ControlCommand::Pause);
    }

    pub fn request_speed(&mut self, value: f32) {
        self.send_control(ControlCommand::set_speed(value));
    }

    pub fn request_evolution(&mut self) {
        self.send_control(ControlCommand::ForceEvolution);
    }

    fn send_control(&mut self, command: ControlCommand) {
        match self.control.as_mut() {
            Some(sink) => sink.send(command),
            None => tracing::debug!(?command, "no control sink attached"),
        }
    }

    // --- Frames ---

    /// Whether anything that affects the picture changed since the last frame.
    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    /// Number of frames painted so far.
    pub fn frame_generation(&self) -> u64 {
        self.frame_generation
    }

    /// Repaint if dirty. Returns true if a new frame was painted.
    pub fn refresh(&mut self) -> bool {
        if !self.dirty {
            return false;
        }

        let scene = Scene {
            snapshot: self.snapshot.as_ref(),
            transform: self.controller.transform(),
            mode: self.mode,
            selected: self.selection.as_deref(),
            surface_size: self.controller.surface_size(),
        };
        self.frame.clear();
        self.renderer.render(&scene, &mut self.frame);

        self.dirty = false;
        self.frame_generation += 1;
        true
    }

    /// The current frame, repainted first if anything changed.
    pub fn frame(&mut self) -> &DrawList {
        self.refresh();
        &self.frame
    }

    /// The last painted frame, without repainting.
    pub fn last_frame(&self) -> &DrawList {
        &self.frame
    }
}
