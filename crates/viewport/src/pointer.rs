//! Pointer state machine: tells a drag-pan apart from a click.
//!
//! A gesture starts on press and ends on release. Movement pans the view
//! once the pointer has strayed `click_threshold` pixels from where it was
//! pressed. The release point alone decides the outcome: closer than the
//! threshold to the press point is a click, anything else is a pan.
//! Jitter that never leaves the threshold never pans.

use bevy_math::Vec2;

/// Receives the outcome of pointer gestures.
pub trait GestureSink {
    /// Translate the view by a screen-space delta.
    fn pan(&mut self, delta: Vec2);
    /// A click resolved at a screen point.
    fn click(&mut self, point: Vec2);
}

/// Mouse button that started a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Middle,
    /// Context-menu button. Never starts a gesture.
    Secondary,
}

/// In-progress press-move-release sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub button: PointerButton,
    /// Where the pointer was pressed.
    pub anchor: Vec2,
    /// Last point already forwarded as a pan.
    pub last: Vec2,
    /// Whether the pointer has left the click radius.
    pub panning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    Dragging(DragGesture),
}

/// How a finished gesture was classified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Release within the threshold: forwarded as a click.
    Click(Vec2),
    /// A completed pan.
    Pan,
    /// No gesture was in progress for this button.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct PointerStateMachine {
    state: PointerState,
    click_threshold: f32,
}

impl PointerStateMachine {
    pub fn new(click_threshold: f32) -> Self {
        Self {
            state: PointerState::Idle,
            click_threshold: click_threshold.max(0.0),
        }
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PointerState::Dragging(_))
    }

    /// Start a gesture. Returns false if the press was ignored.
    pub fn press(&mut self, button: PointerButton, point: Vec2) -> bool {
        if button == PointerButton::Secondary || self.is_dragging() || !point.is_finite() {
            return false;
        }
        self.state = PointerState::Dragging(DragGesture {
            button,
            anchor: point,
            last: point,
            panning: false,
        });
        true
    }

    /// Pointer moved; pans once the gesture has left the click radius.
    pub fn moved(&mut self, point: Vec2, sink: &mut impl GestureSink) {
        let PointerState::Dragging(ref mut drag) = self.state else {
            return;
        };
        if !point.is_finite() {
            return;
        }

        if !drag.panning && drag.anchor.distance(point) >= self.click_threshold {
            drag.panning = true;
        }
        if drag.panning {
            let delta = point - drag.last;
            if delta != Vec2::ZERO {
                sink.pan(delta);
            }
            drag.last = point;
        }
    }

    /// Finish the gesture and classify it.
    pub fn release(
        &mut self,
        button: PointerButton,
        point: Vec2,
        sink: &mut impl GestureSink,
    ) -> GestureOutcome {
        let PointerState::Dragging(drag) = self.state else {
            return GestureOutcome::Ignored;
        };
        if drag.button != button {
            return GestureOutcome::Ignored;
        }
        self.state = PointerState::Idle;

        let point = if point.is_finite() { point } else { drag.last };
        let distance = drag.anchor.distance(point);
        if distance < self.click_threshold {
            tracing::debug!(distance, "gesture classified as click");
            sink.click(point);
            return GestureOutcome::Click(point);
        }

        let remaining = point - drag.last;
        if remaining != Vec2::ZERO {
            sink.pan(remaining);
        }
        tracing::debug!(distance, "gesture classified as pan");
        GestureOutcome::Pan
    }

    /// Abandon any gesture in progress (pointer left the surface).
    pub fn cancel(&mut self) {
        self.state = PointerState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        pans: Vec<Vec2>,
        clicks: Vec<Vec2>,
    }

    impl GestureSink for Recorder {
        fn pan(&mut self, delta: Vec2) {
            self.pans.push(delta);
        }
        fn click(&mut self, point: Vec2) {
            self.clicks.push(point);
        }
    }

    impl Recorder {
        fn total_pan(&self) -> Vec2 {
            self.pans.iter().copied().sum()
        }
    }

    fn gesture(points: &[Vec2]) -> (Recorder, GestureOutcome) {
        let mut machine = PointerStateMachine::new(5.0);
        let mut sink = Recorder::default();
        let (first, rest) = points.split_first().unwrap();
        let (last, moves) = rest.split_last().expect("gesture needs a release point");

        assert!(machine.press(PointerButton::Primary, *first));
        for &p in moves {
            machine.moved(p, &mut sink);
        }
        let outcome = machine.release(PointerButton::Primary, *last, &mut sink);
        assert!(!machine.is_dragging());
        (sink, outcome)
    }

    #[test]
    fn test_small_gesture_is_click() {
        let start = Vec2::new(100.0, 100.0);
        let (sink, outcome) = gesture(&[
            start,
            Vec2::new(101.0, 102.0),
            Vec2::new(103.0, 101.0),
            Vec2::new(102.0, 103.0),
        ]);

        assert_eq!(outcome, GestureOutcome::Click(Vec2::new(102.0, 103.0)));
        assert_eq!(sink.clicks.len(), 1);
        assert!(sink.pans.is_empty());
    }

    #[test]
    fn test_press_release_same_point_is_click() {
        let p = Vec2::new(55.0, 55.0);
        let (sink, outcome) = gesture(&[p, p]);
        assert_eq!(outcome, GestureOutcome::Click(p));
        assert_eq!(sink.clicks, vec![p]);
    }

    #[test]
    fn test_drag_pans_full_distance() {
        let (sink, outcome) = gesture(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(30.0, 5.0),
            Vec2::new(40.0, 10.0),
        ]);

        assert_eq!(outcome, GestureOutcome::Pan);
        assert!(sink.clicks.is_empty());
        assert!(!sink.pans.is_empty());
        assert_eq!(sink.total_pan(), Vec2::new(40.0, 10.0));
    }

    #[test]
    fn test_release_at_threshold_without_moves_pans() {
        let (sink, outcome) = gesture(&[Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)]);

        assert_eq!(outcome, GestureOutcome::Pan);
        assert!(sink.clicks.is_empty());
        assert_eq!(sink.pans, vec![Vec2::new(3.0, 4.0)]);
    }

    #[test]
    fn test_excursion_then_return_is_click() {
        let (sink, outcome) = gesture(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.0),
        ]);

        // The excursion panned live; the release point still decides
        assert_eq!(outcome, GestureOutcome::Click(Vec2::new(1.0, 0.0)));
        assert_eq!(sink.clicks, vec![Vec2::new(1.0, 0.0)]);
        assert_eq!(sink.total_pan(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_secondary_button_ignored() {
        let mut machine = PointerStateMachine::new(5.0);
        let mut sink = Recorder::default();

        assert!(!machine.press(PointerButton::Secondary, Vec2::ZERO));
        assert!(!machine.is_dragging());
        assert_eq!(
            machine.release(PointerButton::Secondary, Vec2::ZERO, &mut sink),
            GestureOutcome::Ignored
        );
        assert!(sink.clicks.is_empty());
    }

    #[test]
    fn test_release_of_other_button_keeps_gesture() {
        let mut machine = PointerStateMachine::new(5.0);
        let mut sink = Recorder::default();

        machine.press(PointerButton::Middle, Vec2::ZERO);
        assert_eq!(
            machine.release(PointerButton::Primary, Vec2::ZERO, &mut sink),
            GestureOutcome::Ignored
        );
        assert!(machine.is_dragging());
    }

    #[test]
    fn test_move_while_idle_does_nothing() {
        let mut machine = PointerStateMachine::new(5.0);
        let mut sink = Recorder::default();
        machine.moved(Vec2::new(50.0, 50.0), &mut sink);
        assert!(sink.pans.is_empty());
    }

    #[test]
    fn test_cancel_drops_gesture() {
        let mut machine = PointerStateMachine::new(5.0);
        let mut sink = Recorder::default();

        machine.press(PointerButton::Primary, Vec2::ZERO);
        machine.cancel();
        assert_eq!(
            machine.release(PointerButton::Primary, Vec2::ZERO, &mut sink),
            GestureOutcome::Ignored
        );
        assert!(sink.clicks.is_empty());
    }
}
