//! Gesture state machine.
//!
//! `Idle → Armed` on pointer-down, `Armed → Active` on the first pointer
//! move, back to `Idle` on pointer-up or pointer-leave. Only one gesture
//! exists at a time, so move, resize, draw and pan exclude each other.

use vd_core::{DrawGesture, MoveGesture, NodeType, Point, ResizeGesture, ResizeHandle};

/// What a pointer-down will turn into once the pointer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Move,
    Resize(ResizeHandle),
    Draw(NodeType),
    Pan,
}

/// Drag the view: the pan offset follows the pointer.
#[derive(Debug, Clone, Copy)]
pub struct PanGesture {
    origin: Point,
    start_pan: Point,
}

impl PanGesture {
    pub fn begin(origin: Point, start_pan: Point) -> Self {
        Self { origin, start_pan }
    }

    /// Pan offset for the current pointer position.
    pub fn pan_at(&self, pointer: Point) -> Point {
        Point::new(
            self.start_pan.x + pointer.x - self.origin.x,
            self.start_pan.y + pointer.y - self.origin.y,
        )
    }
}

/// A running drag.
#[derive(Debug, Clone)]
pub enum Gesture {
    Move(MoveGesture),
    Resize(ResizeGesture),
    Draw(DrawGesture),
    Pan(PanGesture),
}

#[derive(Debug, Clone, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pointer is down but has not moved yet.
    Armed { origin: Point, intent: Intent },
    Active(Gesture),
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, GestureState::Active(_))
    }
}
