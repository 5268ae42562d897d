//! Pointer input events for painting.
//!
//! Mouse and touch input both arrive as [`PointerEvent`]s with coordinates
//! local to the canvas element.

use serde::{Deserialize, Serialize};

use crate::Point;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed or finger down.
    Down,
    /// Pointer moved.
    Move,
    /// Button released or finger lifted.
    Up,
    /// Pointer left the canvas.
    Leave,
}

/// A single pointer event in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// X position in canvas coordinates.
    pub x: f32,
    /// Y position in canvas coordinates.
    pub y: f32,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self { phase, x, y }
    }

    /// Pointer-down at a position.
    #[must_use]
    pub const fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    /// Pointer-move to a position.
    #[must_use]
    pub const fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    /// Pointer-up at a position.
    #[must_use]
    pub const fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    /// Pointer left the canvas at a position.
    #[must_use]
    pub const fn leave(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Leave, x, y)
    }

    /// Position of the event.
    #[must_use]
    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether this event ends a stroke.
    #[must_use]
    pub const fn ends_stroke(&self) -> bool {
        matches!(self.phase, PointerPhase::Up | PointerPhase::Leave)
    }
}
