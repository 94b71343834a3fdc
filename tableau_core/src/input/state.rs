// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point, Vec2};

use crate::transform::{scale_factors, to_local};

/// Host-assigned identifier of a touch contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TouchId(pub i64);

/// One pointer's state, expressed in some coordinate space.
///
/// The mouse binding and each touch registry entry hold the authoritative
/// copy in surface pixel space. Dispatch hands out copies that every visited
/// node re-expresses in its own local space with [`to_local`](Self::to_local).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputState {
    /// Current position.
    pub position: Point,
    /// Position when the pointer went down.
    pub start: Point,
    /// `position - start`.
    pub delta: Vec2,
    /// Accumulated travel distance since the pointer went down.
    pub length: f64,
    /// Whether the pointer is currently down.
    pub held: bool,
    /// Stable small index for touches; always 0 for the mouse.
    pub finger: usize,
    /// Host identifier for touches; `None` for the mouse.
    pub identifier: Option<TouchId>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            start: Point::ZERO,
            delta: Vec2::ZERO,
            length: 0.0,
            held: false,
            finger: 0,
            identifier: None,
        }
    }
}

impl InputState {
    /// A touch entry that just went down at `position`.
    #[must_use]
    pub fn touch(identifier: TouchId, finger: usize, position: Point) -> Self {
        Self {
            position,
            start: position,
            held: true,
            finger,
            identifier: Some(identifier),
            ..Self::default()
        }
    }

    /// Re-expresses this snapshot in the space described by `local`.
    ///
    /// Both points are mapped through the inverse of `local`, the delta is
    /// recomputed from them, and the travel length is multiplied by the
    /// horizontal and vertical scale factors of `local`. That product only
    /// tracks real distances for axis-aligned scaling; rotation and skew are
    /// not accounted for.
    #[must_use]
    pub fn to_local(self, local: Affine) -> Self {
        let position = to_local(local, self.position);
        let start = to_local(local, self.start);
        let scale = scale_factors(local);
        Self {
            position,
            start,
            delta: position - start,
            length: self.length * scale.x * scale.y,
            ..self
        }
    }

    /// Starts a press at the current position.
    pub fn press(&mut self) {
        self.start = self.position;
        self.delta = Vec2::ZERO;
        self.length = 0.0;
        self.held = true;
    }

    /// Moves to `position`, accumulating travel length.
    ///
    /// Returns the distance moved. The delta only follows while held.
    pub fn move_to(&mut self, position: Point) -> f64 {
        let distance = (position - self.position).hypot();
        self.length += distance;
        self.position = position;
        if self.held {
            self.delta = self.position - self.start;
        }
        distance
    }

    /// Marks the pointer as released. Start, delta and length keep their
    /// values until [`reset_gesture`](Self::reset_gesture).
    pub fn release(&mut self) {
        self.held = false;
    }

    /// Forgets the finished gesture.
    pub fn reset_gesture(&mut self) {
        self.start = Point::ZERO;
        self.delta = Vec2::ZERO;
        self.length = 0.0;
    }
}
