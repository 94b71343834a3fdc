// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use super::state::TouchId;
use crate::time::HostTime;

/// One touch contact as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Host identifier, stable for the contact's lifetime.
    pub identifier: TouchId,
    /// Position in device (page) coordinates.
    pub position: Point,
}

/// A normalized window-system event aimed at a surface.
///
/// Positions are in device coordinates, the same space as
/// [`Surface::presented_rect`](crate::surface::Surface::presented_rect).
/// Touch events carry every contact currently on the surface, not only the
/// ones that changed.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceEvent {
    /// Primary button pressed.
    PointerDown {
        /// Pointer position.
        position: Point,
    },
    /// Primary button released.
    PointerUp {
        /// Pointer position.
        position: Point,
    },
    /// Pointer left the surface; handled like a release.
    PointerOut {
        /// Pointer position.
        position: Point,
    },
    /// Pointer moved, held or not.
    PointerMove {
        /// Pointer position.
        position: Point,
    },
    /// One or more contacts began.
    TouchStart {
        /// All contacts on the surface.
        touches: Vec<Contact>,
    },
    /// One or more contacts moved.
    TouchMove {
        /// All contacts on the surface.
        touches: Vec<Contact>,
    },
    /// One or more contacts ended.
    TouchEnd {
        /// Contacts still on the surface.
        touches: Vec<Contact>,
    },
    /// Contacts were interrupted by the host; handled like [`TouchEnd`](Self::TouchEnd).
    TouchCancel {
        /// Contacts still on the surface.
        touches: Vec<Contact>,
    },
    /// A key went down. Auto-repeat is filtered by the scene.
    KeyDown {
        /// Host key code.
        key_code: u32,
    },
    /// A key went up.
    KeyUp {
        /// Host key code.
        key_code: u32,
    },
    /// The surface regained input focus at host time `at`.
    FocusGained {
        /// Host time of the focus change.
        at: HostTime,
    },
    /// The surface lost input focus.
    FocusLost,
}

/// Converts a device position into surface pixel coordinates.
///
/// `presented` is where the surface appears in device space and `pixel_size`
/// its backing resolution; the two may differ when the host scales the
/// surface for display.
#[must_use]
pub fn device_to_surface(presented: Rect, pixel_size: (u32, u32), position: Point) -> Point {
    let offset = position - presented.origin();
    Point::new(
        offset.x * f64::from(pixel_size.0) / presented.width(),
        offset.y * f64::from(pixel_size.1) / presented.height(),
    )
}
