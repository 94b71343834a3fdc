// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-group redraw bookkeeping.
//!
//! Each group carries two [`DirtyFlags`] sets: the *requested* set, raised by
//! the group itself or harvested from its children during a step, and the
//! *automatic* set, which is treated as permanently raised.
//!
//! # Propagation
//!
//! Dirtiness only ever moves upward, and only across groups that do not own
//! a surface. After a non-owning group child has stepped, its requested and
//! automatic bits are OR'ed into the parent's requested set and the child's
//! requested set is emptied. A surface-owning group consumes its own bits at
//! the end of its step: [`CLEAR`](DirtyFlags::CLEAR) clears the surface and
//! is reset; [`DRAW`](DirtyFlags::DRAW) triggers a draw, which resets it.
//!
//! The net effect is that any number of nested requests in one cycle cause
//! at most one clear and one draw of the nearest surface owner.

use bitflags::bitflags;

bitflags! {
    /// Which surface work a group is waiting for.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u8 {
        /// The surface must be cleared before the next draw.
        const CLEAR = 1 << 0;
        /// The subtree must be redrawn.
        const DRAW = 1 << 1;
    }
}

impl DirtyFlags {
    /// Returns the bits that must be reported upward: the requested bits plus
    /// the automatic ones.
    #[inline]
    #[must_use]
    pub fn effective(self, auto: Self) -> Self {
        self | auto
    }
}
