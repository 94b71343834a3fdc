// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-wide and per-group configuration.

use kurbo::Affine;

use crate::dirty::DirtyFlags;
use crate::input::{KeySymbolFn, dom_key_name};
use crate::time::{HostTime, Timebase};

/// Configuration for a [`Scene`](crate::scene::Scene).
#[derive(Clone, Copy, Debug)]
pub struct SceneConfig {
    /// Converts the host ticks passed to
    /// [`Scene::cycle`](crate::scene::Scene::cycle) into elapsed
    /// milliseconds.
    pub timebase: Timebase,
    /// Maps key codes to the symbolic names carried by key events.
    pub key_symbols: KeySymbolFn,
    /// Reads the host clock to timestamp trace phases. Without one, phases
    /// are stamped with the time of the cycle they belong to.
    pub clock: Option<fn() -> HostTime>,
}

impl SceneConfig {
    /// Nanosecond ticks and DOM key-code names.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timebase: Timebase::NANOS,
            key_symbols: dom_key_name,
            clock: None,
        }
    }

    /// Microsecond ticks, matching `performance.now() * 1000` in a browser
    /// host.
    #[must_use]
    pub const fn web() -> Self {
        Self::new().with_timebase(Timebase::MICROS)
    }

    /// Replaces the timebase.
    #[must_use]
    pub const fn with_timebase(mut self, timebase: Timebase) -> Self {
        self.timebase = timebase;
        self
    }

    /// Replaces the key-code lookup.
    #[must_use]
    pub const fn with_key_symbols(mut self, key_symbols: KeySymbolFn) -> Self {
        self.key_symbols = key_symbols;
        self
    }

    /// Sets the host clock used for trace timestamps.
    #[must_use]
    pub const fn with_clock(mut self, clock: fn() -> HostTime) -> Self {
        self.clock = Some(clock);
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Initial state of a group created with
/// [`Scene::create_group`](crate::scene::Scene::create_group).
///
/// A standalone group owns a surface until it is added to a parent, at which
/// point it starts drawing into its ancestor's surface instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupConfig {
    /// Whether the group draws into a surface of its own.
    pub owns_surface: bool,
    /// Bits treated as permanently requested.
    pub auto: DirtyFlags,
    /// Sort key among siblings; larger values are drawn later and receive
    /// input first.
    pub depth: i32,
    /// Local transform relative to the parent.
    pub transform: Affine,
}

impl GroupConfig {
    /// A surface-owning group at depth 0 with no automatic work.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            owns_surface: true,
            auto: DirtyFlags::empty(),
            depth: 0,
            transform: Affine::IDENTITY,
        }
    }

    /// Sets [`owns_surface`](Self::owns_surface).
    #[must_use]
    pub const fn with_owns_surface(mut self, owns_surface: bool) -> Self {
        self.owns_surface = owns_surface;
        self
    }

    /// Clears the surface on every step, whether requested or not.
    #[must_use]
    pub const fn with_auto_clear(mut self, on: bool) -> Self {
        self.auto = if on {
            self.auto.union(DirtyFlags::CLEAR)
        } else {
            self.auto.difference(DirtyFlags::CLEAR)
        };
        self
    }

    /// Draws on every step, whether requested or not.
    #[must_use]
    pub const fn with_auto_draw(mut self, on: bool) -> Self {
        self.auto = if on {
            self.auto.union(DirtyFlags::DRAW)
        } else {
            self.auto.difference(DirtyFlags::DRAW)
        };
        self
    }

    /// Sets [`depth`](Self::depth).
    #[must_use]
    pub const fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    /// Sets [`transform`](Self::transform).
    #[must_use]
    pub const fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self::new()
    }
}
