// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for scene cycles and input dispatch.
//!
//! This module provides a [`TraceSink`] trait with one method per event the
//! scene emits. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! A [`Scene`](crate::scene::Scene) owns a [`Tracer`], which wraps an
//! optional boxed sink installed with
//! [`Scene::set_trace_sink`](crate::scene::Scene::set_trace_sink). When the
//! `trace` feature is **off**, every `Tracer` method compiles to nothing and
//! installed sinks are dropped. When **on**, each method performs a single
//! `Option` branch before dispatching.
//!
//! To read a sink back after handing it to the scene, share it: `TraceSink`
//! is implemented for `Rc<RefCell<S>>`.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) — gates [`DirtyEvent`] and the
//!   corresponding `TraceSink` method.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use crate::input::TouchId;
use crate::node::Hook;
use crate::scene::NodeId;
use crate::time::HostTime;

#[cfg(feature = "trace-rich")]
use crate::dirty::DirtyFlags;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which part of a step is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Stepping the subtree.
    Step,
    /// Clearing a surface.
    Clear,
    /// Drawing the subtree into a surface.
    Draw,
}

/// What happened to a touch contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// The contact began and was given a finger index.
    Begin,
    /// The contact moved by a non-zero distance.
    Move,
    /// The contact ended and its finger index was freed.
    End,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the start of every [`Scene::cycle`](crate::scene::Scene::cycle).
#[derive(Clone, Copy, Debug)]
pub struct CycleEvent {
    /// Monotonic cycle counter.
    pub cycle_index: u64,
    /// The node being cycled.
    pub node: NodeId,
    /// Host time passed to the cycle.
    pub now: HostTime,
    /// Milliseconds handed to the step; 0 when unfocused.
    pub elapsed_ms: f64,
    /// Whether the node had focus (and therefore stepped).
    pub focused: bool,
}

/// Marks the beginning of a phase on one surface owner.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Cycle counter.
    pub cycle_index: u64,
    /// The surface owner.
    pub node: NodeId,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a phase on one surface owner.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Cycle counter.
    pub cycle_index: u64,
    /// The surface owner.
    pub node: NodeId,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted once per input event family dispatched from a surface owner.
#[derive(Clone, Copy, Debug)]
pub struct DispatchEvent {
    /// The surface owner the event entered through.
    pub node: NodeId,
    /// Which hook family was dispatched.
    pub hook: Hook,
    /// Whether some node consumed it.
    pub consumed: bool,
}

/// Emitted when a touch registry entry changes.
#[derive(Clone, Copy, Debug)]
pub struct TouchEvent {
    /// The surface owner whose registry changed.
    pub node: NodeId,
    /// Finger index of the contact.
    pub finger: usize,
    /// Host identifier of the contact.
    pub identifier: TouchId,
    /// What happened.
    pub phase: TouchPhase,
}

/// Emitted when a group starts or stops receiving device events.
#[derive(Clone, Copy, Debug)]
pub struct BindingEvent {
    /// The group.
    pub node: NodeId,
    /// `true` on attach, `false` on teardown.
    pub attached: bool,
}

/// A child's pending work being folded into its parent during a step.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct DirtyEvent {
    /// Cycle counter.
    pub cycle_index: u64,
    /// The child group that was harvested.
    pub from: NodeId,
    /// The parent receiving the bits.
    pub into: NodeId,
    /// Bits that were folded in.
    pub flags: DirtyFlags,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from a scene.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a cycle starts.
    fn on_cycle(&mut self, e: &CycleEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after an input event family has been dispatched.
    fn on_dispatch(&mut self, e: &DispatchEvent) {
        _ = e;
    }

    /// Called when a touch contact begins, moves or ends.
    fn on_touch(&mut self, e: &TouchEvent) {
        _ = e;
    }

    /// Called when a device binding is attached or torn down.
    fn on_binding(&mut self, e: &BindingEvent) {
        _ = e;
    }

    /// Called when a child's pending work is folded into its parent
    /// (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_dirty(&mut self, e: &DirtyEvent) {
        _ = e;
    }
}

impl<S: TraceSink + ?Sized> TraceSink for Rc<RefCell<S>> {
    fn on_cycle(&mut self, e: &CycleEvent) {
        self.borrow_mut().on_cycle(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.borrow_mut().on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.borrow_mut().on_phase_end(e);
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        self.borrow_mut().on_dispatch(e);
    }

    fn on_touch(&mut self, e: &TouchEvent) {
        self.borrow_mut().on_touch(e);
    }

    fn on_binding(&mut self, e: &BindingEvent) {
        self.borrow_mut().on_binding(e);
    }

    #[cfg(feature = "trace-rich")]
    fn on_dirty(&mut self, e: &DirtyEvent) {
        self.borrow_mut().on_dirty(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin owner of an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns whether events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`CycleEvent`].
    #[inline]
    pub fn cycle(&mut self, e: &CycleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cycle(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DispatchEvent`].
    #[inline]
    pub fn dispatch(&mut self, e: &DispatchEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_dispatch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TouchEvent`].
    #[inline]
    pub fn touch(&mut self, e: &TouchEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_touch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BindingEvent`].
    #[inline]
    pub fn binding(&mut self, e: &BindingEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_binding(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DirtyEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn dirty(&mut self, e: &DirtyEvent) {
        if let Some(s) = &mut self.sink {
            s.on_dirty(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
