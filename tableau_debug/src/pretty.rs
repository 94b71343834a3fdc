// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use tableau_core::scene::NodeId;
use tableau_core::time::{HostTime, Timebase};
use tableau_core::trace::{
    BindingEvent, CycleEvent, DirtyEvent, DispatchEvent, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, TouchEvent, TouchPhase, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn host_us(&self, t: HostTime) -> f64 {
        t.to_nanos(self.timebase) as f64 / 1000.0
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Step => "step",
        PhaseKind::Clear => "clear",
        PhaseKind::Draw => "draw",
    }
}

fn node(id: NodeId) -> String {
    format!("#{}.{}", id.index(), id.generation())
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_cycle(&mut self, e: &CycleEvent) {
        let focus = if e.focused { "focused" } else { "blurred" };
        let _ = writeln!(
            self.writer,
            "[cycle] #{} node={} now={:.1}µs elapsed={:.3}ms {focus}",
            e.cycle_index,
            node(e.node),
            self.host_us(e.now),
            e.elapsed_ms,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] cycle={} node={} {} at {:.1}µs",
            e.cycle_index,
            node(e.node),
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] cycle={} node={} {} at {:.1}µs",
            e.cycle_index,
            node(e.node),
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        let outcome = if e.consumed { "consumed" } else { "ignored" };
        let _ = writeln!(
            self.writer,
            "[dispatch] node={} {:?} {outcome}",
            node(e.node),
            e.hook,
        );
    }

    fn on_touch(&mut self, e: &TouchEvent) {
        let phase = match e.phase {
            TouchPhase::Begin => "begin",
            TouchPhase::Move => "move",
            TouchPhase::End => "end",
        };
        let _ = writeln!(
            self.writer,
            "[touch:{phase}] node={} finger={} id={}",
            node(e.node),
            e.finger,
            e.identifier.0,
        );
    }

    fn on_binding(&mut self, e: &BindingEvent) {
        let what = if e.attached { "attach" } else { "detach" };
        let _ = writeln!(self.writer, "[binding:{what}] node={}", node(e.node));
    }

    fn on_dirty(&mut self, e: &DirtyEvent) {
        let _ = writeln!(
            self.writer,
            "[dirty] cycle={} {} -> {} {:?}",
            e.cycle_index,
            node(e.from),
            node(e.into),
            e.flags,
        );
    }
}
