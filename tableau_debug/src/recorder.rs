// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each prefixed with a one
//! byte tag. [`decode`] reads them back as an iterator of [`RecordedEvent`].
//! Decoding stops at the first unknown tag or truncated record.

use tableau_core::dirty::DirtyFlags;
use tableau_core::input::TouchId;
use tableau_core::node::Hook;
use tableau_core::scene::NodeId;
use tableau_core::time::HostTime;
use tableau_core::trace::{
    BindingEvent, CycleEvent, DirtyEvent, DispatchEvent, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, TouchEvent, TouchPhase, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_CYCLE: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_DISPATCH: u8 = 4;
const TAG_TOUCH: u8 = 5;
const TAG_BINDING: u8 = 6;
const TAG_DIRTY: u8 = 7;

/// Wire order of [`Hook`]; the index is the encoded byte.
const HOOKS: [Hook; 12] = [
    Hook::Init,
    Hook::Remove,
    Hook::Step,
    Hook::Draw,
    Hook::KeyDown,
    Hook::KeyUp,
    Hook::PointerDown,
    Hook::PointerUp,
    Hook::PointerMove,
    Hook::TouchStart,
    Hook::TouchMove,
    Hook::TouchEnd,
];

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_node(&mut self, id: NodeId) {
        self.write_u32(id.index());
        self.write_u32(id.generation());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Step => 0,
            PhaseKind::Clear => 1,
            PhaseKind::Draw => 2,
        });
    }

    fn write_hook(&mut self, hook: Hook) {
        let code = HOOKS.iter().position(|h| *h == hook).unwrap_or(HOOKS.len());
        #[expect(
            clippy::cast_possible_truncation,
            reason = "HOOKS has fewer than 256 entries"
        )]
        self.write_u8(code as u8);
    }
}

impl TraceSink for RecorderSink {
    fn on_cycle(&mut self, e: &CycleEvent) {
        self.write_u8(TAG_CYCLE);
        self.write_u64(e.cycle_index);
        self.write_node(e.node);
        self.write_u64(e.now.ticks());
        self.write_f64(e.elapsed_ms);
        self.write_bool(e.focused);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.cycle_index);
        self.write_node(e.node);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.cycle_index);
        self.write_node(e.node);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        self.write_u8(TAG_DISPATCH);
        self.write_node(e.node);
        self.write_hook(e.hook);
        self.write_bool(e.consumed);
    }

    fn on_touch(&mut self, e: &TouchEvent) {
        self.write_u8(TAG_TOUCH);
        self.write_node(e.node);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "finger index capped at u32::MAX for recording"
        )]
        self.write_u32(e.finger.min(u32::MAX as usize) as u32);
        self.write_i64(e.identifier.0);
        self.write_u8(match e.phase {
            TouchPhase::Begin => 0,
            TouchPhase::Move => 1,
            TouchPhase::End => 2,
        });
    }

    fn on_binding(&mut self, e: &BindingEvent) {
        self.write_u8(TAG_BINDING);
        self.write_node(e.node);
        self.write_bool(e.attached);
    }

    fn on_dirty(&mut self, e: &DirtyEvent) {
        self.write_u8(TAG_DIRTY);
        self.write_u64(e.cycle_index);
        self.write_node(e.from);
        self.write_node(e.into);
        self.write_u8(e.flags.bits());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`CycleEvent`].
    Cycle(CycleEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`DispatchEvent`].
    Dispatch(DispatchEvent),
    /// A [`TouchEvent`].
    Touch(TouchEvent),
    /// A [`BindingEvent`].
    Binding(BindingEvent),
    /// A [`DirtyEvent`].
    Dirty(DirtyEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_i64(&mut self) -> Option<i64> {
        self.take().map(i64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_node(&mut self) -> Option<NodeId> {
        let index = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(NodeId::from_raw(index, generation))
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Step,
            1 => PhaseKind::Clear,
            2 => PhaseKind::Draw,
            _ => return None,
        })
    }

    fn read_hook(&mut self) -> Option<Hook> {
        HOOKS.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_touch_phase(&mut self) -> Option<TouchPhase> {
        Some(match self.read_u8()? {
            0 => TouchPhase::Begin,
            1 => TouchPhase::Move,
            2 => TouchPhase::End,
            _ => return None,
        })
    }

    fn decode_cycle(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Cycle(CycleEvent {
            cycle_index: self.read_u64()?,
            node: self.read_node()?,
            now: HostTime(self.read_u64()?),
            elapsed_ms: self.read_f64()?,
            focused: self.read_bool()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            cycle_index: self.read_u64()?,
            node: self.read_node()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            cycle_index: self.read_u64()?,
            node: self.read_node()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_dispatch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Dispatch(DispatchEvent {
            node: self.read_node()?,
            hook: self.read_hook()?,
            consumed: self.read_bool()?,
        }))
    }

    fn decode_touch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Touch(TouchEvent {
            node: self.read_node()?,
            finger: usize::try_from(self.read_u32()?).ok()?,
            identifier: TouchId(self.read_i64()?),
            phase: self.read_touch_phase()?,
        }))
    }

    fn decode_binding(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Binding(BindingEvent {
            node: self.read_node()?,
            attached: self.read_bool()?,
        }))
    }

    fn decode_dirty(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Dirty(DirtyEvent {
            cycle_index: self.read_u64()?,
            from: self.read_node()?,
            into: self.read_node()?,
            flags: DirtyFlags::from_bits_truncate(self.read_u8()?),
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_CYCLE => self.decode_cycle(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_DISPATCH => self.decode_dispatch(),
            TAG_TOUCH => self.decode_touch(),
            TAG_BINDING => self.decode_binding(),
            TAG_DIRTY => self.decode_dirty(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
