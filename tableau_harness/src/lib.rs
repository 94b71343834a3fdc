// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory surfaces and probe nodes for exercising tableau scenes.
//!
//! - [`MemorySurface`] is a CPU pixel buffer that counts clears and
//!   composites through a shared [`SurfaceStats`].
//! - [`Probe`] is a configurable [`Node`] that records every hook call into
//!   an [`EventLog`], optionally consuming input, requesting work while
//!   stepping, or failing a hook.

#![no_std]

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::{Affine, Rect};
use tableau_core::dirty::DirtyFlags;
use tableau_core::input::{InputState, KeyEvent};
use tableau_core::node::{Capabilities, Handled, Hook, Node, NodeCx, NodeResult};
use tableau_core::surface::{PixelBuffer, Surface};

#[cfg(test)]
mod scenarios;

// ---------------------------------------------------------------------------
// MemorySurface
// ---------------------------------------------------------------------------

/// Counters shared between a [`MemorySurface`] and the test that boxed it.
#[derive(Debug, Default)]
pub struct SurfaceStats {
    clears: Cell<u32>,
    composites: Cell<u32>,
    last_composite: Cell<Option<Affine>>,
}

impl SurfaceStats {
    /// Number of [`Surface::clear`] calls.
    #[must_use]
    pub fn clears(&self) -> u32 {
        self.clears.get()
    }

    /// Number of [`Surface::composite`] calls.
    #[must_use]
    pub fn composites(&self) -> u32 {
        self.composites.get()
    }

    /// Transform of the most recent composite.
    #[must_use]
    pub fn last_composite(&self) -> Option<Affine> {
        self.last_composite.get()
    }

    /// Zeroes the counters.
    pub fn reset(&self) {
        self.clears.set(0);
        self.composites.set(0);
        self.last_composite.set(None);
    }
}

/// A [`Surface`] backed by a `Vec<u32>` of packed pixels.
#[derive(Debug)]
pub struct MemorySurface {
    pixels: PixelBuffer,
    presented: Rect,
    stats: Rc<SurfaceStats>,
}

impl MemorySurface {
    /// Creates a `width` × `height` surface presented at its natural size at
    /// the device origin.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let presented = Rect::new(0.0, 0.0, f64::from(width), f64::from(height));
        Self::presented_at(width, height, presented)
    }

    /// Creates a `width` × `height` surface shown at `presented` in device
    /// coordinates.
    #[must_use]
    pub fn presented_at(width: u32, height: u32, presented: Rect) -> Self {
        let len = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            pixels: PixelBuffer {
                width,
                height,
                data: alloc::vec![0; len],
            },
            presented,
            stats: Rc::default(),
        }
    }

    /// Returns the shared counters; clone it before boxing the surface.
    #[must_use]
    pub fn stats(&self) -> Rc<SurfaceStats> {
        Rc::clone(&self.stats)
    }

    /// Sets every pixel to `value`.
    pub fn fill(&mut self, value: u32) {
        self.pixels.data.fill(value);
    }

    /// Returns the pixel at (`x`, `y`), if in bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.pixels.width || y >= self.pixels.height {
            return None;
        }
        let i = usize::try_from(u64::from(y) * u64::from(self.pixels.width) + u64::from(x)).ok()?;
        self.pixels.data.get(i).copied()
    }
}

impl Surface for MemorySurface {
    fn pixel_size(&self) -> (u32, u32) {
        (self.pixels.width, self.pixels.height)
    }

    fn presented_rect(&self) -> Rect {
        self.presented
    }

    fn clear(&mut self) {
        self.pixels.data.fill(0);
        self.stats.clears.set(self.stats.clears.get() + 1);
    }

    fn read_pixels(&self) -> PixelBuffer {
        self.pixels.clone()
    }

    fn write_pixels(&mut self, pixels: &PixelBuffer) {
        let w = self.pixels.width.min(pixels.width) as usize;
        let h = self.pixels.height.min(pixels.height) as usize;
        let (dst_stride, src_stride) = (self.pixels.width as usize, pixels.width as usize);
        for row in 0..h {
            let dst = &mut self.pixels.data[row * dst_stride..][..w];
            dst.copy_from_slice(&pixels.data[row * src_stride..][..w]);
        }
    }

    fn composite(&mut self, _source: &dyn Surface, transform: Affine) {
        self.stats.composites.set(self.stats.composites.get() + 1);
        self.stats.last_composite.set(Some(transform));
    }
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// What a hook call carried.
#[derive(Clone, Debug, PartialEq)]
pub enum Detail {
    /// Init, remove or draw.
    None,
    /// Step with the elapsed milliseconds.
    Elapsed(f64),
    /// Key hook with the symbolic name and code.
    Key(Option<&'static str>, u32),
    /// Pointer hook with the state in node space.
    Pointer(InputState),
    /// Touch hook with the batch in node space.
    Touches(Vec<InputState>),
}

/// One recorded hook call.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// The probe's name.
    pub name: &'static str,
    /// Which hook ran.
    pub hook: Hook,
    /// Its payload.
    pub detail: Detail,
}

/// Shared, append-only record of hook calls.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    entries: Rc<RefCell<Vec<Entry>>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: Entry) {
        self.entries.borrow_mut().push(entry);
    }

    /// Returns a copy of every entry so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.borrow().clone()
    }

    /// Returns `(name, hook)` for every entry so far.
    #[must_use]
    pub fn calls(&self) -> Vec<(&'static str, Hook)> {
        self.entries
            .borrow()
            .iter()
            .map(|e| (e.name, e.hook))
            .collect()
    }

    /// Returns the entries for `hook` only.
    #[must_use]
    pub fn of(&self, hook: Hook) -> Vec<Entry> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.hook == hook)
            .cloned()
            .collect()
    }

    /// Drops all entries.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

/// Error returned by a [`Probe`] configured to [fail](Probe::failing).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeError {
    /// The probe's name.
    pub name: &'static str,
    /// The hook that failed.
    pub hook: Hook,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe {} failed in {:?}", self.name, self.hook)
    }
}

impl core::error::Error for ProbeError {}

/// A [`Node`] that logs every hook call.
#[derive(Debug)]
pub struct Probe {
    name: &'static str,
    log: EventLog,
    capabilities: Capabilities,
    consumes: Capabilities,
    requests: DirtyFlags,
    fails: Cell<Option<Hook>>,
    fails_once: bool,
}

impl Probe {
    /// Creates a probe implementing every hook, consuming nothing.
    #[must_use]
    pub fn new(name: &'static str, log: &EventLog) -> Self {
        Self {
            name,
            log: log.clone(),
            capabilities: Capabilities::all(),
            consumes: Capabilities::empty(),
            requests: DirtyFlags::empty(),
            fails: Cell::new(None),
            fails_once: false,
        }
    }

    /// Restricts the hooks the probe declares.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Reports [`Handled::Consumed`] from the given input hooks.
    #[must_use]
    pub fn consuming(mut self, hooks: Capabilities) -> Self {
        self.consumes = hooks;
        self
    }

    /// Requests a clear and/or draw on every step.
    #[must_use]
    pub fn requesting(mut self, flags: DirtyFlags) -> Self {
        self.requests = flags;
        self
    }

    /// Returns [`ProbeError`] from `hook`.
    #[must_use]
    pub fn failing(self, hook: Hook) -> Self {
        self.fails.set(Some(hook));
        self
    }

    /// Returns [`ProbeError`] from the first call to `hook` only.
    #[must_use]
    pub fn failing_once(mut self, hook: Hook) -> Self {
        self.fails.set(Some(hook));
        self.fails_once = true;
        self
    }

    fn record(&self, hook: Hook, detail: Detail) -> NodeResult<()> {
        self.log.push(Entry {
            name: self.name,
            hook,
            detail,
        });
        if self.fails.get() == Some(hook) {
            if self.fails_once {
                self.fails.set(None);
            }
            return Err(ProbeError {
                name: self.name,
                hook,
            }
            .into());
        }
        Ok(())
    }

    fn input(&self, hook: Hook, detail: Detail) -> NodeResult<Handled> {
        self.record(hook, detail)?;
        Ok(self.consumes.contains(hook.capability()).into())
    }
}

impl Node for Probe {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn init(&mut self, _: &mut NodeCx<'_>) -> NodeResult<()> {
        self.record(Hook::Init, Detail::None)
    }

    fn remove(&mut self, _: &mut NodeCx<'_>) -> NodeResult<()> {
        self.record(Hook::Remove, Detail::None)
    }

    fn step(&mut self, elapsed_ms: f64, cx: &mut NodeCx<'_>) -> NodeResult<()> {
        if self.requests.contains(DirtyFlags::CLEAR) {
            cx.request_clear();
        }
        if self.requests.contains(DirtyFlags::DRAW) {
            cx.request_draw();
        }
        self.record(Hook::Step, Detail::Elapsed(elapsed_ms))
    }

    fn draw(&mut self, _: &mut dyn Surface, _: Affine, _: &mut NodeCx<'_>) -> NodeResult<()> {
        self.record(Hook::Draw, Detail::None)
    }

    fn key_down(&mut self, event: &KeyEvent, _: &mut NodeCx<'_>) -> NodeResult<Handled> {
        self.input(Hook::KeyDown, Detail::Key(event.key, event.key_code))
    }

    fn key_up(&mut self, event: &KeyEvent, _: &mut NodeCx<'_>) -> NodeResult<Handled> {
        self.input(Hook::KeyUp, Detail::Key(event.key, event.key_code))
    }

    fn pointer_down(&mut self, state: &InputState, _: &mut NodeCx<'_>) -> NodeResult<Handled> {
        self.input(Hook::PointerDown, Detail::Pointer(*state))
    }

    fn pointer_up(&mut self, state: &InputState, _: &mut NodeCx<'_>) -> NodeResult<Handled> {
        self.input(Hook::PointerUp, Detail::Pointer(*state))
    }

    fn pointer_move(&mut self, state: &InputState, _: &mut NodeCx<'_>) -> NodeResult<Handled> {
        self.input(Hook::PointerMove, Detail::Pointer(*state))
    }

    fn touch_start(&mut self, touches: &[InputState], _: &mut NodeCx<'_>) -> NodeResult<Handled> {
        self.input(Hook::TouchStart, Detail::Touches(touches.to_vec()))
    }

    fn touch_move(&mut self, touches: &[InputState], _: &mut NodeCx<'_>) -> NodeResult<Handled> {
        self.input(Hook::TouchMove, Detail::Touches(touches.to_vec()))
    }

    fn touch_end(&mut self, touches: &[InputState], _: &mut NodeCx<'_>) -> NodeResult<Handled> {
        self.input(Hook::TouchEnd, Detail::Touches(touches.to_vec()))
    }
}
