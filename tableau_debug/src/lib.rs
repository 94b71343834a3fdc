// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for tableau scene
//! diagnostics.
//!
//! This crate provides [`TraceSink`](tableau_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//!
//! Sinks are handed to a scene by value. To inspect one afterwards, wrap it
//! in `Rc<RefCell<_>>` and install a clone:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use tableau_core::config::GroupConfig;
//! use tableau_core::scene::Scene;
//! use tableau_core::time::HostTime;
//! use tableau_debug::recorder::{RecorderSink, decode};
//!
//! let recorder = Rc::new(RefCell::new(RecorderSink::new()));
//! let mut scene = Scene::new();
//! scene.set_trace_sink(Box::new(Rc::clone(&recorder)));
//!
//! let root = scene.create_group(GroupConfig::new());
//! scene.cycle(root, HostTime(0)).unwrap();
//!
//! assert!(decode(recorder.borrow().as_bytes()).count() > 0);
//! ```

pub mod chrome;
pub mod pretty;
pub mod recorder;
