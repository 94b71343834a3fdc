// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode 2D scene graph with input routing and dirty-flag frame
//! scheduling.
//!
//! `tableau_core` keeps a tree of drawable nodes, routes pointer, touch and
//! keyboard input to them in their own coordinate spaces, and redraws only
//! when something asked for it. It is `no_std` compatible (with `alloc`) and
//! uses struct-of-arrays storage with generational handles.
//!
//! # Architecture
//!
//! A host owns one [`Scene`](scene::Scene) and drives it from two sides:
//!
//! ```text
//!   host input ──► DeviceEvent ──► Scene::handle_event(root)
//!                                       │  binding: mouse / touches / keys
//!                                       ▼
//!                              dispatch (topmost child first,
//!                                        local coordinates)
//!
//!   host frame ──► HostTime ──► Scene::cycle(root)
//!                                       │  elapsed ms
//!                                       ▼
//!                              step ──► harvest dirty bits ──► clear / draw
//!                                                                  │
//!                                                                  ▼
//!                                                            Surface
//! ```
//!
//! **[`scene`]**: Struct-of-arrays node tree with generational handles,
//! depth-ordered children, input bindings, dispatch, stepping and drawing.
//!
//! **[`node`]**: The [`Node`](node::Node) trait for behaviors and the
//! [`NodeCx`](node::NodeCx) handed to every hook.
//!
//! **[`input`]**: Per-surface pointer state, the touch registry with stable
//! finger indices, held keys, and device-to-surface mapping.
//!
//! **[`surface`]**: The [`Surface`](surface::Surface) trait hosts implement
//! for drawing targets.
//!
//! **[`dirty`]**: Clear/draw request bits.
//!
//! **[`clock`]** and **[`time`]**: Host timestamps and elapsed-time measurement.
//!
//! **[`transform`]**: Local/parent point mapping helpers over
//! [`kurbo::Affine`].
//!
//! **[`config`]**: Scene-wide and per-group construction settings.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop and dispatch instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-group
//!   dirty propagation events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod dirty;
pub mod error;
pub mod input;
pub mod node;
pub mod scene;
pub mod surface;
pub mod time;
pub mod trace;
pub mod transform;

pub use error::SceneError;
