// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree data model.
//!
//! A *node* is an element of a retained 2D scene. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed. Using a stale handle panics.
//! - Topology: at most one parent and, for groups, an ordered list of
//!   children kept sorted by ascending [depth](Scene::set_depth). Ties keep
//!   insertion order.
//! - **Local properties** set by the caller: [transform](Scene::set_transform),
//!   [depth](Scene::set_depth), [active](Scene::set_active) and
//!   [visible](Scene::set_visible).
//! - An optional **behavior** ([`Node`](crate::node::Node)) whose hooks the
//!   scene calls while stepping, drawing and routing input.
//!
//! A *group* is a node that may have children. A group that owns a
//! [`Surface`](crate::surface::Surface) is an independent drawing and input
//! root: it carries an [`InputBinding`], clears and redraws itself when its
//! pending or automatic [`DirtyFlags`](crate::dirty::DirtyFlags) say so, and
//! is composited into its parent's surface. Adding a group under another
//! group ends its ownership; its requests then fold into the parent during
//! [`step`](Scene::step).
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.
//! Behaviors are taken out of the arena while their hooks run, so a hook may
//! freely mutate the scene through its [`NodeCx`](crate::node::NodeCx).

mod binding;
mod dispatch;
mod frame;
mod id;
mod store;
mod traverse;

pub use binding::InputBinding;
pub use id::NodeId;
pub use store::{NodeFlags, Scene};
pub use traverse::Children;
