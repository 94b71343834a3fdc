// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node behavior: the hooks a scene calls and the capability set that says
//! which of them a node actually implements.
//!
//! A [`Node`] is attached to a scene slot with
//! [`Scene::create_node`](crate::scene::Scene::create_node) (a leaf) or
//! [`Scene::create_group_with`](crate::scene::Scene::create_group_with) (a
//! group with its own behavior). Every hook has a default body, but the scene
//! only calls the hooks named in [`Node::capabilities`]; a leaf without
//! [`Capabilities::POINTER_DOWN`] is skipped during pointer-down dispatch
//! exactly as if it were not there.
//!
//! Hooks receive a [`NodeCx`] giving them their own id, their parent, and
//! mutable access to the scene. While a hook runs, the node's behavior is
//! checked out of the scene, so anything the hook does to the scene cannot
//! reach the node's own hooks again.

use alloc::boxed::Box;

use bitflags::bitflags;
use kurbo::Affine;

use crate::dirty::DirtyFlags;
use crate::input::{InputState, KeyEvent};
use crate::scene::{NodeId, Scene};
use crate::surface::Surface;

/// Error type returned by node hooks.
pub type NodeError = Box<dyn core::error::Error>;

/// Result type returned by node hooks.
pub type NodeResult<T> = Result<T, NodeError>;

bitflags! {
    /// Hooks a node implements.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Capabilities: u16 {
        /// [`Node::init`]
        const INIT = 1 << 0;
        /// [`Node::remove`]
        const REMOVE = 1 << 1;
        /// [`Node::step`]
        const STEP = 1 << 2;
        /// [`Node::draw`]
        const DRAW = 1 << 3;
        /// [`Node::key_down`]
        const KEY_DOWN = 1 << 4;
        /// [`Node::key_up`]
        const KEY_UP = 1 << 5;
        /// [`Node::pointer_down`]
        const POINTER_DOWN = 1 << 6;
        /// [`Node::pointer_up`]
        const POINTER_UP = 1 << 7;
        /// [`Node::pointer_move`]
        const POINTER_MOVE = 1 << 8;
        /// [`Node::touch_start`]
        const TOUCH_START = 1 << 9;
        /// [`Node::touch_move`]
        const TOUCH_MOVE = 1 << 10;
        /// [`Node::touch_end`]
        const TOUCH_END = 1 << 11;

        /// Both key hooks.
        const KEYS = Self::KEY_DOWN.bits() | Self::KEY_UP.bits();
        /// All three pointer hooks.
        const POINTER = Self::POINTER_DOWN.bits() | Self::POINTER_UP.bits() | Self::POINTER_MOVE.bits();
        /// All three touch hooks.
        const TOUCH = Self::TOUCH_START.bits() | Self::TOUCH_MOVE.bits() | Self::TOUCH_END.bits();
    }
}

/// Names a hook, for errors and tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hook {
    /// [`Node::init`]
    Init,
    /// [`Node::remove`]
    Remove,
    /// [`Node::step`]
    Step,
    /// [`Node::draw`]
    Draw,
    /// [`Node::key_down`]
    KeyDown,
    /// [`Node::key_up`]
    KeyUp,
    /// [`Node::pointer_down`]
    PointerDown,
    /// [`Node::pointer_up`]
    PointerUp,
    /// [`Node::pointer_move`]
    PointerMove,
    /// [`Node::touch_start`]
    TouchStart,
    /// [`Node::touch_move`]
    TouchMove,
    /// [`Node::touch_end`]
    TouchEnd,
}

impl Hook {
    /// The capability bit that enables this hook.
    #[must_use]
    pub const fn capability(self) -> Capabilities {
        match self {
            Self::Init => Capabilities::INIT,
            Self::Remove => Capabilities::REMOVE,
            Self::Step => Capabilities::STEP,
            Self::Draw => Capabilities::DRAW,
            Self::KeyDown => Capabilities::KEY_DOWN,
            Self::KeyUp => Capabilities::KEY_UP,
            Self::PointerDown => Capabilities::POINTER_DOWN,
            Self::PointerUp => Capabilities::POINTER_UP,
            Self::PointerMove => Capabilities::POINTER_MOVE,
            Self::TouchStart => Capabilities::TOUCH_START,
            Self::TouchMove => Capabilities::TOUCH_MOVE,
            Self::TouchEnd => Capabilities::TOUCH_END,
        }
    }
}

/// Whether an input hook took the event.
///
/// Dispatch among siblings stops at the first [`Consumed`](Self::Consumed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Handled {
    /// The event is taken; siblings underneath do not see it.
    Consumed,
    /// The event continues to the next sibling.
    #[default]
    Ignored,
}

impl Handled {
    /// Returns `true` for [`Consumed`](Self::Consumed).
    #[inline]
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

impl From<bool> for Handled {
    fn from(consumed: bool) -> Self {
        if consumed {
            Self::Consumed
        } else {
            Self::Ignored
        }
    }
}

/// Behavior attached to a scene node.
#[expect(unused_variables, reason = "default hook bodies ignore their arguments")]
pub trait Node {
    /// Hooks this node implements. Hooks outside this set are never called.
    fn capabilities(&self) -> Capabilities;

    /// Called after the node was added to the parent [`NodeCx::parent`].
    fn init(&mut self, cx: &mut NodeCx<'_>) -> NodeResult<()> {
        Ok(())
    }

    /// Called after an active node was removed from the parent
    /// [`NodeCx::parent`] (which is no longer recorded in the scene).
    fn remove(&mut self, cx: &mut NodeCx<'_>) -> NodeResult<()> {
        Ok(())
    }

    /// Advances the node by `elapsed_ms` milliseconds.
    fn step(&mut self, elapsed_ms: f64, cx: &mut NodeCx<'_>) -> NodeResult<()> {
        Ok(())
    }

    /// Paints into `surface`; `transform` maps node space to surface pixels.
    fn draw(
        &mut self,
        surface: &mut dyn Surface,
        transform: Affine,
        cx: &mut NodeCx<'_>,
    ) -> NodeResult<()> {
        Ok(())
    }

    /// A key went down for the first time since its last release.
    fn key_down(&mut self, event: &KeyEvent, cx: &mut NodeCx<'_>) -> NodeResult<Handled> {
        Ok(Handled::Ignored)
    }

    /// A key went up.
    fn key_up(&mut self, event: &KeyEvent, cx: &mut NodeCx<'_>) -> NodeResult<Handled> {
        Ok(Handled::Ignored)
    }

    /// A pointer (the mouse or one touch finger) went down. `state` is in
    /// node space.
    fn pointer_down(&mut self, state: &InputState, cx: &mut NodeCx<'_>) -> NodeResult<Handled> {
        Ok(Handled::Ignored)
    }

    /// A pointer went up or left the surface.
    fn pointer_up(&mut self, state: &InputState, cx: &mut NodeCx<'_>) -> NodeResult<Handled> {
        Ok(Handled::Ignored)
    }

    /// A pointer moved.
    fn pointer_move(&mut self, state: &InputState, cx: &mut NodeCx<'_>) -> NodeResult<Handled> {
        Ok(Handled::Ignored)
    }

    /// New contacts began; `touches` holds every live contact in node space.
    fn touch_start(&mut self, touches: &[InputState], cx: &mut NodeCx<'_>) -> NodeResult<Handled> {
        Ok(Handled::Ignored)
    }

    /// Contacts moved; `touches` holds every live contact in node space.
    fn touch_move(&mut self, touches: &[InputState], cx: &mut NodeCx<'_>) -> NodeResult<Handled> {
        Ok(Handled::Ignored)
    }

    /// Contacts ended; `touches` holds the contacts still live.
    fn touch_end(&mut self, touches: &[InputState], cx: &mut NodeCx<'_>) -> NodeResult<Handled> {
        Ok(Handled::Ignored)
    }
}

/// Context handed to every [`Node`] hook.
#[derive(Debug)]
pub struct NodeCx<'a> {
    pub(crate) scene: &'a mut Scene,
    pub(crate) node: NodeId,
    pub(crate) parent: Option<NodeId>,
}

impl<'a> NodeCx<'a> {
    pub(crate) fn new(scene: &'a mut Scene, node: NodeId, parent: Option<NodeId>) -> Self {
        Self {
            scene,
            node,
            parent,
        }
    }

    /// The node whose hook is running.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.node
    }

    /// The parent relevant to this call.
    ///
    /// For [`Node::remove`] this is the group the node was just removed
    /// from; otherwise it is the node's current parent.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Read access to the scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// Write access to the scene.
    ///
    /// Structural changes made here apply to later traversals; the one in
    /// progress keeps visiting the children it started with, minus any that
    /// were destroyed.
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.scene
    }

    /// Asks for a redraw on the next step.
    ///
    /// A group marks itself; a leaf marks its parent group.
    pub fn request_draw(&mut self) {
        self.request(DirtyFlags::DRAW);
    }

    /// Asks for the surface to be cleared on the next step.
    ///
    /// A group marks itself; a leaf marks its parent group.
    pub fn request_clear(&mut self) {
        self.request(DirtyFlags::CLEAR);
    }

    fn request(&mut self, flags: DirtyFlags) {
        let target = if self.scene.is_group(self.node) {
            Some(self.node)
        } else {
            self.parent.filter(|&p| self.scene.is_alive(p))
        };
        if let Some(group) = target {
            self.scene.request(group, flags);
        }
    }
}
