// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Topmost-first input routing.
//!
//! Every event family follows the same walk. The visited node first
//! re-expresses pointer and touch snapshots in its own local space. A group
//! then offers the event to its children from the highest depth down,
//! skipping destroyed and inactive children, leaves without the matching
//! hook, and (for pointer and touch events) groups with a surface of their
//! own, which get their input from the host directly. The first child to
//! consume the event ends the walk. If none did, the group's own behavior
//! gets the event last.

use alloc::vec::Vec;

use kurbo::Affine;

use super::id::NodeId;
use super::store::Scene;
use crate::error::SceneError;
use crate::input::{InputState, KeyEvent};
use crate::node::{Handled, Hook};
use crate::trace::DispatchEvent;

/// What is being dispatched, in the space of the node about to receive it.
#[derive(Clone, Debug)]
pub(crate) enum Payload<'a> {
    Key(&'a KeyEvent),
    Pointer(InputState),
    Touches(Vec<InputState>),
}

impl Payload<'_> {
    fn to_local(&self, local: Affine) -> Self {
        match self {
            Self::Key(event) => Self::Key(*event),
            Self::Pointer(state) => Self::Pointer(state.to_local(local)),
            Self::Touches(touches) => {
                Self::Touches(touches.iter().map(|t| t.to_local(local)).collect())
            }
        }
    }

    fn is_positional(&self) -> bool {
        !matches!(self, Self::Key(_))
    }
}

impl Scene {
    /// Dispatches a key transition into `id`'s subtree.
    ///
    /// `hook` must be [`Hook::KeyDown`] or [`Hook::KeyUp`]; other hooks are
    /// not called. No debouncing happens here, unlike
    /// [`handle_event`](Self::handle_event).
    ///
    /// # Errors
    ///
    /// Returns the first hook error, abandoning the walk.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn dispatch_key(
        &mut self,
        id: NodeId,
        hook: Hook,
        event: &KeyEvent,
    ) -> Result<Handled, SceneError> {
        self.validate(id);
        let parent = self.parent(id);
        self.dispatch_node(id, parent, hook, &Payload::Key(event))
    }

    /// Dispatches one pointer snapshot into `id`'s subtree.
    ///
    /// `state` is in the space of `id`'s parent (surface pixels for a
    /// surface-owning root). `hook` must be one of the pointer hooks.
    ///
    /// # Errors
    ///
    /// Returns the first hook error, abandoning the walk.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn dispatch_pointer(
        &mut self,
        id: NodeId,
        hook: Hook,
        state: InputState,
    ) -> Result<Handled, SceneError> {
        self.validate(id);
        let parent = self.parent(id);
        self.dispatch_node(id, parent, hook, &Payload::Pointer(state))
    }

    /// Dispatches a set of touch snapshots into `id`'s subtree.
    ///
    /// Like [`dispatch_pointer`](Self::dispatch_pointer), but for the batched
    /// touch hooks.
    ///
    /// # Errors
    ///
    /// Returns the first hook error, abandoning the walk.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn dispatch_touches(
        &mut self,
        id: NodeId,
        hook: Hook,
        touches: &[InputState],
    ) -> Result<Handled, SceneError> {
        self.validate(id);
        let parent = self.parent(id);
        self.dispatch_node(id, parent, hook, &Payload::Touches(touches.to_vec()))
    }

    /// Entry point for events arriving through a binding.
    pub(crate) fn dispatch_from(
        &mut self,
        id: NodeId,
        hook: Hook,
        payload: Payload<'_>,
    ) -> Result<Handled, SceneError> {
        // An earlier hook in the same device event may have destroyed the root.
        if !self.is_alive(id) {
            return Ok(Handled::Ignored);
        }
        let parent = self.parent(id);
        let handled = self.dispatch_node(id, parent, hook, &payload)?;
        self.tracer.dispatch(&DispatchEvent {
            node: id,
            hook,
            consumed: handled.is_consumed(),
        });
        Ok(handled)
    }

    fn dispatch_node(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        hook: Hook,
        payload: &Payload<'_>,
    ) -> Result<Handled, SceneError> {
        let local = payload.to_local(self.transform[id.slot()]);

        if self.group[id.slot()].is_some() {
            let children: Vec<NodeId> = self.children[id.slot()].clone();
            for &child in children.iter().rev() {
                if !self.accepts(child, hook, &local) {
                    continue;
                }
                if self.dispatch_node(child, Some(id), hook, &local)?.is_consumed() {
                    return Ok(Handled::Consumed);
                }
            }
            if !self.is_alive(id) {
                return Ok(Handled::Ignored);
            }
        }

        self.invoke_input(id, parent, hook, &local)
    }

    fn accepts(&self, child: NodeId, hook: Hook, payload: &Payload<'_>) -> bool {
        if !self.is_alive(child) || !self.flags[child.slot()].active {
            return false;
        }
        match &self.group[child.slot()] {
            Some(group) => !(payload.is_positional() && group.owns_surface),
            None => self.capabilities[child.slot()].contains(hook.capability()),
        }
    }

    fn invoke_input(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
        hook: Hook,
        payload: &Payload<'_>,
    ) -> Result<Handled, SceneError> {
        let handled = match (hook, payload) {
            (Hook::KeyDown, Payload::Key(e)) => self.call(id, hook, parent, |n, cx| n.key_down(e, cx)),
            (Hook::KeyUp, Payload::Key(e)) => self.call(id, hook, parent, |n, cx| n.key_up(e, cx)),
            (Hook::PointerDown, Payload::Pointer(s)) => {
                self.call(id, hook, parent, |n, cx| n.pointer_down(s, cx))
            }
            (Hook::PointerUp, Payload::Pointer(s)) => {
                self.call(id, hook, parent, |n, cx| n.pointer_up(s, cx))
            }
            (Hook::PointerMove, Payload::Pointer(s)) => {
                self.call(id, hook, parent, |n, cx| n.pointer_move(s, cx))
            }
            (Hook::TouchStart, Payload::Touches(t)) => {
                self.call(id, hook, parent, |n, cx| n.touch_start(t, cx))
            }
            (Hook::TouchMove, Payload::Touches(t)) => {
                self.call(id, hook, parent, |n, cx| n.touch_move(t, cx))
            }
            (Hook::TouchEnd, Payload::Touches(t)) => {
                self.call(id, hook, parent, |n, cx| n.touch_end(t, cx))
            }
            _ => Ok(None),
        }?;
        Ok(handled.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use core::fmt;

    use kurbo::Point;

    use super::*;
    use crate::config::GroupConfig;
    use crate::input::KeyState;
    use crate::node::{Capabilities, Node, NodeCx, NodeResult};

    type Visits = Rc<RefCell<Vec<&'static str>>>;

    struct Tap {
        name: &'static str,
        consume: bool,
        visits: Visits,
        seen_at: Rc<RefCell<Option<Point>>>,
    }

    impl Node for Tap {
        fn capabilities(&self) -> Capabilities {
            Capabilities::POINTER_DOWN | Capabilities::KEY_DOWN | Capabilities::TOUCH_START
        }

        fn pointer_down(&mut self, s: &InputState, _: &mut NodeCx<'_>) -> NodeResult<Handled> {
            self.visits.borrow_mut().push(self.name);
            *self.seen_at.borrow_mut() = Some(s.position);
            Ok(self.consume.into())
        }

        fn key_down(&mut self, _: &KeyEvent, _: &mut NodeCx<'_>) -> NodeResult<Handled> {
            self.visits.borrow_mut().push(self.name);
            Ok(self.consume.into())
        }

        fn touch_start(&mut self, t: &[InputState], _: &mut NodeCx<'_>) -> NodeResult<Handled> {
            self.visits.borrow_mut().push(self.name);
            *self.seen_at.borrow_mut() = t.first().map(|s| s.position);
            Ok(self.consume.into())
        }
    }

    fn tap(name: &'static str, consume: bool, visits: &Visits) -> Tap {
        Tap {
            name,
            consume,
            visits: Rc::clone(visits),
            seen_at: Rc::default(),
        }
    }

    fn key(code: u32) -> KeyEvent {
        KeyEvent {
            key: None,
            key_code: code,
            keys_down: KeyState::new(),
        }
    }

    fn down_at(x: f64, y: f64) -> InputState {
        let mut s = InputState {
            position: Point::new(x, y),
            ..InputState::default()
        };
        s.press();
        s
    }

    #[test]
    fn topmost_consumer_stops_the_walk() {
        let mut scene = Scene::new();
        let visits = Visits::default();
        let root = scene.create_group(GroupConfig::new());
        let low = scene.create_node(tap("low", true, &visits));
        let mid = scene.create_node(tap("mid", true, &visits));
        let top = scene.create_node(tap("top", false, &visits));
        scene.add_all(root, [low, mid, top]).unwrap();
        scene.set_depth(low, 0);
        scene.set_depth(mid, 1);
        scene.set_depth(top, 2);

        let handled = scene
            .dispatch_pointer(root, Hook::PointerDown, down_at(0.0, 0.0))
            .unwrap();
        assert!(handled.is_consumed());
        assert_eq!(*visits.borrow(), vec!["top", "mid"]);
    }

    #[test]
    fn inactive_and_incapable_children_are_skipped() {
        struct Mute;
        impl Node for Mute {
            fn capabilities(&self) -> Capabilities {
                Capabilities::STEP
            }
        }

        let mut scene = Scene::new();
        let visits = Visits::default();
        let root = scene.create_group(GroupConfig::new());
        let a = scene.create_node(tap("a", false, &visits));
        let b = scene.create_node(tap("b", true, &visits));
        let mute = scene.create_node(Mute);
        scene.add_all(root, [a, b, mute]).unwrap();
        scene.set_active(b, false);

        let handled = scene
            .dispatch_key(root, Hook::KeyDown, &key(65))
            .unwrap();
        assert_eq!(handled, Handled::Ignored);
        assert_eq!(*visits.borrow(), vec!["a"]);
    }

    #[test]
    fn nested_groups_see_local_coordinates() {
        let mut scene = Scene::new();
        let visits = Visits::default();
        let root = scene.create_group(
            GroupConfig::new().with_transform(Affine::translate((10.0, 10.0))),
        );
        let inner = scene.create_group(GroupConfig::new().with_transform(Affine::scale(2.0)));
        let leaf = tap("leaf", true, &visits);
        let seen = Rc::clone(&leaf.seen_at);
        let leaf = scene.create_node(leaf);
        scene.add(root, inner).unwrap();
        scene.add(inner, leaf).unwrap();

        let handled = scene
            .dispatch_pointer(root, Hook::PointerDown, down_at(100.0, 50.0))
            .unwrap();
        assert!(handled.is_consumed());
        assert_eq!(*seen.borrow(), Some(Point::new(45.0, 20.0)));

        let _ = scene
            .dispatch_touches(root, Hook::TouchStart, &[down_at(100.0, 50.0)])
            .unwrap();
        assert_eq!(*seen.borrow(), Some(Point::new(45.0, 20.0)));
    }

    #[test]
    fn surface_owning_children_skip_pointer_but_not_keys() {
        let mut scene = Scene::new();
        let visits = Visits::default();
        let root = scene.create_group(GroupConfig::new());
        let owner = scene.create_group_with(GroupConfig::new(), tap("owner", true, &visits));
        scene.add(root, owner).unwrap();
        // Owning again after being added, as a nested canvas would.
        scene.group_mut(owner).unwrap().owns_surface = true;

        let _ = scene
            .dispatch_pointer(root, Hook::PointerDown, down_at(0.0, 0.0))
            .unwrap();
        assert!(visits.borrow().is_empty());

        let handled = scene.dispatch_key(root, Hook::KeyDown, &key(13)).unwrap();
        assert!(handled.is_consumed());
        assert_eq!(*visits.borrow(), vec!["owner"]);
    }

    #[test]
    fn group_behavior_runs_after_children() {
        let mut scene = Scene::new();
        let visits = Visits::default();
        let root = scene.create_group_with(GroupConfig::new(), tap("root", true, &visits));
        let child = scene.create_node(tap("child", false, &visits));
        scene.add(root, child).unwrap();

        let handled = scene.dispatch_key(root, Hook::KeyDown, &key(32)).unwrap();
        assert!(handled.is_consumed());
        assert_eq!(*visits.borrow(), vec!["child", "root"]);
    }

    #[test]
    fn consumption_propagates_out_of_nested_groups() {
        let mut scene = Scene::new();
        let visits = Visits::default();
        let root = scene.create_group(GroupConfig::new());
        let below = scene.create_node(tap("below", true, &visits));
        let inner = scene.create_group(GroupConfig::new().with_depth(1));
        let deep = scene.create_node(tap("deep", true, &visits));
        scene.add_all(root, [below, inner]).unwrap();
        scene.add(inner, deep).unwrap();

        let handled = scene.dispatch_key(root, Hook::KeyDown, &key(1)).unwrap();
        assert!(handled.is_consumed());
        assert_eq!(*visits.borrow(), vec!["deep"]);
    }

    #[test]
    fn hook_errors_abort_dispatch() {
        #[derive(Debug)]
        struct Refused;
        impl fmt::Display for Refused {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("refused")
            }
        }
        impl core::error::Error for Refused {}

        struct Failing;
        impl Node for Failing {
            fn capabilities(&self) -> Capabilities {
                Capabilities::KEY_DOWN
            }
            fn key_down(&mut self, _: &KeyEvent, _: &mut NodeCx<'_>) -> NodeResult<Handled> {
                Err(Box::new(Refused))
            }
        }

        let mut scene = Scene::new();
        let visits = Visits::default();
        let root = scene.create_group(GroupConfig::new());
        let under = scene.create_node(tap("under", true, &visits));
        let failing = scene.create_node(Failing);
        scene.add_all(root, [under, failing]).unwrap();

        let err = scene.dispatch_key(root, Hook::KeyDown, &key(1)).unwrap_err();
        assert!(matches!(
            err,
            SceneError::Handler { node, hook: Hook::KeyDown, .. } if node == failing
        ));
        assert!(visits.borrow().is_empty());
        // The failing behavior is still attached.
        assert!(scene.behavior[failing.slot()].is_some());
    }
}
