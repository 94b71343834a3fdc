// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Step, clear and draw.
//!
//! [`Scene::cycle`] is the per-frame entry point for a surface-owning root.
//! It turns host time into elapsed milliseconds and steps the tree:
//!
//! ```text
//!   cycle(root, now)
//!       │  focused? elapsed = now - last
//!       ▼
//!   step(root) ─► own behavior ─► children in depth order
//!       │            (group children fold their CLEAR/DRAW bits upward)
//!       ▼
//!   surface owner: CLEAR? ─► clear    DRAW? ─► draw(root)
//!                                                 │
//!            own behavior, then children with inherited * local
//!            (nested surface owners draw themselves, then composite)
//! ```

use alloc::vec::Vec;

use kurbo::Affine;

use super::id::NodeId;
use super::store::Scene;
use crate::dirty::DirtyFlags;
use crate::error::SceneError;
use crate::node::Hook;
use crate::surface::Surface;
use crate::time::HostTime;
use crate::trace::{CycleEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind};
use crate::transform;

impl Scene {
    /// Runs one frame for a group.
    ///
    /// When the group has focus, the elapsed time since the previous cycle
    /// (zero on the first) is measured with
    /// [`SceneConfig::timebase`](crate::config::SceneConfig::timebase) and
    /// the group is [stepped](Self::step). While focus is lost nothing
    /// happens and the clock does not advance. Returns whether the group
    /// stepped.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NotAGroup`] for a leaf, or the first hook
    /// error of the step.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn cycle(&mut self, id: NodeId, now: HostTime) -> Result<bool, SceneError> {
        let timebase = self.config.timebase;
        let group = self.group_mut(id)?;
        let focused = group.focused;
        let elapsed_ms = if focused {
            group.clock.tick(now, timebase)
        } else {
            0.0
        };

        self.now = now;
        self.cycle_index += 1;
        self.tracer.cycle(&CycleEvent {
            cycle_index: self.cycle_index,
            node: id,
            now,
            elapsed_ms,
            focused,
        });

        if focused {
            self.phase_begin(id, PhaseKind::Step);
            let stepped = self.step(id, elapsed_ms);
            self.phase_end(id, PhaseKind::Step);
            stepped?;
        }
        Ok(focused)
    }

    /// Advances a node and its subtree by `elapsed_ms` milliseconds.
    ///
    /// A group steps its own behavior, then each live, active child in
    /// ascending depth order. After a child group without its own surface
    /// has stepped, its pending and automatic clear/draw bits are folded into
    /// this group and its pending bits are reset. Finally, a group with a
    /// surface clears it if a clear is pending or automatic, then draws if a
    /// draw is pending or automatic.
    ///
    /// # Errors
    ///
    /// Returns the first hook error; the rest of the step is skipped.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn step(&mut self, id: NodeId, elapsed_ms: f64) -> Result<(), SceneError> {
        self.validate(id);
        let parent = self.parent(id);
        let _ = self.call(id, Hook::Step, parent, |n, cx| n.step(elapsed_ms, cx))?;
        if !self.is_alive(id) || self.group[id.slot()].is_none() {
            return Ok(());
        }

        let children: Vec<NodeId> = self.children[id.slot()].clone();
        for child in children {
            if !self.is_alive(child) || !self.flags[child.slot()].active {
                continue;
            }
            if self.group[child.slot()].is_some() {
                self.step(child, elapsed_ms)?;
                self.harvest(id, child);
            } else {
                let _ = self.call(child, Hook::Step, Some(id), |n, cx| {
                    n.step(elapsed_ms, cx)
                })?;
            }
        }

        self.flush(id)
    }

    /// Folds a non-owning child group's pending work into `parent`.
    fn harvest(&mut self, parent: NodeId, child: NodeId) {
        if !self.is_alive(child) || !self.is_alive(parent) {
            return;
        }
        let Some(group) = self.group[child.slot()].as_mut() else {
            return;
        };
        if group.owns_surface {
            return;
        }
        let bits = group.dirty.effective(group.auto);
        group.dirty = DirtyFlags::empty();
        if bits.is_empty() {
            return;
        }
        if let Some(target) = self.group[parent.slot()].as_mut() {
            target.dirty |= bits;
        }
        #[cfg(feature = "trace-rich")]
        self.tracer.dirty(&crate::trace::DirtyEvent {
            cycle_index: self.cycle_index,
            from: child,
            into: parent,
            flags: bits,
        });
    }

    /// Clears and draws a surface owner according to its pending and
    /// automatic bits.
    fn flush(&mut self, id: NodeId) -> Result<(), SceneError> {
        if !self.is_alive(id) {
            return Ok(());
        }
        let Some(group) = self.group[id.slot()].as_mut() else {
            return Ok(());
        };
        if !group.owns_surface {
            return Ok(());
        }
        let Some(surface) = group.surface.as_mut() else {
            return Ok(());
        };

        let wanted = group.dirty.effective(group.auto);
        if wanted.contains(DirtyFlags::CLEAR) {
            group.dirty.remove(DirtyFlags::CLEAR);
            surface.clear();
            self.phase_begin(id, PhaseKind::Clear);
            self.phase_end(id, PhaseKind::Clear);
        }
        if wanted.contains(DirtyFlags::DRAW) {
            self.draw(id)?;
        }
        Ok(())
    }

    /// Draws a group into its own surface.
    ///
    /// The group's local transform is the base transform. Pending draw
    /// requests are reset. A group without a surface only has its pending
    /// draw reset.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NotAGroup`] for a leaf, or the first hook error.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn draw(&mut self, id: NodeId) -> Result<(), SceneError> {
        let group = self.group_mut(id)?;
        group.dirty.remove(DirtyFlags::DRAW);
        let Some(mut surface) = group.surface.take() else {
            return Ok(());
        };

        self.phase_begin(id, PhaseKind::Draw);
        let base = self.transform[id.slot()];
        let drawn = self.draw_subtree(id, surface.as_mut(), base);
        self.phase_end(id, PhaseKind::Draw);

        if self.is_alive(id)
            && let Some(group) = self.group[id.slot()].as_mut()
            && group.surface.is_none()
        {
            group.surface = Some(surface);
        }
        drawn
    }

    /// Draws a node's subtree into an arbitrary surface.
    ///
    /// `transform` maps the node's space to `surface` pixels; the node's own
    /// local transform is not applied.
    ///
    /// # Errors
    ///
    /// Returns the first hook error.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn draw_into(
        &mut self,
        id: NodeId,
        surface: &mut dyn Surface,
        transform: Affine,
    ) -> Result<(), SceneError> {
        self.validate(id);
        self.draw_subtree(id, surface, transform)
    }

    fn draw_subtree(
        &mut self,
        id: NodeId,
        surface: &mut dyn Surface,
        xf: Affine,
    ) -> Result<(), SceneError> {
        let parent = self.parent(id);
        let _ = self.call(id, Hook::Draw, parent, |n, cx| n.draw(&mut *surface, xf, cx))?;
        if !self.is_alive(id) {
            return Ok(());
        }
        let Some(group) = self.group[id.slot()].as_mut() else {
            return Ok(());
        };
        group.dirty.remove(DirtyFlags::DRAW);

        let children: Vec<NodeId> = self.children[id.slot()].clone();
        for child in children {
            if !self.is_alive(child) || !self.flags[child.slot()].visible {
                continue;
            }
            let (nested, descend) = match &self.group[child.slot()] {
                Some(g) => (g.owns_surface && g.surface.is_some(), true),
                None => (
                    false,
                    self.capabilities[child.slot()].contains(Hook::Draw.capability()),
                ),
            };
            if nested {
                self.draw(child)?;
                if let Some(layer) = self.surface(child) {
                    surface.composite(layer, Affine::IDENTITY);
                }
            } else if descend {
                let local = self.transform[child.slot()];
                self.draw_subtree(child, surface, transform::compose(xf, local))?;
            }
        }
        Ok(())
    }

    fn phase_timestamp(&self) -> HostTime {
        self.config.clock.map_or(self.now, |clock| clock())
    }

    fn phase_begin(&mut self, node: NodeId, phase: PhaseKind) {
        if !self.tracer.is_enabled() {
            return;
        }
        let timestamp = self.phase_timestamp();
        self.tracer.phase_begin(&PhaseBeginEvent {
            cycle_index: self.cycle_index,
            node,
            phase,
            timestamp,
        });
    }

    fn phase_end(&mut self, node: NodeId, phase: PhaseKind) {
        if !self.tracer.is_enabled() {
            return;
        }
        let timestamp = self.phase_timestamp();
        self.tracer.phase_end(&PhaseEndEvent {
            cycle_index: self.cycle_index,
            node,
            phase,
            timestamp,
        });
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use core::cell::RefCell;

    use kurbo::Rect;

    use super::*;
    use crate::config::{GroupConfig, SceneConfig};
    use crate::node::{Capabilities, Node, NodeCx, NodeResult};
    use crate::surface::PixelBuffer;
    use crate::time::Timebase;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Canvas {
        log: Log,
    }

    impl Surface for Canvas {
        fn pixel_size(&self) -> (u32, u32) {
            (64, 64)
        }
        fn presented_rect(&self) -> Rect {
            Rect::new(0.0, 0.0, 64.0, 64.0)
        }
        fn clear(&mut self) {
            self.log.borrow_mut().push("clear".into());
        }
        fn read_pixels(&self) -> PixelBuffer {
            PixelBuffer::default()
        }
        fn write_pixels(&mut self, _: &PixelBuffer) {}
        fn composite(&mut self, _: &dyn Surface, transform: Affine) {
            self.log
                .borrow_mut()
                .push(alloc::format!("composite {:?}", transform.as_coeffs()));
        }
    }

    /// Logs steps and draws; optionally requests work while stepping.
    struct Actor {
        name: &'static str,
        log: Log,
        request: DirtyFlags,
    }

    impl Node for Actor {
        fn capabilities(&self) -> Capabilities {
            Capabilities::STEP | Capabilities::DRAW
        }

        fn step(&mut self, elapsed_ms: f64, cx: &mut NodeCx<'_>) -> NodeResult<()> {
            self.log
                .borrow_mut()
                .push(alloc::format!("{} step {elapsed_ms}", self.name));
            if self.request.contains(DirtyFlags::CLEAR) {
                cx.request_clear();
            }
            if self.request.contains(DirtyFlags::DRAW) {
                cx.request_draw();
            }
            Ok(())
        }

        fn draw(
            &mut self,
            _: &mut dyn Surface,
            transform: Affine,
            _: &mut NodeCx<'_>,
        ) -> NodeResult<()> {
            let [.., e, f] = transform.as_coeffs();
            self.log
                .borrow_mut()
                .push(alloc::format!("{} draw {e} {f}", self.name));
            Ok(())
        }
    }

    fn actor(name: &'static str, log: &Log, request: DirtyFlags) -> Actor {
        Actor {
            name,
            log: Rc::clone(log),
            request,
        }
    }

    fn root_with_canvas(scene: &mut Scene, log: &Log) -> NodeId {
        let root = scene.create_group(GroupConfig::new());
        let _ = scene
            .set_surface(root, Box::new(Canvas { log: Rc::clone(log) }))
            .unwrap();
        root
    }

    fn settle(scene: &mut Scene, root: NodeId, log: &Log) {
        scene.step(root, 0.0).unwrap();
        log.borrow_mut().clear();
    }

    #[test]
    fn child_clear_request_clears_root_once() {
        let mut scene = Scene::new();
        let log = Log::default();
        let root = root_with_canvas(&mut scene, &log);
        let group = scene.create_group_with(
            GroupConfig::new(),
            actor("g", &log, DirtyFlags::CLEAR),
        );
        scene.add(root, group).unwrap();
        // Drop the "clear" of installing the surface.
        log.borrow_mut().clear();

        scene.step(root, 16.0).unwrap();
        assert!(!scene.needs_clear(root));
        assert!(!scene.needs_draw(root));
        let clears = log.borrow().iter().filter(|l| *l == "clear").count();
        assert_eq!(clears, 1);
    }

    #[test]
    fn nested_requests_draw_root_once() {
        let mut scene = Scene::new();
        let log = Log::default();
        let root = root_with_canvas(&mut scene, &log);
        let a = scene.create_group(GroupConfig::new());
        let b = scene.create_group(GroupConfig::new());
        let c = scene.create_group_with(GroupConfig::new(), actor("c", &log, DirtyFlags::DRAW));
        scene.add(root, a).unwrap();
        scene.add(a, b).unwrap();
        scene.add(b, c).unwrap();
        settle(&mut scene, root, &log);

        for _ in 0..3 {
            scene.step(root, 16.0).unwrap();
        }
        let draws = log.borrow().iter().filter(|l| *l == "c draw 0 0").count();
        assert_eq!(draws, 3);
        assert!(!scene.needs_draw(a));
        assert!(!scene.needs_draw(root));
    }

    #[test]
    fn quiet_tree_does_not_draw() {
        let mut scene = Scene::new();
        let log = Log::default();
        let root = root_with_canvas(&mut scene, &log);
        let leaf = scene.create_node(actor("leaf", &log, DirtyFlags::empty()));
        scene.add(root, leaf).unwrap();
        settle(&mut scene, root, &log);

        scene.step(root, 16.0).unwrap();
        assert_eq!(*log.borrow(), vec![String::from("leaf step 16")]);
    }

    #[test]
    fn auto_flags_work_every_step() {
        let mut scene = Scene::new();
        let log = Log::default();
        let root = root_with_canvas(&mut scene, &log);
        scene.set_auto_clear(root, true).unwrap();
        scene.set_auto_draw(root, true).unwrap();
        let leaf = scene.create_node(actor("leaf", &log, DirtyFlags::empty()));
        scene.add(root, leaf).unwrap();
        settle(&mut scene, root, &log);

        scene.step(root, 1.0).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                String::from("leaf step 1"),
                String::from("clear"),
                String::from("leaf draw 0 0"),
            ]
        );
    }

    #[test]
    fn draw_composes_transforms() {
        let mut scene = Scene::new();
        let log = Log::default();
        let root = root_with_canvas(&mut scene, &log);
        scene.set_transform(root, Affine::translate((1.0, 2.0)));
        let group = scene.create_group(
            GroupConfig::new().with_transform(Affine::translate((10.0, 20.0))),
        );
        let leaf = scene.create_node(actor("leaf", &log, DirtyFlags::empty()));
        scene.set_transform(leaf, Affine::translate((100.0, 200.0)));
        scene.add(root, group).unwrap();
        scene.add(group, leaf).unwrap();
        log.borrow_mut().clear();

        scene.draw(root).unwrap();
        assert_eq!(*log.borrow(), vec![String::from("leaf draw 111 222")]);
    }

    #[test]
    fn invisible_children_do_not_draw() {
        let mut scene = Scene::new();
        let log = Log::default();
        let root = root_with_canvas(&mut scene, &log);
        let leaf = scene.create_node(actor("leaf", &log, DirtyFlags::empty()));
        scene.add(root, leaf).unwrap();
        scene.set_visible(leaf, false);
        log.borrow_mut().clear();

        scene.draw(root).unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn nested_surface_owner_is_composited() {
        let mut scene = Scene::new();
        let log = Log::default();
        let root = root_with_canvas(&mut scene, &log);
        let nested = scene.create_group(GroupConfig::new());
        scene.add(root, nested).unwrap();
        let _ = scene
            .set_surface(nested, Box::new(Canvas { log: Rc::clone(&log) }))
            .unwrap();
        let leaf = scene.create_node(actor("leaf", &log, DirtyFlags::empty()));
        scene.add(nested, leaf).unwrap();
        log.borrow_mut().clear();

        scene.draw(root).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                String::from("leaf draw 0 0"),
                String::from("composite [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]"),
            ]
        );
    }

    #[test]
    fn cycle_measures_elapsed_and_respects_focus() {
        let mut scene = Scene::with_config(SceneConfig::new().with_timebase(Timebase::MILLIS));
        let log = Log::default();
        let root = root_with_canvas(&mut scene, &log);
        let leaf = scene.create_node(actor("leaf", &log, DirtyFlags::empty()));
        scene.add(root, leaf).unwrap();
        log.borrow_mut().clear();

        assert!(scene.cycle(root, HostTime(1000)).unwrap());
        assert!(scene.cycle(root, HostTime(1016)).unwrap());
        scene.group_mut(root).unwrap().focused = false;
        assert!(!scene.cycle(root, HostTime(5000)).unwrap());
        let steps: Vec<String> = log
            .borrow()
            .iter()
            .filter(|l| l.starts_with("leaf step"))
            .cloned()
            .collect();
        assert_eq!(steps, vec![String::from("leaf step 0"), String::from("leaf step 16")]);
    }

    #[test]
    fn leaf_cannot_cycle() {
        let mut scene = Scene::new();
        let log = Log::default();
        let leaf = scene.create_node(actor("leaf", &log, DirtyFlags::empty()));
        assert!(matches!(
            scene.cycle(leaf, HostTime(0)),
            Err(SceneError::NotAGroup(_))
        ));
    }
}
