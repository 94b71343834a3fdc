// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Point};

use super::binding::InputBinding;
use super::id::{INVALID, NodeId};
use super::traverse::Children;
use crate::clock::FrameClock;
use crate::config::{GroupConfig, SceneConfig};
use crate::dirty::DirtyFlags;
use crate::error::SceneError;
use crate::node::{Capabilities, Hook, Node, NodeCx, NodeResult};
use crate::surface::Surface;
use crate::time::HostTime;
use crate::trace::{BindingEvent, TraceSink, Tracer};
use crate::transform;

/// Per-node boolean flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// Whether the node steps and receives input.
    pub active: bool,
    /// Whether the node draws.
    pub visible: bool,
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self {
            active: true,
            visible: true,
        }
    }
}

/// State only groups carry.
pub(crate) struct GroupState {
    pub(crate) owns_surface: bool,
    pub(crate) dirty: DirtyFlags,
    pub(crate) auto: DirtyFlags,
    pub(crate) focused: bool,
    pub(crate) clock: FrameClock,
    pub(crate) surface: Option<Box<dyn Surface>>,
    pub(crate) binding: Option<InputBinding>,
}

impl GroupState {
    fn new(config: &GroupConfig) -> Self {
        Self {
            owns_surface: config.owns_surface,
            dirty: DirtyFlags::all(),
            auto: config.auto,
            focused: true,
            clock: FrameClock::new(),
            surface: None,
            binding: None,
        }
    }
}

impl fmt::Debug for GroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupState")
            .field("owns_surface", &self.owns_surface)
            .field("dirty", &self.dirty)
            .field("auto", &self.auto)
            .field("focused", &self.focused)
            .field("clock", &self.clock)
            .field("surface", &self.surface)
            .field("binding", &self.binding)
            .finish()
    }
}

/// A retained scene: groups and leaves in struct-of-arrays storage.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
pub struct Scene {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<NodeId>>,

    // -- Local properties (set by callers) --
    pub(crate) depth: Vec<i32>,
    pub(crate) flags: Vec<NodeFlags>,
    pub(crate) transform: Vec<Affine>,

    // -- Kind-specific state --
    pub(crate) group: Vec<Option<GroupState>>,
    pub(crate) behavior: Vec<Option<Box<dyn Node>>>,
    pub(crate) capabilities: Vec<Capabilities>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,

    // -- Frame state --
    pub(crate) config: SceneConfig,
    pub(crate) tracer: Tracer,
    pub(crate) cycle_index: u64,
    pub(crate) now: HostTime,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("len", &self.alive.len())
            .field("live", &self.alive.iter().filter(|a| **a).count())
            .field("config", &self.config)
            .field("cycle_index", &self.cycle_index)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates an empty scene with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SceneConfig::new())
    }

    /// Creates an empty scene.
    #[must_use]
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            parent: Vec::new(),
            children: Vec::new(),
            depth: Vec::new(),
            flags: Vec::new(),
            transform: Vec::new(),
            group: Vec::new(),
            behavior: Vec::new(),
            capabilities: Vec::new(),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            config,
            tracer: Tracer::none(),
            cycle_index: 0,
            now: HostTime(0),
        }
    }

    /// Returns the scene configuration.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Installs a trace sink, replacing any previous one.
    ///
    /// Without the `trace` feature the sink is dropped immediately.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Removes the trace sink.
    pub fn clear_trace_sink(&mut self) {
        self.tracer = Tracer::none();
    }

    // -- Allocation API --

    /// Creates a group without behavior of its own.
    pub fn create_group(&mut self, config: GroupConfig) -> NodeId {
        self.allocate(
            config.depth,
            config.transform,
            Some(GroupState::new(&config)),
            None,
        )
    }

    /// Creates a group whose own hooks are provided by `node`.
    ///
    /// The group's [`Node::step`] and [`Node::draw`] run before its
    /// children's; its input hooks run after its children if none of them
    /// consumed the event.
    pub fn create_group_with(&mut self, config: GroupConfig, node: impl Node + 'static) -> NodeId {
        self.allocate(
            config.depth,
            config.transform,
            Some(GroupState::new(&config)),
            Some(Box::new(node)),
        )
    }

    /// Creates a leaf node driven by `node`.
    pub fn create_node(&mut self, node: impl Node + 'static) -> NodeId {
        self.allocate(0, Affine::IDENTITY, None, Some(Box::new(node)))
    }

    fn allocate(
        &mut self,
        depth: i32,
        local: Affine,
        group: Option<GroupState>,
        behavior: Option<Box<dyn Node>>,
    ) -> NodeId {
        let caps = behavior
            .as_ref()
            .map_or(Capabilities::empty(), |b| b.capabilities());
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; its generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.depth[i] = depth;
            self.flags[i] = NodeFlags::default();
            self.transform[i] = local;
            self.group[i] = group;
            self.behavior[i] = behavior;
            self.capabilities[i] = caps;
            self.alive[i] = true;
            idx
        } else {
            let idx = u32::try_from(self.alive.len()).unwrap_or(INVALID);
            assert!(idx != INVALID, "scene slot count exceeds u32 range");
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.depth.push(depth);
            self.flags.push(NodeFlags::default());
            self.transform.push(local);
            self.group.push(group);
            self.behavior.push(behavior);
            self.capabilities.push(caps);
            self.generation.push(0);
            self.alive.push(true);
            idx
        };
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a node and its whole subtree, freeing their slots for reuse.
    ///
    /// The node is first removed from its parent as by [`remove`](Self::remove),
    /// so its teardown hook runs if it is active. Surfaces and input bindings
    /// in the subtree are dropped.
    ///
    /// # Errors
    ///
    /// Returns the teardown hook's error; the subtree is destroyed anyway.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.validate(id);
        let removed = match self.parent(id) {
            Some(parent) => self.remove(parent, id).map(|_| ()),
            None => Ok(()),
        };
        // The teardown hook may already have destroyed the node.
        if self.is_alive(id) {
            let mut stack = alloc::vec![id.idx];
            while let Some(idx) = stack.pop() {
                let i = idx as usize;
                stack.extend(self.children[i].drain(..).map(|c| c.idx));
                self.release_slot(idx);
            }
        }
        removed
    }

    fn release_slot(&mut self, idx: u32) {
        let i = idx as usize;
        if let Some(group) = self.group[i].take()
            && group.binding.is_some()
        {
            self.tracer.binding(&BindingEvent {
                node: NodeId {
                    idx,
                    generation: self.generation[i],
                },
                attached: false,
            });
        }
        self.behavior[i] = None;
        self.capabilities[i] = Capabilities::empty();
        self.parent[i] = INVALID;
        self.alive[i] = false;
        // Bump generation so old handles immediately fail validation.
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.alive.get(id.slot()).copied().unwrap_or(false)
            && self.generation[id.slot()] == id.generation
    }

    /// Returns whether the node is a group.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn is_group(&self, id: NodeId) -> bool {
        self.validate(id);
        self.group[id.slot()].is_some()
    }

    // -- Topology API --

    /// Adds `child` to `parent` and calls the child's init hook.
    ///
    /// A group child stops owning a surface and loses its input binding. The
    /// child list is re-sorted by depth afterwards; equal depths keep their
    /// insertion order. Adding a child that is already in `parent` does
    /// nothing. A child attached elsewhere is removed from its old parent
    /// first, as by [`remove`](Self::remove).
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NotAGroup`] if `parent` is a leaf, or the error
    /// of a teardown or init hook.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` is `parent` or one of
    /// its ancestors.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.validate(parent);
        self.validate(child);
        if self.group[parent.slot()].is_none() {
            return Err(SceneError::NotAGroup(parent));
        }
        assert!(
            !self.is_ancestor_or_self(child, parent),
            "cannot add a node to its own subtree"
        );
        if self.children[parent.slot()].contains(&child) {
            return Ok(());
        }
        if let Some(old) = self.parent(child) {
            let _ = self.remove(old, child)?;
            // The teardown hook may have destroyed either node.
            if !self.is_alive(child) || !self.is_alive(parent) {
                return Ok(());
            }
        }

        self.parent[child.slot()] = parent.idx;
        self.children[parent.slot()].push(child);
        self.sort_children(parent);

        if let Some(group) = &mut self.group[child.slot()] {
            group.owns_surface = false;
            if group.binding.take().is_some() {
                self.tracer.binding(&BindingEvent {
                    node: child,
                    attached: false,
                });
            }
        }

        self.call(child, Hook::Init, Some(parent), |n, cx| n.init(cx))
            .map(|_| ())
    }

    /// Adds each of `children` to `parent` in order.
    ///
    /// # Errors
    ///
    /// Stops at the first error, as returned by [`add`](Self::add).
    pub fn add_all(
        &mut self,
        parent: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<(), SceneError> {
        for child in children {
            self.add(parent, child)?;
        }
        Ok(())
    }

    /// Removes `child` from `parent`.
    ///
    /// Returns `false` if `child` was not one of `parent`'s children. When the
    /// removed child is active, its teardown hook runs with `parent`.
    ///
    /// # Errors
    ///
    /// Returns the teardown hook's error; the child is detached regardless.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<bool, SceneError> {
        self.validate(parent);
        self.validate(child);
        let siblings = &mut self.children[parent.slot()];
        let Some(pos) = siblings.iter().position(|c| *c == child) else {
            return Ok(false);
        };
        siblings.remove(pos);
        self.parent[child.slot()] = INVALID;

        if self.flags[child.slot()].active {
            self.call(child, Hook::Remove, Some(parent), |n, cx| n.remove(cx))?;
        }
        Ok(true)
    }

    /// Returns the parent of a node, or `None` for a root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.slot()];
        (p != INVALID).then(|| NodeId {
            idx: p,
            generation: self.generation[p as usize],
        })
    }

    /// Returns an iterator over the children of a node in depth order.
    ///
    /// Leaves have no children.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(&self.children[id.slot()])
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(p) => node = p,
                None => return false,
            }
        }
    }

    fn sort_children(&mut self, parent: NodeId) {
        let depth = &self.depth;
        self.children[parent.slot()].sort_by_key(|c| depth[c.slot()]);
    }

    // -- Property API --

    /// Sets the sibling sort key and re-sorts the parent's children.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_depth(&mut self, id: NodeId, depth: i32) {
        self.validate(id);
        self.depth[id.slot()] = depth;
        if let Some(parent) = self.parent(id) {
            self.sort_children(parent);
        }
    }

    /// Returns the sibling sort key.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> i32 {
        self.validate(id);
        self.depth[id.slot()]
    }

    /// Sets whether the node steps and receives input.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_active(&mut self, id: NodeId, active: bool) {
        self.validate(id);
        self.flags[id.slot()].active = active;
    }

    /// Sets whether the node draws.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        self.flags[id.slot()].visible = visible;
    }

    /// Returns the node's flags.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.validate(id);
        self.flags[id.slot()]
    }

    /// Sets the node's transform relative to its parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_transform(&mut self, id: NodeId, local: Affine) {
        self.validate(id);
        self.transform[id.slot()] = local;
    }

    /// Returns the node's transform relative to its parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.transform[id.slot()]
    }

    /// Returns the product of the local transforms from the root down to
    /// `id`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Affine {
        let mut world = self.transform(id);
        let mut node = id;
        while let Some(p) = self.parent(node) {
            world = transform::compose(self.transform[p.slot()], world);
            node = p;
        }
        world
    }

    /// Maps a point from the root's parent space (surface pixels for a
    /// surface-owning root) into the node's local space.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn to_local(&self, id: NodeId, point: Point) -> Point {
        transform::to_local(self.world_transform(id), point)
    }

    // -- Group state --

    /// Returns whether the node is a group that draws into its own surface.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn owns_surface(&self, id: NodeId) -> bool {
        self.validate(id);
        self.group[id.slot()]
            .as_ref()
            .is_some_and(|g| g.owns_surface)
    }

    /// Returns whether the group has a pending clear request.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn needs_clear(&self, id: NodeId) -> bool {
        self.group_flags(id).contains(DirtyFlags::CLEAR)
    }

    /// Returns whether the group has a pending draw request.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn needs_draw(&self, id: NodeId) -> bool {
        self.group_flags(id).contains(DirtyFlags::DRAW)
    }

    fn group_flags(&self, id: NodeId) -> DirtyFlags {
        self.validate(id);
        self.group[id.slot()]
            .as_ref()
            .map_or(DirtyFlags::empty(), |g| g.dirty)
    }

    /// Requests a clear on the next step.
    ///
    /// A group marks itself; a leaf marks its parent group, if any.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn request_clear(&mut self, id: NodeId) {
        if let Some(group) = self.owning_group(id) {
            self.request(group, DirtyFlags::CLEAR);
        }
    }

    /// Requests a draw on the next step.
    ///
    /// A group marks itself; a leaf marks its parent group, if any.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn request_draw(&mut self, id: NodeId) {
        if let Some(group) = self.owning_group(id) {
            self.request(group, DirtyFlags::DRAW);
        }
    }

    fn owning_group(&self, id: NodeId) -> Option<NodeId> {
        if self.is_group(id) {
            Some(id)
        } else {
            self.parent(id)
        }
    }

    pub(crate) fn request(&mut self, group: NodeId, flags: DirtyFlags) {
        if !self.is_alive(group) {
            return;
        }
        if let Some(g) = &mut self.group[group.slot()] {
            g.dirty |= flags;
        }
    }

    /// Makes the group clear its surface on every step.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NotAGroup`] for a leaf.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_auto_clear(&mut self, id: NodeId, on: bool) -> Result<(), SceneError> {
        let group = self.group_mut(id)?;
        group.auto.set(DirtyFlags::CLEAR, on);
        Ok(())
    }

    /// Makes the group draw on every step.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NotAGroup`] for a leaf.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_auto_draw(&mut self, id: NodeId, on: bool) -> Result<(), SceneError> {
        let group = self.group_mut(id)?;
        group.auto.set(DirtyFlags::DRAW, on);
        Ok(())
    }

    /// Returns whether the group currently has input focus. Leaves never do.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn has_focus(&self, id: NodeId) -> bool {
        self.validate(id);
        self.group[id.slot()].as_ref().is_some_and(|g| g.focused)
    }

    /// Returns the group's surface, if it has one.
    ///
    /// The surface is checked out while the group is drawing.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn surface(&self, id: NodeId) -> Option<&dyn Surface> {
        self.validate(id);
        self.group[id.slot()].as_ref()?.surface.as_deref()
    }

    /// Returns the group's surface mutably, if it has one.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn surface_mut(&mut self, id: NodeId) -> Option<&mut dyn Surface> {
        self.validate(id);
        match self.group[id.slot()].as_mut()?.surface.as_mut() {
            Some(surface) => Some(surface.as_mut()),
            None => None,
        }
    }

    pub(crate) fn group_mut(&mut self, id: NodeId) -> Result<&mut GroupState, SceneError> {
        self.validate(id);
        self.group[id.slot()]
            .as_mut()
            .ok_or(SceneError::NotAGroup(id))
    }

    // -- Behavior --

    /// Runs `f` with the node's behavior checked out of the scene.
    ///
    /// Returns `Ok(None)` when the node lacks the hook's capability or its
    /// behavior is already checked out by an outer call.
    pub(crate) fn call<R>(
        &mut self,
        id: NodeId,
        hook: Hook,
        parent: Option<NodeId>,
        f: impl FnOnce(&mut dyn Node, &mut NodeCx<'_>) -> NodeResult<R>,
    ) -> Result<Option<R>, SceneError> {
        if !self.capabilities[id.slot()].contains(hook.capability()) {
            return Ok(None);
        }
        let Some(mut behavior) = self.behavior[id.slot()].take() else {
            return Ok(None);
        };
        let result = f(behavior.as_mut(), &mut NodeCx::new(self, id, parent));
        if self.is_alive(id) && self.behavior[id.slot()].is_none() {
            self.behavior[id.slot()] = Some(behavior);
        }
        result
            .map(Some)
            .map_err(|source| SceneError::Handler {
                node: id,
                hook,
                source,
            })
    }

    /// Returns the capabilities declared by the node's behavior.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn capabilities(&self, id: NodeId) -> Capabilities {
        self.validate(id);
        self.capabilities[id.slot()]
    }

    // -- Validation --

    /// Panics if the handle is stale.
    #[inline]
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(self.is_alive(id), "stale NodeId: {id:?}");
    }
}
