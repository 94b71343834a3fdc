// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use core::iter::FusedIterator;
use core::slice;

use super::id::NodeId;

/// An iterator over the direct children of a group, in ascending depth
/// order (the order they are stepped and drawn in).
///
/// Reverse it for input order. Created by [`Scene::children`](super::Scene::children).
#[derive(Clone, Debug)]
pub struct Children<'a> {
    inner: slice::Iter<'a, NodeId>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(children: &'a [NodeId]) -> Self {
        Self {
            inner: children.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        self.inner.next_back().copied()
    }
}

impl ExactSizeIterator for Children<'_> {}

impl FusedIterator for Children<'_> {}
