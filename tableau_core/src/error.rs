// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by [`Scene`](crate::scene::Scene) operations.

use core::fmt;

use crate::node::{Hook, NodeError};
use crate::scene::NodeId;

/// Errors from scene operations.
///
/// Misuse that can only be a programming mistake (stale [`NodeId`]s, adding a
/// group into its own subtree) panics instead.
#[derive(Debug)]
pub enum SceneError {
    /// The surface has a zero pixel dimension or a presented rectangle that
    /// is empty or not finite.
    InvalidSurface,
    /// The operation needs a group but the node is a leaf.
    NotAGroup(NodeId),
    /// A node hook returned an error. The traversal that called it was
    /// abandoned.
    Handler {
        /// The node whose hook failed.
        node: NodeId,
        /// Which hook failed.
        hook: Hook,
        /// The error returned by the hook.
        source: NodeError,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSurface => f.write_str("surface has an empty or non-finite size"),
            Self::NotAGroup(node) => write!(f, "{node:?} is not a group"),
            Self::Handler { node, hook, source } => {
                write!(f, "{hook:?} hook of {node:?} failed: {source}")
            }
        }
    }
}

impl core::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Handler { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
