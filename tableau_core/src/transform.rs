// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2-D coordinate mapping between parent and local spaces.
//!
//! Every node carries a local [`Affine`] that places it inside its parent.
//! Drawing composes transforms downward (`inherited * local`); input goes the
//! other way, each level applying the inverse of its own local transform on
//! entry, so a snapshot arriving at depth *N* has been mapped by the inverse
//! of the product of all *N* local transforms.
//!
//! Points are always mapped individually. Differences between points
//! (deltas) are recomputed after mapping instead of being mapped themselves,
//! because the translation part of an affine transform does not cancel under
//! subtraction unless it is stripped first.

use kurbo::{Affine, Point, Vec2};

/// Maps a point from parent space into the space described by `local`.
///
/// A degenerate (non-invertible) transform produces non-finite coordinates.
#[inline]
#[must_use]
pub fn to_local(local: Affine, point: Point) -> Point {
    local.inverse() * point
}

/// Maps a point from the space described by `local` back into parent space.
#[inline]
#[must_use]
pub fn to_parent(local: Affine, point: Point) -> Point {
    local * point
}

/// Composes an inherited cumulative transform with a child's local
/// transform.
///
/// The child's transform is applied first (nested inside the inherited one).
#[inline]
#[must_use]
pub fn compose(inherited: Affine, local: Affine) -> Affine {
    inherited * local
}

/// Returns the horizontal and vertical scale factors of `transform`.
///
/// These are the lengths of the images of the unit x and y vectors. For
/// axis-aligned scaling they are the scale arguments themselves; under
/// rotation or skew they are only an approximation of how lengths change.
#[must_use]
pub fn scale_factors(transform: Affine) -> Vec2 {
    let [a, b, c, d, _, _] = transform.as_coeffs();
    Vec2::new(Vec2::new(a, b).hypot(), Vec2::new(c, d).hypot())
}
