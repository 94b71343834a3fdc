// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The raster target contract.
//!
//! The scene never rasterizes anything itself. A [`Surface`] is whatever the
//! host draws into (a canvas, an offscreen texture, a test buffer); the scene
//! only asks it to clear, to hand its pixels over when it is replaced, and to
//! composite a nested surface on top of itself.

use alloc::vec::Vec;

use kurbo::{Affine, Rect};

/// A copy of a surface's pixels, row-major, one `u32` per pixel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height` pixels.
    pub data: Vec<u32>,
}

/// A raster target owned by a group.
pub trait Surface {
    /// Backing resolution in pixels.
    fn pixel_size(&self) -> (u32, u32);

    /// Where the surface is shown, in the device coordinates used by
    /// [`DeviceEvent`](crate::input::DeviceEvent) positions.
    fn presented_rect(&self) -> Rect;

    /// Erases every pixel.
    fn clear(&mut self);

    /// Copies the pixels out.
    fn read_pixels(&self) -> PixelBuffer;

    /// Copies pixels in, anchored at the top-left corner. Pixels outside
    /// this surface are dropped.
    fn write_pixels(&mut self, pixels: &PixelBuffer);

    /// Paints `source` onto this surface under `transform`.
    fn composite(&mut self, source: &dyn Surface, transform: Affine);
}

impl core::fmt::Debug for dyn Surface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Surface")
            .field("pixel_size", &self.pixel_size())
            .field("presented_rect", &self.presented_rect())
            .finish_non_exhaustive()
    }
}

/// Returns whether `surface` can receive input and be drawn into.
///
/// Both pixel dimensions must be non-zero and the presented rectangle must
/// be finite with a positive area.
#[must_use]
pub fn is_valid(surface: &dyn Surface) -> bool {
    let (w, h) = surface.pixel_size();
    let rect = surface.presented_rect();
    w > 0 && h > 0 && rect.is_finite() && rect.width() > 0.0 && rect.height() > 0.0
}
