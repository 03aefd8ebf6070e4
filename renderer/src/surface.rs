//! Raster target abstraction
//!
//! The rasterizer only ever emits filled and outlined convex polygons, so a
//! surface needs nothing more than those two primitives.

use crate::pipeline::ScreenPoint;
use crate::voxel::VoxelColor;

/// Something the voxel rasterizer can draw into
pub trait RasterSurface {
    /// `(width, height)` in pixels
    fn dimensions(&self) -> (usize, usize);

    /// Fill the polygon outlined by `points`, in order
    fn fill_polygon(&mut self, points: &[ScreenPoint], color: VoxelColor);

    /// Draw the closed edge loop through `points`
    fn outline_polygon(&mut self, points: &[ScreenPoint], color: VoxelColor);
}
