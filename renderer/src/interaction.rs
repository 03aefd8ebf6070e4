//! Cursor-to-world mapping for the editing front end
//!
//! The tracker hands us a cursor normalised to `[0,1]^2` (origin top-left)
//! and a raw depth reading. These helpers turn that into a world-space point
//! and, through the grid's inverse transform, a grid cell.

use crate::math::{clamp, lerp};
use crate::vector::Vector3;
use crate::voxel_grid::{GridCoord, VoxelGrid};

/// Raw depth readings are expected in this range; anything outside is clamped
pub const DEFAULT_DEPTH_INPUT_RANGE: (f32, f32) = (-0.15, 0.05);

/// Map a raw depth reading onto `[min_depth, max_depth]`.
///
/// The reading is clamped to `input_range`, normalised and inverted, so the
/// low end of the input lands on `max_depth`.
pub fn map_depth_to_world(sample: f32, min_depth: f32, max_depth: f32, input_range: (f32, f32)) -> f32 {
    let (lo, hi) = input_range;
    let span = hi - lo;
    if span.abs() < f32::EPSILON {
        return lerp(min_depth, max_depth, 0.5);
    }
    let clamped = clamp(sample, lo.min(hi), lo.max(hi));
    let normalized = (clamped - lo) / span;
    lerp(min_depth, max_depth, 1.0 - normalized)
}

/// One cursor reading from the tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorSample {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl CursorSample {
    pub const fn new(x: f32, y: f32, depth: f32) -> Self {
        Self { x, y, depth }
    }
}

/// World-space box the cursor is mapped into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Workspace {
    /// Width and height covered by the full cursor range
    pub extent: f32,
    pub min_depth: f32,
    pub max_depth: f32,
    pub depth_input_range: (f32, f32),
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            extent: 10.0,
            min_depth: -3.0,
            max_depth: 3.0,
            depth_input_range: DEFAULT_DEPTH_INPUT_RANGE,
        }
    }
}

/// Continuous world position under the cursor. Screen Y grows downward, world Y up.
pub fn cursor_to_world(sample: CursorSample, workspace: &Workspace) -> Vector3 {
    let x = (sample.x - 0.5) * workspace.extent;
    let y = -(sample.y - 0.5) * workspace.extent;
    let z = map_depth_to_world(
        sample.depth,
        workspace.min_depth,
        workspace.max_depth,
        workspace.depth_input_range,
    );
    Vector3::new(x, y, z)
}

/// Grid cell under the cursor, `None` when the object transform is singular
pub fn pick_grid_cell(grid: &VoxelGrid, sample: CursorSample, workspace: &Workspace) -> Option<GridCoord> {
    grid.world_to_grid(cursor_to_world(sample, workspace))
}
