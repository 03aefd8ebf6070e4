//! Sparse voxel storage with an accumulated object transform
//!
//! The object transform maps grid (local) space to world space. Each
//! translate / rotate / scale builds a fresh elementary matrix and
//! left-multiplies it onto the stored transform (`new = op * old`), so every
//! operation acts in world space around the object's current placement, not
//! along the object's own axes.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::matrix::{Axis, Matrix4};
use crate::vector::Vector3;
use crate::voxel::VoxelColor;

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Snap a continuous local-space position to the nearest grid cell
    pub fn from_world_snapped(p: Vector3) -> Self {
        Self::new(
            libm::roundf(p.x) as i32,
            libm::roundf(p.y) as i32,
            libm::roundf(p.z) as i32,
        )
    }

    /// Cell center in local space
    pub fn center(&self) -> Vector3 {
        Vector3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Squared distance in grid units, saturating at `u64::MAX`
    pub fn distance_squared(&self, other: GridCoord) -> u64 {
        let dx = self.x.abs_diff(other.x) as u64;
        let dy = self.y.abs_diff(other.y) as u64;
        let dz = self.z.abs_diff(other.z) as u64;
        (dx * dx).saturating_add(dy * dy).saturating_add(dz * dz)
    }
}

impl From<(i32, i32, i32)> for GridCoord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[i32; 3]> for GridCoord {
    fn from(c: [i32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<GridCoord> for [i32; 3] {
    fn from(c: GridCoord) -> Self {
        [c.x, c.y, c.z]
    }
}

/// Object-transform operation selected by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridOp {
    Translate(Vector3),
    Rotate { axis: Axis, angle: f32 },
    /// Uniform scale factor
    Scale(f32),
}

impl GridOp {
    /// The elementary matrix this operation left-multiplies
    pub fn matrix(&self) -> Matrix4 {
        match *self {
            GridOp::Translate(d) => Matrix4::from_translation(d.x, d.y, d.z),
            GridOp::Rotate { axis, angle } => Matrix4::from_axis_rotation(axis, angle),
            GridOp::Scale(factor) => Matrix4::from_scale(factor, factor, factor),
        }
    }
}

/// Sparse voxel map plus its local-to-world transform
#[derive(Debug, Clone, Default)]
pub struct VoxelGrid {
    voxels: HashMap<GridCoord, VoxelColor>,
    transform: Matrix4,
}

impl VoxelGrid {
    pub fn new() -> Self {
        Self {
            voxels: HashMap::new(),
            transform: Matrix4::identity(),
        }
    }

    /// Hollow cube shell of half-extent `radius` around the origin, colors
    /// cycling through `colors` in grid order
    pub fn sample_shell(radius: i32, colors: &[VoxelColor]) -> Self {
        let mut grid = Self::new();
        if colors.is_empty() {
            return grid;
        }
        let mut next = 0;
        for x in -radius..=radius {
            for y in -radius..=radius {
                for z in -radius..=radius {
                    if x.abs() == radius || y.abs() == radius || z.abs() == radius {
                        grid.set_voxel(GridCoord::new(x, y, z), colors[next % colors.len()]);
                        next += 1;
                    }
                }
            }
        }
        grid
    }

    // ---- storage ----

    /// Insert or recolor a voxel, returning the previous color
    pub fn set_voxel(&mut self, pos: GridCoord, color: VoxelColor) -> Option<VoxelColor> {
        self.voxels.insert(pos, color)
    }

    pub fn get_voxel(&self, pos: GridCoord) -> Option<VoxelColor> {
        self.voxels.get(&pos).copied()
    }

    pub fn remove_voxel(&mut self, pos: GridCoord) -> Option<VoxelColor> {
        self.voxels.remove(&pos)
    }

    pub fn contains(&self, pos: GridCoord) -> bool {
        self.voxels.contains_key(&pos)
    }

    pub fn count(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Remove every voxel. The transform is kept.
    pub fn clear(&mut self) {
        self.voxels.clear();
    }

    /// All voxels in unspecified order
    pub fn get_all_voxels(&self) -> impl Iterator<Item = (GridCoord, VoxelColor)> + '_ {
        self.voxels.iter().map(|(pos, color)| (*pos, *color))
    }

    /// Inclusive bounding box, `None` when empty
    pub fn bounds(&self) -> Option<(GridCoord, GridCoord)> {
        let mut iter = self.voxels.keys();
        let first = *iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min = GridCoord::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = GridCoord::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Some((min, max))
    }

    /// Closest occupied cell within `max_distance` (grid units) of `pos`
    pub fn nearest_voxel(&self, pos: GridCoord, max_distance: f32) -> Option<GridCoord> {
        let limit = max_distance * max_distance;
        self.voxels
            .keys()
            .map(|p| (*p, p.distance_squared(pos)))
            .filter(|(_, d)| (*d as f32) <= limit)
            .min_by_key(|(p, d)| (*d, *p))
            .map(|(p, _)| p)
    }

    // ---- object transform ----

    pub fn transform(&self) -> &Matrix4 {
        &self.transform
    }

    pub fn inverse_transform(&self) -> Option<Matrix4> {
        self.transform.inverse()
    }

    pub fn reset_transform(&mut self) {
        self.transform = Matrix4::identity();
    }

    /// Apply an operation by left-multiplying its matrix
    pub fn apply(&mut self, op: GridOp) {
        self.transform = op.matrix().multiply(&self.transform);
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.apply(GridOp::Translate(Vector3::new(dx, dy, dz)));
    }

    /// Rotate about a world axis through the world origin
    pub fn rotate(&mut self, axis: Axis, angle: f32) {
        self.apply(GridOp::Rotate { axis, angle });
    }

    /// Uniform scale about the world origin
    pub fn scale(&mut self, factor: f32) {
        self.apply(GridOp::Scale(factor));
    }

    /// World-space position of a cell center
    pub fn grid_to_world(&self, pos: GridCoord) -> Vector3 {
        self.transform.transform_point(pos.center()).to_cartesian()
    }

    /// Map a world-space point back to the nearest grid cell.
    ///
    /// Returns `None` when the transform has collapsed and cannot be inverted;
    /// callers skip picking for that frame.
    pub fn world_to_grid(&self, point: Vector3) -> Option<GridCoord> {
        let Some(inverse) = self.transform.inverse() else {
            debug!("object transform is singular, skipping pick at {:?}", point);
            return None;
        };
        let local = inverse.transform_point(point).to_cartesian();
        Some(GridCoord::from_world_snapped(local))
    }
}
