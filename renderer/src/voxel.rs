//! Voxel colors and cube geometry
//!
//! Cube corners follow a fixed order: the back face (-Z) is 0..=3 and the
//! front face (+Z) is 4..=7, each wound (-x,-y), (+x,-y), (+x,+y), (-x,+y).

use serde::{Deserialize, Serialize};

use crate::vector::Vector3;

/// Opaque RGB voxel color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct VoxelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl VoxelColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Packed `0x00RRGGBB`
    #[inline]
    pub const fn to_u32(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}

impl From<[u8; 3]> for VoxelColor {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<VoxelColor> for [u8; 3] {
    fn from(c: VoxelColor) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Editor drawing palette
pub mod palette {
    use super::VoxelColor;

    pub const RED: VoxelColor = VoxelColor::from_hex(0xFF0000);
    pub const GREEN: VoxelColor = VoxelColor::from_hex(0x00FF00);
    pub const BLUE: VoxelColor = VoxelColor::from_hex(0x0000FF);
    pub const YELLOW: VoxelColor = VoxelColor::from_hex(0xFFFF00);
    pub const MAGENTA: VoxelColor = VoxelColor::from_hex(0xFF00FF);
    pub const CYAN: VoxelColor = VoxelColor::from_hex(0x00FFFF);
    pub const ORANGE: VoxelColor = VoxelColor::from_hex(0xFF8000);
    pub const PURPLE: VoxelColor = VoxelColor::from_hex(0x8000FF);

    pub const OUTLINE: VoxelColor = VoxelColor::from_hex(0x000000);

    /// Drawing colors in cycling order
    pub const EDITOR: [VoxelColor; 8] = [RED, GREEN, BLUE, YELLOW, MAGENTA, CYAN, ORANGE, PURPLE];
}

/// Cube face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Back,   // -Z
    Front,  // +Z
    Top,    // +Y
    Bottom, // -Y
    Right,  // +X
    Left,   // -X
}

/// Corner indices per face, indexed by `Face as usize`
pub const FACE_TABLE: [[usize; 4]; 6] = [
    [0, 1, 2, 3], // back
    [4, 5, 6, 7], // front
    [3, 2, 6, 7], // top
    [0, 1, 5, 4], // bottom
    [1, 5, 6, 2], // right
    [0, 4, 7, 3], // left
];

/// Faces drawn per voxel, in draw order
pub const PRIORITY_FACES: [Face; 3] = [Face::Front, Face::Top, Face::Right];

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Back,
        Face::Front,
        Face::Top,
        Face::Bottom,
        Face::Right,
        Face::Left,
    ];

    /// Corner indices into [`cube_vertices`]
    #[inline]
    pub fn indices(&self) -> [usize; 4] {
        FACE_TABLE[*self as usize]
    }

    pub fn normal(&self) -> Vector3 {
        match self {
            Face::Back => -Vector3::Z,
            Face::Front => Vector3::Z,
            Face::Top => Vector3::Y,
            Face::Bottom => -Vector3::Y,
            Face::Right => Vector3::X,
            Face::Left => -Vector3::X,
        }
    }
}

/// The 8 corners of an axis-aligned cube
pub fn cube_vertices(center: Vector3, size: f32) -> [Vector3; 8] {
    let h = size * 0.5;
    let Vector3 { x, y, z } = center;
    [
        Vector3::new(x - h, y - h, z - h),
        Vector3::new(x + h, y - h, z - h),
        Vector3::new(x + h, y + h, z - h),
        Vector3::new(x - h, y + h, z - h),
        Vector3::new(x - h, y - h, z + h),
        Vector3::new(x + h, y - h, z + h),
        Vector3::new(x + h, y + h, z + h),
        Vector3::new(x - h, y + h, z + h),
    ]
}
