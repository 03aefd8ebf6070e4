//! Command recording
//!
//! A [`RasterSurface`] that records draw calls instead of touching pixels.
//! Useful for diagnostics and for asserting on exactly what the rasterizer
//! emitted.

use crate::pipeline::ScreenPoint;
use crate::surface::RasterSurface;
use crate::voxel::VoxelColor;

/// Recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled polygon
    Fill {
        points: Vec<ScreenPoint>,
        color: VoxelColor,
    },
    /// Closed polygon outline
    Outline {
        points: Vec<ScreenPoint>,
        color: VoxelColor,
    },
}

impl DrawCommand {
    pub fn points(&self) -> &[ScreenPoint] {
        match self {
            DrawCommand::Fill { points, .. } | DrawCommand::Outline { points, .. } => points,
        }
    }

    pub fn color(&self) -> VoxelColor {
        match self {
            DrawCommand::Fill { color, .. } | DrawCommand::Outline { color, .. } => *color,
        }
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, DrawCommand::Fill { .. })
    }
}

/// Recorded command buffer
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    commands: Vec<DrawCommand>,
    width: usize,
    height: usize,
}

impl CommandBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            commands: Vec::with_capacity(64),
            width,
            height,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn fills(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| c.is_fill())
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Drop all recorded commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl RasterSurface for CommandBuffer {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn fill_polygon(&mut self, points: &[ScreenPoint], color: VoxelColor) {
        self.commands.push(DrawCommand::Fill {
            points: points.to_vec(),
            color,
        });
    }

    fn outline_polygon(&mut self, points: &[ScreenPoint], color: VoxelColor) {
        self.commands.push(DrawCommand::Outline {
            points: points.to_vec(),
            color,
        });
    }
}
