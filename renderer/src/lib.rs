//! Software voxel renderer library
//!
//! Projects a sparse voxel grid through a virtual camera and draws it
//! farthest-first onto a raster surface.
//!
//! ```no_run
//! use voxel_renderer::{palette, Camera3D, Framebuffer, VoxelGrid, VoxelRenderer};
//!
//! let grid = VoxelGrid::sample_shell(2, &palette::EDITOR);
//! let camera = Camera3D::default();
//! let mut fb = Framebuffer::new(640, 480)?;
//! let stats = VoxelRenderer::default().render_frame(&grid, &camera, &mut fb);
//! println!("{} voxels drawn", stats.drawn);
//! # Ok::<(), voxel_renderer::RenderError>(())
//! ```

pub mod camera;
pub mod commands;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod interaction;
pub mod math;
pub mod matrix;
pub mod pipeline;
pub mod rasterizer;
pub mod surface;
pub mod vector;
pub mod voxel;
pub mod voxel_grid;
pub mod zbuffer;

pub use camera::Camera3D;
pub use commands::{CommandBuffer, DrawCommand};
pub use config::{RenderConfig, MAX_CULL_MARGIN};
pub use error::{ConfigError, RenderError, RenderResult};
pub use framebuffer::Framebuffer;
pub use interaction::{cursor_to_world, map_depth_to_world, pick_grid_cell, CursorSample, Workspace};
pub use matrix::{Axis, Matrix4};
pub use pipeline::{is_point_in_frustum, project, Projector, ScreenPoint};
pub use rasterizer::{depth_sort, FrameStats, RenderSettings, SortedVoxel, VoxelOutcome, VoxelRenderer};
pub use surface::RasterSurface;
pub use vector::{Vector3, Vector4};
pub use voxel::{cube_vertices, palette, Face, VoxelColor};
pub use voxel_grid::{GridCoord, GridOp, VoxelGrid};
pub use zbuffer::ZBuffer;
