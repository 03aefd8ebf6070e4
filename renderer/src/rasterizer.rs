//! Painter's-algorithm voxel rasterizer
//!
//! Voxels are sorted farthest-first by the squared distance from the camera
//! to their transformed centers, then each one draws its three priority faces
//! (+Z, +Y, +X) straight onto the surface. Nearer voxels overwrite farther
//! ones. An optional z-buffer adds a coarse per-face depth test on top.

use log::{debug, trace};

use crate::camera::Camera3D;
use crate::pipeline::{Projector, ScreenPoint, DEFAULT_CULL_MARGIN};
use crate::surface::RasterSurface;
use crate::vector::Vector3;
use crate::voxel::{cube_vertices, palette, VoxelColor, PRIORITY_FACES};
use crate::voxel_grid::{GridCoord, VoxelGrid};
use crate::zbuffer::ZBuffer;

/// A voxel with its transformed center and squared camera distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortedVoxel {
    pub coord: GridCoord,
    pub color: VoxelColor,
    pub world_center: Vector3,
    pub distance_sq: f32,
}

/// Order voxels farthest-first from `camera_position`.
///
/// Centers go through the grid's object transform (with w-divide) before
/// measuring. Equal distances come out in no particular order.
pub fn depth_sort(grid: &VoxelGrid, camera_position: Vector3) -> Vec<SortedVoxel> {
    let mut sorted: Vec<SortedVoxel> = grid
        .get_all_voxels()
        .map(|(coord, color)| {
            let world_center = grid.grid_to_world(coord);
            SortedVoxel {
                coord,
                color,
                world_center,
                distance_sq: world_center.distance_squared(camera_position),
            }
        })
        .collect();
    sorted.sort_unstable_by(|a, b| b.distance_sq.total_cmp(&a.distance_sq));
    sorted
}

/// Per-frame rasterization knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Edge length of a voxel cube in grid units
    pub cube_size: f32,
    /// NDC cull threshold handed to the projector
    pub cull_margin: f32,
    pub depth_test: bool,
    /// Edge color, `None` to skip outlines
    pub outline: Option<VoxelColor>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            cube_size: 1.0,
            cull_margin: DEFAULT_CULL_MARGIN,
            depth_test: false,
            outline: Some(palette::OUTLINE),
        }
    }
}

/// What happened to one voxel this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoxelOutcome {
    /// At least one face was filled
    Drawn,
    /// None of its corners survived projection
    Clipped,
    /// Partially visible or depth-rejected, nothing filled
    Skipped,
}

/// Frame diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub clipped: usize,
    pub skipped: usize,
    pub faces_filled: usize,
}

impl FrameStats {
    pub fn record(&mut self, outcome: VoxelOutcome) {
        match outcome {
            VoxelOutcome::Drawn => self.drawn += 1,
            VoxelOutcome::Clipped => self.clipped += 1,
            VoxelOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Voxels considered this frame
    pub fn total(&self) -> usize {
        self.drawn + self.clipped + self.skipped
    }
}

/// Draws a [`VoxelGrid`] onto any [`RasterSurface`]
#[derive(Debug, Clone, Default)]
pub struct VoxelRenderer {
    settings: RenderSettings,
    zbuffer: Option<ZBuffer>,
}

impl VoxelRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            zbuffer: None,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
    }

    pub fn set_depth_test(&mut self, enabled: bool) {
        self.settings.depth_test = enabled;
    }

    /// Render one frame. Nothing here can fail; rejected geometry is only
    /// reflected in the returned stats.
    pub fn render_frame<S: RasterSurface + ?Sized>(
        &mut self,
        grid: &VoxelGrid,
        camera: &Camera3D,
        surface: &mut S,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        let (width, height) = surface.dimensions();
        if width == 0 || height == 0 {
            return stats;
        }

        let projector = Projector::new(camera, width as f32, height as f32)
            .with_cull_margin(self.settings.cull_margin);

        if self.settings.depth_test {
            self.prepare_zbuffer(width, height);
        }

        for voxel in depth_sort(grid, camera.position) {
            let outcome = self.draw_voxel(grid, &projector, &voxel, surface, &mut stats);
            stats.record(outcome);
        }

        trace!(
            "frame: drawn={} clipped={} skipped={} faces={}",
            stats.drawn,
            stats.clipped,
            stats.skipped,
            stats.faces_filled
        );
        stats
    }

    fn prepare_zbuffer(&mut self, width: usize, height: usize) {
        match self.zbuffer.as_mut() {
            Some(zb) if zb.width == width && zb.height == height => zb.clear(),
            Some(zb) => {
                debug!("resizing z-buffer to {}x{}", width, height);
                zb.resize(width, height);
            }
            None => {
                debug!("allocating {}x{} z-buffer", width, height);
                self.zbuffer = Some(ZBuffer::new(width, height));
            }
        }
    }

    fn draw_voxel<S: RasterSurface + ?Sized>(
        &mut self,
        grid: &VoxelGrid,
        projector: &Projector,
        voxel: &SortedVoxel,
        surface: &mut S,
        stats: &mut FrameStats,
    ) -> VoxelOutcome {
        // corners come from the original grid coordinate, not the sorted center
        let local = cube_vertices(voxel.coord.center(), self.settings.cube_size);
        let transform = grid.transform();
        let projected: [Option<ScreenPoint>; 8] =
            local.map(|v| projector.project(transform.transform_point(v).to_cartesian()));

        if projected.iter().all(Option::is_none) {
            return VoxelOutcome::Clipped;
        }

        let mut filled = 0;
        for face in PRIORITY_FACES {
            let mut points = [ScreenPoint::new(0.0, 0.0, 0.0); 4];
            let mut visible = true;
            for (slot, idx) in points.iter_mut().zip(face.indices()) {
                match projected[idx] {
                    Some(p) => *slot = p,
                    None => {
                        visible = false;
                        break;
                    }
                }
            }
            if !visible {
                continue;
            }

            if self.settings.depth_test && !self.depth_test_face(&points, surface.dimensions()) {
                continue;
            }

            surface.fill_polygon(&points, voxel.color);
            if let Some(outline) = self.settings.outline {
                surface.outline_polygon(&points, outline);
            }
            filled += 1;
        }

        stats.faces_filled += filled;
        if filled > 0 {
            VoxelOutcome::Drawn
        } else {
            VoxelOutcome::Skipped
        }
    }

    /// Test the face's mean depth at its centroid pixel (clamped onto the surface)
    fn depth_test_face(&mut self, points: &[ScreenPoint; 4], (width, height): (usize, usize)) -> bool {
        let Some(zb) = self.zbuffer.as_mut() else {
            return true;
        };
        let (mut cx, mut cy, mut depth) = (0.0, 0.0, 0.0);
        for p in points {
            cx += p.x;
            cy += p.y;
            depth += p.depth;
        }
        let n = points.len() as f32;
        let px = ((cx / n).max(0.0) as usize).min(width - 1);
        let py = ((cy / n).max(0.0) as usize).min(height - 1);
        zb.test_and_set(px, py, depth / n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandBuffer, DrawCommand};
    use crate::matrix::Axis;

    fn single(coord: GridCoord, color: VoxelColor) -> VoxelGrid {
        let mut grid = VoxelGrid::new();
        grid.set_voxel(coord, color);
        grid
    }

    #[test]
    fn test_depth_sort_farthest_first() {
        let mut grid = VoxelGrid::new();
        grid.set_voxel(GridCoord::new(0, 0, 1), palette::RED);
        grid.set_voxel(GridCoord::new(0, 0, 5), palette::GREEN);
        grid.set_voxel(GridCoord::new(0, 0, 3), palette::BLUE);

        let order: Vec<i32> = depth_sort(&grid, Vector3::new(0.0, 0.0, -10.0))
            .iter()
            .map(|v| v.coord.z)
            .collect();
        assert_eq!(order, vec![5, 3, 1]);
    }

    #[test]
    fn test_depth_sort_uses_transformed_centers() {
        let mut grid = VoxelGrid::new();
        grid.set_voxel(GridCoord::new(0, 0, 1), palette::RED);
        grid.set_voxel(GridCoord::new(0, 0, -1), palette::BLUE);
        let camera = Vector3::new(0.0, 0.0, 10.0);

        assert_eq!(depth_sort(&grid, camera)[0].coord.z, -1);

        // half a turn about Y swaps which one is far
        grid.rotate(Axis::Y, core::f32::consts::PI);
        let sorted = depth_sort(&grid, camera);
        assert_eq!(sorted[0].coord.z, 1);
        assert!(sorted[0].distance_sq >= sorted[1].distance_sq);
    }

    #[test]
    fn test_visible_voxel_draws_three_faces() {
        let grid = single(GridCoord::new(0, 0, 0), palette::RED);
        let mut camera = Camera3D::default();
        camera.set_position(Vector3::new(4.0, 4.0, 10.0));
        let mut cb = CommandBuffer::new(800, 600);

        let stats = VoxelRenderer::default().render_frame(&grid, &camera, &mut cb);
        assert_eq!(stats, FrameStats { drawn: 1, clipped: 0, skipped: 0, faces_filled: 3 });

        // fill then outline, per face
        assert_eq!(cb.len(), 6);
        for pair in cb.commands().chunks(2) {
            assert!(matches!(&pair[0], DrawCommand::Fill { color, .. } if *color == palette::RED));
            assert!(matches!(&pair[1], DrawCommand::Outline { color, .. } if *color == palette::OUTLINE));
            assert_eq!(pair[0].points(), pair[1].points());
        }
    }

    #[test]
    fn test_outline_disabled() {
        let grid = single(GridCoord::new(0, 0, 0), palette::GREEN);
        let mut cb = CommandBuffer::new(800, 600);
        let settings = RenderSettings {
            outline: None,
            ..Default::default()
        };
        VoxelRenderer::new(settings).render_frame(&grid, &Camera3D::default(), &mut cb);
        assert!(!cb.is_empty());
        assert!(cb.commands().iter().all(DrawCommand::is_fill));
    }

    #[test]
    fn test_voxel_behind_camera_is_clipped() {
        let grid = single(GridCoord::new(0, 0, 20), palette::BLUE);
        let mut cb = CommandBuffer::new(800, 600);
        let stats = VoxelRenderer::default().render_frame(&grid, &Camera3D::default(), &mut cb);
        assert_eq!(stats.clipped, 1);
        assert_eq!(stats.faces_filled, 0);
        assert!(cb.is_empty());
    }

    #[test]
    fn test_straddling_voxel_is_skipped_not_drawn() {
        // camera inside the cube: the back corners are in front of the lens,
        // every priority face touches a corner behind it
        let grid = single(GridCoord::new(0, 0, 0), palette::YELLOW);
        let mut camera = Camera3D::default();
        camera.set_position(Vector3::new(0.0, 0.0, 0.2));
        let mut cb = CommandBuffer::new(800, 600);

        let stats = VoxelRenderer::default().render_frame(&grid, &camera, &mut cb);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.drawn, 0);
        assert!(cb.is_empty());
    }

    #[test]
    fn test_painter_order_in_commands() {
        let mut grid = VoxelGrid::new();
        grid.set_voxel(GridCoord::new(0, 0, 0), palette::RED);
        grid.set_voxel(GridCoord::new(0, 0, -3), palette::BLUE);
        let mut cb = CommandBuffer::new(800, 600);

        let stats = VoxelRenderer::default().render_frame(&grid, &Camera3D::default(), &mut cb);
        assert_eq!(stats.drawn, 2);
        let colors: Vec<VoxelColor> = cb.fills().map(|c| c.color()).collect();
        assert_eq!(colors.first(), Some(&palette::BLUE));
        assert_eq!(colors.last(), Some(&palette::RED));
    }

    #[test]
    fn test_depth_test_rejects_coincident_faces() {
        // two identical voxels would draw the same faces at the same depth;
        // strict less-than rejects the second copy
        let mut grid = VoxelGrid::new();
        grid.set_voxel(GridCoord::new(0, 0, 0), palette::RED);
        let settings = RenderSettings {
            depth_test: true,
            ..Default::default()
        };
        let mut renderer = VoxelRenderer::new(settings);
        let mut cb = CommandBuffer::new(800, 600);
        let camera = Camera3D::default();

        let first = renderer.render_frame(&grid, &camera, &mut cb);
        assert!(first.faces_filled > 0);

        // a second frame clears the buffer, so the result is identical
        let again = renderer.render_frame(&grid, &camera, &mut cb);
        assert_eq!(first, again);

        // feed the same face twice within one frame through the helper
        let points = [
            ScreenPoint::new(100.0, 100.0, 0.4),
            ScreenPoint::new(120.0, 100.0, 0.4),
            ScreenPoint::new(120.0, 120.0, 0.4),
            ScreenPoint::new(100.0, 120.0, 0.4),
        ];
        renderer.prepare_zbuffer(800, 600);
        assert!(renderer.depth_test_face(&points, (800, 600)));
        assert!(!renderer.depth_test_face(&points, (800, 600)));
        let closer = points.map(|p| ScreenPoint::new(p.x, p.y, 0.3));
        assert!(renderer.depth_test_face(&closer, (800, 600)));
    }

    #[test]
    fn test_depth_test_passes_nearer_voxel_drawn_later() {
        // the far voxel is drawn first; the near one's front face lands on the
        // same centroid pixel with a smaller depth and still passes
        let mut grid = VoxelGrid::new();
        grid.set_voxel(GridCoord::new(0, 0, 0), palette::RED);
        grid.set_voxel(GridCoord::new(0, 0, -4), palette::BLUE);
        let settings = RenderSettings {
            depth_test: true,
            outline: None,
            ..Default::default()
        };
        let mut cb = CommandBuffer::new(800, 600);
        let stats = VoxelRenderer::new(settings).render_frame(&grid, &Camera3D::default(), &mut cb);
        assert_eq!(stats.drawn, 2);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_zero_sized_surface_draws_nothing() {
        let grid = single(GridCoord::new(0, 0, 0), palette::RED);
        let mut cb = CommandBuffer::new(0, 0);
        let stats = VoxelRenderer::default().render_frame(&grid, &Camera3D::default(), &mut cb);
        assert_eq!(stats, FrameStats::default());
        assert!(cb.is_empty());
    }

    #[test]
    fn test_wide_cull_margin_with_far_off_screen_vertices() {
        use crate::framebuffer::Framebuffer;

        // near face sits just in front of the lens, so its corners project
        // millions of pixels away and survive the widened cull
        let grid = single(GridCoord::new(5000, 0, 9), palette::RED);
        let mut camera = Camera3D::default();
        camera.set_position(Vector3::new(0.0, 0.0, 9.5001));

        for depth_test in [false, true] {
            let mut renderer = VoxelRenderer::new(RenderSettings {
                cull_margin: 1.0e9,
                depth_test,
                ..Default::default()
            });
            let mut fb = Framebuffer::new(64, 48).unwrap();
            let stats = renderer.render_frame(&grid, &camera, &mut fb);
            assert_eq!(stats.total(), 1);
        }
    }
}
