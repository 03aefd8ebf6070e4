//! World → view → clip → NDC → screen transformation

use crate::camera::Camera3D;
use crate::matrix::Matrix4;
use crate::vector::Vector3;

/// Clip-space `w` below this magnitude is not divided by
pub const MIN_CLIP_W: f32 = 1e-6;

/// NDC x/y beyond this are culled. 1.0 is the true frustum edge; the extra
/// margin keeps faces straddling the border from popping.
pub const DEFAULT_CULL_MARGIN: f32 = 1.5;

/// Reference viewport for [`is_point_in_frustum`]
const REFERENCE_VIEWPORT: (f32, f32) = (1920.0, 1080.0);

/// A projected vertex. `depth` is 0 at the near plane and 1 at the far plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32, depth: f32) -> Self {
        Self { x, y, depth }
    }
}

/// Map NDC `[-1, 1]` to pixel coordinates; Y is flipped so it grows downward
#[inline]
pub fn viewport_transform(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> (f32, f32) {
    let screen_x = (ndc_x + 1.0) * 0.5 * width;
    let screen_y = (1.0 - ndc_y) * 0.5 * height;
    (screen_x, screen_y)
}

/// View and projection matrices resolved once for a frame
#[derive(Debug, Clone)]
pub struct Projector {
    view: Matrix4,
    projection: Matrix4,
    width: f32,
    height: f32,
    cull_margin: f32,
}

impl Projector {
    pub fn new(camera: &Camera3D, width: f32, height: f32) -> Self {
        let aspect = width / height;
        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(aspect),
            width,
            height,
            cull_margin: DEFAULT_CULL_MARGIN,
        }
    }

    pub fn with_cull_margin(mut self, margin: f32) -> Self {
        self.cull_margin = margin;
        self
    }

    pub fn view(&self) -> &Matrix4 {
        &self.view
    }

    pub fn projection(&self) -> &Matrix4 {
        &self.projection
    }

    /// Project a world-space point.
    ///
    /// Returns `None` when the point is at or behind the camera, when the
    /// clip-space `w` is too small to divide by, or when it lands outside the
    /// widened frustum.
    pub fn project(&self, point: Vector3) -> Option<ScreenPoint> {
        let view_pos = self.view.transform_point(point);
        if view_pos.z >= 0.0 {
            return None;
        }

        let clip = self.projection.transform_point(view_pos.xyz());
        if clip.w.abs() < MIN_CLIP_W {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let ndc_z = clip.z / clip.w;

        // NaN fails both comparisons, so test for "inside" rather than "outside"
        if !(ndc_x.abs() <= self.cull_margin && ndc_y.abs() <= self.cull_margin) {
            return None;
        }

        let (x, y) = viewport_transform(ndc_x, ndc_y, self.width, self.height);
        let depth = (ndc_z + 1.0) * 0.5;

        Some(ScreenPoint { x, y, depth })
    }
}

/// Project a single point with a freshly built [`Projector`]
pub fn project(point: Vector3, camera: &Camera3D, width: f32, height: f32) -> Option<ScreenPoint> {
    Projector::new(camera, width, height).project(point)
}

/// Whether the point survives projection against a 1920x1080 viewport
pub fn is_point_in_frustum(point: Vector3, camera: &Camera3D) -> bool {
    let (w, h) = REFERENCE_VIEWPORT;
    project(point, camera, w, h).is_some()
}
