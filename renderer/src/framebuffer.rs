//! Software framebuffer
//!
//! Pixels are packed `0x00RRGGBB`, row-major with no padding.

use crate::error::{RenderError, RenderResult};
use crate::pipeline::ScreenPoint;
use crate::surface::RasterSurface;
use crate::voxel::VoxelColor;

/// Owned pixel store the rasterizer draws into
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl Framebuffer {
    /// Create a framebuffer cleared to black
    pub fn new(width: usize, height: usize) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidViewport { width, height });
        }
        Ok(Self {
            pixels: vec![0; width * height],
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Clear with a color
    pub fn clear(&mut self, color: VoxelColor) {
        self.pixels.fill(color.to_u32());
    }

    /// Put a pixel at (x, y); out of bounds writes are dropped
    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Get pixel at (x, y), 0 when out of bounds
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            0
        }
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for py in y.min(y_end)..y_end {
            self.hline(x, x_end, py, color);
        }
    }

    /// Draw a horizontal span `[x1, x2)`
    #[inline]
    pub fn hline(&mut self, x1: usize, x2: usize, y: usize, color: u32) {
        if y >= self.height {
            return;
        }
        let start = x1.min(x2).min(self.width);
        let end = x1.max(x2).min(self.width);
        let row = y * self.width;
        self.pixels[row + start..row + end].fill(color);
    }

    /// Count pixels equal to `color`
    pub fn count_color(&self, color: VoxelColor) -> usize {
        let c = color.to_u32();
        self.pixels.iter().filter(|p| **p == c).count()
    }

    /// Draw a line between two screen positions.
    ///
    /// The segment is clipped to the surface first, so endpoints far off
    /// screen cost no more than on-screen ones. Non-finite endpoints draw
    /// nothing.
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: u32) {
        let max_x = (self.width - 1) as f64;
        let max_y = (self.height - 1) as f64;
        let Some(((ax, ay), (bx, by))) =
            clip_segment((x0 as f64, y0 as f64), (x1 as f64, y1 as f64), max_x, max_y)
        else {
            return;
        };

        self.bresenham(
            ax.clamp(0.0, max_x) as i32,
            ay.clamp(0.0, max_y) as i32,
            bx.clamp(0.0, max_x) as i32,
            by.clamp(0.0, max_y) as i32,
            color,
        );
    }

    /// Bresenham between two pixels already on the surface
    fn bresenham(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            self.put_pixel(x as usize, y as usize, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Scanline polygon fill.
    ///
    /// A pixel is covered when its center lies inside the polygon (even-odd
    /// rule), so shared edges between adjacent faces are not drawn twice.
    pub fn fill_polygon_u32(&mut self, points: &[ScreenPoint], color: u32) {
        if points.len() < 3 {
            return;
        }

        let (mut y_lo, mut y_hi) = (f32::INFINITY, f32::NEG_INFINITY);
        for p in points {
            y_lo = y_lo.min(p.y);
            y_hi = y_hi.max(p.y);
        }
        if !(y_lo.is_finite() && y_hi.is_finite()) {
            return;
        }

        // rows whose center y + 0.5 falls in [y_lo, y_hi)
        let row_start = libm::ceilf(y_lo - 0.5).max(0.0) as usize;
        let row_end = (libm::ceilf(y_hi - 0.5).max(0.0) as usize).min(self.height);

        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for y in row_start..row_end {
            let cy = y as f32 + 0.5;
            crossings.clear();

            for (i, a) in points.iter().enumerate() {
                let b = &points[(i + 1) % points.len()];
                // half-open in y so a vertex on the scanline counts once
                if (a.y <= cy && b.y > cy) || (b.y <= cy && a.y > cy) {
                    let t = (cy - a.y) / (b.y - a.y);
                    crossings.push(a.x + (b.x - a.x) * t);
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for span in crossings.chunks_exact(2) {
                // columns whose center x + 0.5 falls in [xa, xb)
                let xa = libm::ceilf(span[0] - 0.5).max(0.0) as usize;
                let xb = libm::ceilf(span[1] - 0.5).max(0.0) as usize;
                self.hline(xa, xb.max(xa), y, color);
            }
        }
    }
}

impl RasterSurface for Framebuffer {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn fill_polygon(&mut self, points: &[ScreenPoint], color: VoxelColor) {
        self.fill_polygon_u32(points, color.to_u32());
    }

    fn outline_polygon(&mut self, points: &[ScreenPoint], color: VoxelColor) {
        let c = color.to_u32();
        for (i, a) in points.iter().enumerate() {
            let b = &points[(i + 1) % points.len()];
            self.draw_line(a.x, a.y, b.x, b.y, c);
        }
    }
}

/// Liang-Barsky clip of segment `a`-`b` against `[0, max_x] x [0, max_y]`.
///
/// Endpoints already inside are returned unchanged; a clipped endpoint lies
/// exactly on the edge it was clipped against.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    max_x: f64,
    max_y: f64,
) -> Option<((f64, f64), (f64, f64))> {
    if !(a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite()) {
        return None;
    }

    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    // (is_y, edge value) that set t0 / t1
    let mut enter: Option<(bool, f64)> = None;
    let mut exit: Option<(bool, f64)> = None;

    let edges = [
        (-dx, a.0, false, 0.0),
        (dx, max_x - a.0, false, max_x),
        (-dy, a.1, true, 0.0),
        (dy, max_y - a.1, true, max_y),
    ];
    for (p, q, is_y, edge) in edges {
        if p == 0.0 {
            // parallel to this edge and outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            if r > t0 {
                t0 = r;
                enter = Some((is_y, edge));
            }
        } else {
            if r < t0 {
                return None;
            }
            if r < t1 {
                t1 = r;
                exit = Some((is_y, edge));
            }
        }
    }

    let at = |t: f64, snap: Option<(bool, f64)>| {
        let mut p = (a.0 + t * dx, a.1 + t * dy);
        match snap {
            Some((false, edge)) => p.0 = edge,
            Some((true, edge)) => p.1 = edge,
            None => {}
        }
        p
    };
    let start = if enter.is_some() { at(t0, enter) } else { a };
    let end = if exit.is_some() { at(t1, exit) } else { b };
    Some((start, end))
}
