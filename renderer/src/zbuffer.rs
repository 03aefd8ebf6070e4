//! Depth buffer for the optional per-face depth test

/// Z-buffer for depth testing.
///
/// Depth is 0 at the near plane and 1 at the far plane, so smaller is closer.
#[derive(Debug, Clone)]
pub struct ZBuffer {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl ZBuffer {
    /// Create a new z-buffer cleared to +infinity
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![f32::INFINITY; width * height],
            width,
            height,
        }
    }

    /// Clear the z-buffer
    pub fn clear(&mut self) {
        self.data.fill(f32::INFINITY);
    }

    /// Reallocate for a new surface size; contents are cleared
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width * height, f32::INFINITY);
    }

    /// Test and set depth at (x, y).
    /// Returns true if the new depth is strictly closer (should draw)
    #[inline]
    pub fn test_and_set(&mut self, x: usize, y: usize, depth: f32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y * self.width + x;
        if depth < self.data[idx] {
            self.data[idx] = depth;
            true
        } else {
            false
        }
    }

    /// Get depth at (x, y)
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return f32::INFINITY;
        }
        self.data[y * self.width + x]
    }
}
