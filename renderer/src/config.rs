//! TOML-backed render configuration
//!
//! Every field has a default, so an empty file is a valid config.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::Camera3D;
use crate::error::ConfigError;
use crate::pipeline::DEFAULT_CULL_MARGIN;
use crate::rasterizer::RenderSettings;
use crate::vector::Vector3;
use crate::voxel::{palette, VoxelColor};

/// Largest accepted `render.cull_margin`, in NDC units
pub const MAX_CULL_MARGIN: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub viewport: ViewportConfig,
    pub camera: CameraConfig,
    pub render: RenderSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub position: Vector3,
    /// Euler angles in radians
    pub rotation: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let cam = Camera3D::default();
        let (rx, ry, rz) = cam.rotation;
        Self {
            position: cam.position,
            rotation: [rx, ry, rz],
            fov: cam.fov,
            near: cam.near,
            far: cam.far,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    pub cube_size: f32,
    pub cull_margin: f32,
    pub depth_test: bool,
    pub outline: VoxelColor,
    pub outline_enabled: bool,
    pub background: VoxelColor,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            cube_size: 1.0,
            cull_margin: DEFAULT_CULL_MARGIN,
            depth_test: false,
            outline: palette::OUTLINE,
            outline_enabled: true,
            background: VoxelColor::new(20, 20, 28),
        }
    }
}

impl RenderConfig {
    /// Parse and validate
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ViewportConfig { width, height } = self.viewport;
        if width == 0 || height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-empty, got {}x{}",
                width, height
            )));
        }

        let cam = &self.camera;
        if !(cam.fov > 0.0 && cam.fov < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov must be in (0, 180) degrees, got {}",
                cam.fov
            )));
        }
        if !(cam.near > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.near must be positive, got {}",
                cam.near
            )));
        }
        if !(cam.near < cam.far) {
            return Err(ConfigError::Invalid(format!(
                "camera.near ({}) must be less than camera.far ({})",
                cam.near, cam.far
            )));
        }

        let render = &self.render;
        if !(render.cube_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "render.cube_size must be positive, got {}",
                render.cube_size
            )));
        }
        if !(render.cull_margin > 0.0 && render.cull_margin <= MAX_CULL_MARGIN) {
            return Err(ConfigError::Invalid(format!(
                "render.cull_margin must be in (0, {}], got {}",
                MAX_CULL_MARGIN, render.cull_margin
            )));
        }
        Ok(())
    }

    pub fn camera(&self) -> Camera3D {
        let c = &self.camera;
        let [rx, ry, rz] = c.rotation;
        Camera3D::new(c.position, (rx, ry, rz), c.fov, c.near, c.far)
    }

    pub fn settings(&self) -> RenderSettings {
        let r = &self.render;
        RenderSettings {
            cube_size: r.cube_size,
            cull_margin: r.cull_margin,
            depth_test: r.depth_test,
            outline: r.outline_enabled.then_some(r.outline),
        }
    }

    pub fn background(&self) -> VoxelColor {
        self.render.background
    }
}
