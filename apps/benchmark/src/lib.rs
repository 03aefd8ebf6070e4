//! Benchmark Application
//!
//! Headless frame loop over the voxel renderer: builds a shell scene, spins
//! it, dollies the camera, replays scripted object operations and records
//! per-frame timing and visibility counts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use voxel_renderer::{
    palette, Axis, ConfigError, Framebuffer, FrameStats, GridOp, RenderConfig, RenderError, Vector3,
    VoxelGrid, VoxelRenderer,
};

/// Shells larger than this are clamped
pub const MAX_SHELL_RADIUS: i32 = 32;

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An object operation replayed before the given frame is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedOp {
    pub frame: u32,
    pub op: GridOp,
}

/// Benchmark configuration.
///
/// Read from the `[benchmark]` table of a config file; the remaining tables
/// form the embedded [`RenderConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchmarkConfig {
    /// Frames to render
    pub frames: u32,
    /// Object spin about world Y, radians per frame
    pub spin_speed: f32,
    /// Camera movement along world Z, units per frame
    pub dolly_speed: f32,
    /// Half-extent of the sample shell
    pub shell_radius: i32,
    pub ops: Vec<ScriptedOp>,
    #[serde(skip)]
    pub render: RenderConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            frames: 120,
            spin_speed: 0.02,
            dolly_speed: 0.0,
            shell_radius: 3,
            ops: Vec::new(),
            render: RenderConfig::default(),
        }
    }
}

impl BenchmarkConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(s)?;
        let mut config: BenchmarkConfig = match table.remove("benchmark") {
            Some(section) => section.try_into()?,
            None => BenchmarkConfig::default(),
        };
        config.render = toml::Value::Table(table).try_into()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.render.validate()?;
        if self.frames == 0 {
            return Err(ConfigError::Invalid("benchmark.frames must be at least 1".into()));
        }
        if self.shell_radius < 0 {
            return Err(ConfigError::Invalid(format!(
                "benchmark.shell_radius must not be negative, got {}",
                self.shell_radius
            )));
        }
        Ok(())
    }
}

/// Benchmark results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkResults {
    /// Total frames rendered
    pub total_frames: u64,
    /// Average FPS
    pub avg_fps: f32,
    /// Minimum FPS
    pub min_fps: f32,
    /// Maximum FPS
    pub max_fps: f32,
    /// 1% low FPS
    pub low_1_percent: f32,
    pub total_drawn: u64,
    pub total_clipped: u64,
    pub total_skipped: u64,
    pub total_faces: u64,
    /// Average voxels drawn per frame
    pub avg_drawn: u64,
    /// Average voxels clipped per frame
    pub avg_clipped: u64,
    /// Stats of the final frame
    pub last_frame: FrameStats,
}

/// Frame times reserved up front; longer runs grow the buffer as they go
const FRAME_TIME_RESERVE: u32 = 4096;

/// Benchmark runner
pub struct Benchmark {
    target_frames: u64,
    results: BenchmarkResults,
    running: bool,
    frame_count: u64,
    elapsed_time: f32,
    frame_times: Vec<f32>,
}

impl Benchmark {
    pub fn new(target_frames: u32) -> Self {
        Self {
            target_frames: target_frames as u64,
            results: BenchmarkResults::default(),
            running: false,
            frame_count: 0,
            elapsed_time: 0.0,
            frame_times: Vec::with_capacity(target_frames.min(FRAME_TIME_RESERVE) as usize),
        }
    }

    /// Start the benchmark
    pub fn start(&mut self) {
        self.running = true;
        self.frame_count = 0;
        self.elapsed_time = 0.0;
        self.results = BenchmarkResults::default();
        self.frame_times.clear();
    }

    /// Stop the benchmark and compute results
    pub fn stop(&mut self) -> BenchmarkResults {
        self.running = false;
        self.compute_results();
        self.results.clone()
    }

    /// Record a frame
    pub fn record_frame(&mut self, frame_time: f32, stats: &FrameStats) {
        if !self.running {
            return;
        }

        self.frame_count += 1;
        self.elapsed_time += frame_time;
        self.results.total_drawn += stats.drawn as u64;
        self.results.total_clipped += stats.clipped as u64;
        self.results.total_skipped += stats.skipped as u64;
        self.results.total_faces += stats.faces_filled as u64;
        self.results.last_frame = *stats;
        self.frame_times.push(frame_time);
    }

    /// Check if benchmark is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get progress (0.0 - 1.0)
    pub fn progress(&self) -> f32 {
        if self.target_frames == 0 {
            return 1.0;
        }
        (self.frame_count as f32 / self.target_frames as f32).min(1.0)
    }

    /// Compute final results
    fn compute_results(&mut self) {
        self.results.total_frames = self.frame_count;

        if self.elapsed_time > 0.0 {
            self.results.avg_fps = self.frame_count as f32 / self.elapsed_time;
        }

        if self.frame_count > 0 {
            self.results.avg_drawn = self.results.total_drawn / self.frame_count;
            self.results.avg_clipped = self.results.total_clipped / self.frame_count;
        }

        if self.frame_times.is_empty() {
            return;
        }

        let mut sorted = self.frame_times.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        // Min FPS = 1 / max frame time
        let max_frame_time = sorted[sorted.len() - 1];
        if max_frame_time > 0.0 {
            self.results.min_fps = 1.0 / max_frame_time;
        }

        // Max FPS = 1 / min frame time
        let min_frame_time = sorted[0];
        if min_frame_time > 0.0 {
            self.results.max_fps = 1.0 / min_frame_time;
        }

        // 1% low = 1 / 99th percentile frame time
        let percentile_idx = (sorted.len() * 99) / 100;
        let percentile_time = sorted[percentile_idx.min(sorted.len() - 1)];
        if percentile_time > 0.0 {
            self.results.low_1_percent = 1.0 / percentile_time;
        }
    }

    /// Get current results (partial while running)
    pub fn results(&self) -> &BenchmarkResults {
        &self.results
    }
}

/// Run the configured scenario into a fresh framebuffer
pub fn run(config: &BenchmarkConfig) -> Result<BenchmarkResults, BenchmarkError> {
    let viewport = config.render.viewport;
    let mut fb = Framebuffer::new(viewport.width, viewport.height)?;
    run_into(config, &mut fb)
}

/// Run the configured scenario; `fb` holds the final frame afterwards
pub fn run_into(config: &BenchmarkConfig, fb: &mut Framebuffer) -> Result<BenchmarkResults, BenchmarkError> {
    config.validate()?;

    let mut radius = config.shell_radius;
    if radius > MAX_SHELL_RADIUS {
        warn!("shell radius {} too large, using {}", radius, MAX_SHELL_RADIUS);
        radius = MAX_SHELL_RADIUS;
    }

    let mut grid = VoxelGrid::sample_shell(radius, &palette::EDITOR);
    let mut camera = config.render.camera();
    let mut renderer = VoxelRenderer::new(config.render.settings());
    let background = config.render.background();

    info!(
        "benchmark: {} frames, {} voxels, {}x{}, depth test {}",
        config.frames,
        grid.count(),
        fb.width(),
        fb.height(),
        if renderer.settings().depth_test { "on" } else { "off" }
    );
    info!("{}", camera);

    let mut bench = Benchmark::new(config.frames);
    bench.start();

    for frame in 0..config.frames {
        for scripted in config.ops.iter().filter(|s| s.frame == frame) {
            debug!("frame {}: {:?}", frame, scripted.op);
            grid.apply(scripted.op);
        }
        if config.spin_speed != 0.0 {
            grid.rotate(Axis::Y, config.spin_speed);
        }
        if config.dolly_speed != 0.0 {
            camera.translate_by(Vector3::new(0.0, 0.0, config.dolly_speed));
        }

        let started = Instant::now();
        fb.clear(background);
        let stats = renderer.render_frame(&grid, &camera, fb);
        bench.record_frame(started.elapsed().as_secs_f32(), &stats);
    }

    let results = bench.stop();
    info!(
        "done: {} frames, avg {:.1} fps, {} drawn / {} clipped per frame",
        results.total_frames, results.avg_fps, results.avg_drawn, results.avg_clipped
    );
    Ok(results)
}

/// Write the framebuffer as a binary PPM (P6)
pub fn write_ppm(fb: &Framebuffer, path: impl AsRef<Path>) -> Result<(), BenchmarkError> {
    let path = path.as_ref();
    let io_err = |source: io::Error| BenchmarkError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    write!(out, "P6\n{} {}\n255\n", fb.width(), fb.height()).map_err(io_err)?;
    for px in fb.pixels() {
        let rgb = [(px >> 16) as u8, (px >> 8) as u8, *px as u8];
        out.write_all(&rgb).map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxel_renderer::{Camera3D, RenderSettings};

    fn small_config() -> BenchmarkConfig {
        let mut config = BenchmarkConfig {
            frames: 4,
            spin_speed: 0.0,
            shell_radius: 1,
            ..Default::default()
        };
        config.render.viewport.width = 160;
        config.render.viewport.height = 120;
        config
    }

    #[test]
    fn test_runner_lifecycle() {
        let mut bench = Benchmark::new(4);
        let stats = FrameStats {
            drawn: 3,
            clipped: 1,
            skipped: 0,
            faces_filled: 9,
        };

        // ignored until started
        bench.record_frame(0.01, &stats);
        assert_eq!(bench.progress(), 0.0);

        bench.start();
        assert!(bench.is_running());
        bench.record_frame(0.010, &stats);
        bench.record_frame(0.020, &stats);
        assert_eq!(bench.progress(), 0.5);
        assert_eq!(bench.results().total_drawn, 6);

        let results = bench.stop();
        assert!(!bench.is_running());
        assert_eq!(results.total_frames, 2);
        assert_eq!(results.avg_drawn, 3);
        assert_eq!(results.avg_clipped, 1);
        assert_eq!(results.total_faces, 18);
        assert!((results.max_fps - 100.0).abs() < 1e-2);
        assert!((results.min_fps - 50.0).abs() < 1e-2);
        assert!((results.low_1_percent - 50.0).abs() < 1e-2);
    }

    #[test]
    fn test_huge_frame_target_reserves_lazily() {
        let mut bench = Benchmark::new(u32::MAX);
        assert!(bench.frame_times.capacity() <= FRAME_TIME_RESERVE as usize);

        bench.start();
        for _ in 0..3 {
            bench.record_frame(0.01, &FrameStats::default());
        }
        assert!(bench.progress() < 1e-6);

        let results = bench.stop();
        assert_eq!(results.total_frames, 3);
        assert!((results.avg_fps - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_static_scene_counts_are_stable() {
        let config = small_config();
        let results = run(&config).unwrap();

        let grid = VoxelGrid::sample_shell(1, &palette::EDITOR);
        let mut fb = Framebuffer::new(160, 120).unwrap();
        let single = VoxelRenderer::new(RenderSettings::default()).render_frame(&grid, &Camera3D::default(), &mut fb);

        assert_eq!(results.total_frames, 4);
        assert_eq!(results.last_frame, single);
        assert_eq!(results.total_drawn, 4 * single.drawn as u64);
        assert_eq!(
            results.total_drawn + results.total_clipped + results.total_skipped,
            4 * grid.count() as u64
        );
    }

    #[test]
    fn test_scripted_op_moves_shell_behind_camera() {
        let mut config = small_config();
        config.ops.push(ScriptedOp {
            frame: 2,
            op: GridOp::Translate(Vector3::new(0.0, 0.0, 50.0)),
        });
        let results = run(&config).unwrap();
        // the shell is moved behind the camera for the last two frames
        assert_eq!(results.last_frame.drawn, 0);
        assert_eq!(results.last_frame.clipped, 26);
        assert_eq!(results.total_clipped, 2 * 26);
    }

    #[test]
    fn test_dolly_moves_camera_away() {
        let mut config = small_config();
        config.dolly_speed = -20.0;
        let results = run(&config).unwrap();
        // the camera passes the shell before the first frame is drawn
        assert_eq!(results.total_drawn, 0);
        assert_eq!(results.last_frame.clipped, 26);
    }

    #[test]
    fn test_config_sections() {
        let config = BenchmarkConfig::from_toml_str(
            r#"
            [benchmark]
            frames = 10
            shell_radius = 2

            [[benchmark.ops]]
            frame = 3
            op = { rotate = { axis = "x", angle = 0.25 } }

            [viewport]
            width = 64
            height = 48

            [render]
            depth_test = true
            "#,
        )
        .unwrap();

        assert_eq!(config.frames, 10);
        assert_eq!(config.spin_speed, 0.02);
        assert_eq!(config.ops[0].frame, 3);
        assert_eq!(config.ops[0].op, GridOp::Rotate { axis: Axis::X, angle: 0.25 });
        assert_eq!(config.render.viewport.width, 64);
        assert!(config.render.settings().depth_test);
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            BenchmarkConfig::from_toml_str("[benchmark]\nframes = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BenchmarkConfig::from_toml_str("[camera]\nnear = 5.0\nfar = 1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(BenchmarkConfig::from_toml_str("").is_ok());
    }

    #[test]
    fn test_write_ppm() {
        let mut fb = Framebuffer::new(2, 1).unwrap();
        fb.put_pixel(1, 0, 0x102030);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.ppm");
        write_ppm(&fb, &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        let header = b"P6\n2 1\n255\n";
        assert_eq!(&bytes[..header.len()], header);
        assert_eq!(&bytes[header.len()..], &[0, 0, 0, 0x10, 0x20, 0x30]);
    }
}
