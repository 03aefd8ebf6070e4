use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use voxel_benchmark::{run_into, write_ppm, BenchmarkConfig, BenchmarkError, BenchmarkResults};
use voxel_renderer::Framebuffer;

#[derive(Parser, Debug)]
#[command(version, about = "Headless voxel renderer benchmark")]
struct Args {
    /// TOML config with [benchmark], [viewport], [camera] and [render] tables
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Frames to render
    #[arg(long, short = 'n')]
    frames: Option<u32>,

    /// Framebuffer width in pixels
    #[arg(long, short = 'W')]
    width: Option<usize>,

    /// Framebuffer height in pixels
    #[arg(long, short = 'H')]
    height: Option<usize>,

    /// Enable the per-face depth test
    #[arg(long)]
    depth_test: bool,

    /// Write the final frame as a PPM image
    #[arg(long)]
    dump_frame: Option<PathBuf>,
}

fn build_config(args: &Args) -> Result<BenchmarkConfig, BenchmarkError> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading {}", path.display());
            BenchmarkConfig::load(path)?
        }
        None => BenchmarkConfig::default(),
    };

    if let Some(frames) = args.frames {
        config.frames = frames;
    }
    if let Some(width) = args.width {
        config.render.viewport.width = width;
    }
    if let Some(height) = args.height {
        config.render.viewport.height = height;
    }
    if args.depth_test {
        config.render.render.depth_test = true;
    }
    config.validate()?;
    Ok(config)
}

fn print_results(results: &BenchmarkResults) {
    println!("frames          {}", results.total_frames);
    println!("avg fps         {:.1}", results.avg_fps);
    println!("min / max fps   {:.1} / {:.1}", results.min_fps, results.max_fps);
    println!("1% low fps      {:.1}", results.low_1_percent);
    println!("drawn / frame   {}", results.avg_drawn);
    println!("clipped / frame {}", results.avg_clipped);
    println!(
        "last frame      drawn={} clipped={} skipped={} faces={}",
        results.last_frame.drawn,
        results.last_frame.clipped,
        results.last_frame.skipped,
        results.last_frame.faces_filled
    );
}

fn try_main(args: Args) -> Result<(), BenchmarkError> {
    let config = build_config(&args)?;
    let viewport = config.render.viewport;
    let mut fb = Framebuffer::new(viewport.width, viewport.height)?;

    let results = run_into(&config, &mut fb)?;
    print_results(&results);

    if let Some(path) = &args.dump_frame {
        write_ppm(&fb, path)?;
        info!("final frame written to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match try_main(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
