use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use prism_engine::device::GpuInit;
use prism_engine::frame::{EngineConfig, FrameLoop};
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::math::DEFAULT_ORBIT_RATE;
use prism_engine::overlay::{FrameStatsOverlay, Overlay};
use prism_engine::raster::{Rasterizer, SoftwareRasterizer};
use prism_engine::scene::{Mesh, Scene};
use prism_engine::window::{FrameSurface, HeadlessSurface, Window};

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MeshKind {
    Triangle,
    Cube,
}

impl MeshKind {
    fn build(self) -> Mesh {
        match self {
            MeshKind::Triangle => Mesh::triangle(),
            MeshKind::Cube => Mesh::cube(),
        }
    }
}

/// Orbiting instanced meshes drawn by the software rasterizer.
#[derive(Debug, Parser)]
#[command(name = "prism-viewer", version, about)]
struct Args {
    /// Window title.
    #[arg(long, default_value = "Test")]
    title: String,

    #[arg(long, default_value_t = 1600)]
    width: u32,

    #[arg(long, default_value_t = 900)]
    height: u32,

    /// Number of instances on the orbit ring.
    #[arg(long, default_value_t = 6)]
    instances: usize,

    #[arg(long, value_enum, default_value_t = MeshKind::Triangle)]
    mesh: MeshKind,

    /// Seed for instance colors.
    #[arg(long)]
    seed: Option<u64>,

    /// Camera angular rate in radians per second.
    #[arg(long, default_value_t = DEFAULT_ORBIT_RATE)]
    rate: f32,

    /// Cap on the per-frame camera step, in milliseconds.
    #[arg(long, value_name = "MS")]
    max_frame_ms: Option<u64>,

    /// Hide the frame-time overlay.
    #[arg(long)]
    no_overlay: bool,

    /// Render this many frames offscreen instead of opening a window.
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// Log filter, e.g. "debug" or "prism_engine=trace".
    #[arg(long)]
    log: Option<String>,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            instance_count: self.instances,
            orbit_rate: self.rate,
            color_seed: self.seed,
            overlay: !self.no_overlay,
            max_frame_delta: self.max_frame_ms.map(Duration::from_millis),
            ..EngineConfig::default()
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let logging = match &args.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    };
    init_logging(logging);

    match run(&args) {
        Ok(frames) => {
            log::info!("exiting after {frames} frames");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<u64> {
    let config = args.engine_config();
    let rasterizer = Rc::new(Rasterizer::new(SoftwareRasterizer::new(
        config.engine_options(),
    )));
    let scene = config.build_scene(args.mesh.build());

    let overlay = config
        .overlay
        .then(|| FrameStatsOverlay::new(Rc::clone(&rasterizer)));

    match args.headless {
        Some(frames) => {
            let surface = HeadlessSurface::new(config.width, config.height).with_frame_limit(frames);
            drive(&config, rasterizer, surface, overlay, scene)
        }
        None => {
            let window = Window::new(&config.window_config(), GpuInit::default())
                .context("window creation failed")?;
            drive(&config, rasterizer, window, overlay, scene)
        }
    }
}

fn drive<S, O>(
    config: &EngineConfig,
    rasterizer: Rc<Rasterizer<SoftwareRasterizer>>,
    surface: S,
    overlay: O,
    scene: Scene,
) -> Result<u64>
where
    S: FrameSurface,
    O: Overlay,
{
    let mut frames = FrameLoop::new(config, rasterizer, surface, overlay, scene)
        .context("failed to build the instanced pipeline")?;

    let result = frames.run();
    frames.shutdown();
    result
}
