use anyhow::Result;
use winit::dpi::LogicalSize;

use reveal_engine::device::GpuInit;
use reveal_engine::logging::{init_logging, LoggingConfig};
use reveal_engine::window::{Runtime, RuntimeConfig};
use reveal_sketch::{RevealSketch, SketchAssets, SketchConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = SketchConfig::default();
    let assets = SketchAssets::load(&config.assets)?;

    let runtime = RuntimeConfig {
        title: config.title.clone(),
        initial_size: LogicalSize::new(config.window_size.0, config.window_size.1),
    };

    log::info!("starting '{}'", runtime.title);
    Runtime::run(runtime, GpuInit::default(), RevealSketch::new(config, assets))
}
