use anyhow::Context;

use gpulab_demos::config::FboDemoConfig;
use gpulab_engine::device::{GpuContext, GpuInit};
use gpulab_engine::logging::{init_logging, LoggingConfig};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = FboDemoConfig::from_env();
    let ctx = GpuContext::new_blocking(&GpuInit::default())
        .context("failed to acquire a GPU device")?;

    let mut stdout = std::io::stdout().lock();
    gpulab_demos::fbo::run(&ctx, &config, &mut stdout)?;
    Ok(())
}
