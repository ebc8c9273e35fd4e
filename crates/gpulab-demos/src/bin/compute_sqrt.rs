use gpulab_demos::config::ComputeDemoConfig;
use gpulab_engine::logging::{init_logging, LoggingConfig};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = ComputeDemoConfig::sqrt().with_env();
    let mut stdout = std::io::stdout().lock();
    gpulab_demos::compute::run_sqrt(&config, &mut stdout)?;
    Ok(())
}
