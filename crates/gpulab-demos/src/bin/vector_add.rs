use gpulab_demos::config::ComputeDemoConfig;
use gpulab_engine::logging::{init_logging, LoggingConfig};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = ComputeDemoConfig::vector_add().with_env();
    let mut stdout = std::io::stdout().lock();
    gpulab_demos::compute::run_vector_add(&config, &mut stdout)?;
    Ok(())
}
