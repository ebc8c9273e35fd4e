use gpulab_demos::config::CubeConfig;
use gpulab_engine::logging::{init_logging, LoggingConfig};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());
    gpulab_demos::cube::run(CubeConfig::default())
}
