//! The rotating, lit cube.

use anyhow::Result;
use winit::dpi::LogicalSize;

use gpulab_engine::core::{App, AppControl, FrameCtx};
use gpulab_engine::device::GpuInit;
use gpulab_engine::render::CubeRenderer;
use gpulab_engine::time::FpsCounter;
use gpulab_engine::window::{Runtime, RuntimeConfig};

use crate::config::CubeConfig;

pub struct CubeApp {
    title: String,
    clear: wgpu::Color,
    renderer: CubeRenderer,
    fps: FpsCounter,
}

impl CubeApp {
    pub fn new(config: &CubeConfig) -> Self {
        Self {
            title: config.title.clone(),
            clear: config.clear,
            renderer: CubeRenderer::new(),
            fps: FpsCounter::new(),
        }
    }
}

impl App for CubeApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Some(fps) = self.fps.frame() {
            log::info!("FPS: {fps:.2}");
            ctx.window.set_title(&format!("{} ({fps:.0} fps)", self.title));
        }

        let elapsed_ms = ctx.time.elapsed_ms;
        let renderer = &mut self.renderer;
        ctx.render(self.clear, |rctx, target| {
            renderer.render(rctx, target, elapsed_ms)?;
            Ok(())
        })
    }
}

/// Opens the window and spins the cube until it is closed or Escape is pressed.
pub fn run(config: CubeConfig) -> Result<()> {
    let app = CubeApp::new(&config);
    let runtime = RuntimeConfig {
        title: config.title,
        initial_size: LogicalSize::new(config.width, config.height),
        ..RuntimeConfig::default()
    };
    Runtime::run(runtime, GpuInit::default(), app)
}
