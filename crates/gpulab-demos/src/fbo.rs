//! "Oldschool" GPGPU: `sqrt` over a float texture by drawing a quad into an
//! off-screen target, timed against the same loop on the CPU.

use std::io::Write;

use anyhow::{ensure, Context, Result};

use gpulab_engine::device::GpuContext;
use gpulab_engine::gpgpu::{read_target, ComputeBuffer, FragmentKernel, RenderTarget};
use gpulab_engine::time::Stopwatch;
use gpulab_engine::verify::{compare, cpu_sqrt, preview, preview_len, repeat_cpu, Comparison, Tolerance};

use crate::config::FboDemoConfig;

/// What one run measured.
#[derive(Debug, Clone)]
pub struct FboReport {
    pub gpu_ms: u128,
    pub cpu_ms: u128,
    pub comparison: Comparison,
}

/// Runs the demo on `ctx` and prints the classic report to `out`.
pub fn run(ctx: &GpuContext, config: &FboDemoConfig, out: &mut impl Write) -> Result<FboReport> {
    ensure!(config.tex_size > 0, "texture size must be at least 1");
    ensure!(config.loop_count > 0, "loop count must be at least 1");

    let size = config.tex_size;
    let input = ComputeBuffer::sequential(size, size);
    log::info!(
        "sqrt over a {size}x{size} texture ({} floats), {} pass(es)",
        input.len(),
        config.loop_count
    );

    let kernel = FragmentKernel::sqrt(ctx).context("failed to build the sqrt kernel")?;
    let source = RenderTarget::from_buffer(ctx, &input).context("failed to create input target")?;
    let dest = RenderTarget::new(ctx, size, size, None).context("failed to create output target")?;

    let gpu_clock = Stopwatch::start();
    kernel.run_repeated(ctx, &source, &dest, config.loop_count)?;
    ctx.wait_idle()?;
    let gpu_ms = gpu_clock.elapsed_ms();

    let result = read_target(ctx, &dest).context("failed to read back the output target")?;

    let shown = preview_len(size, input.len(), config.preview_len);
    writeln!(out, "Data before computing:")?;
    write!(out, "{}", preview(input.as_slice(), shown))?;
    writeln!(out, "Data after computing:")?;
    write!(out, "{}", preview(result.as_slice(), shown))?;
    writeln!(out, "Total ms (GPU): {gpu_ms}")?;

    let mut cpu = vec![0.0; input.len()];
    let cpu_clock = Stopwatch::start();
    repeat_cpu(config.loop_count, || {
        cpu_sqrt(std::hint::black_box(input.as_slice()), &mut cpu)
    });
    let cpu_ms = cpu_clock.elapsed_ms();
    writeln!(out, "Total ms (CPU): {cpu_ms}")?;

    let comparison = compare(result.as_slice(), &cpu, Tolerance::default());
    writeln!(out, "Mismatches: {} / {}", comparison.mismatches, comparison.len)?;
    if let Some(i) = comparison.first_mismatch {
        log::warn!(
            "first mismatch at {i}: gpu {} vs cpu {} (max abs error {})",
            result.as_slice().get(i).copied().unwrap_or(f32::NAN),
            cpu.get(i).copied().unwrap_or(f32::NAN),
            comparison.max_abs_error
        );
    }

    Ok(FboReport {
        gpu_ms,
        cpu_ms,
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use gpulab_engine::device::GpuInit;
    use gpulab_engine::gpgpu::TARGET_FORMAT;

    use super::*;

    fn adapter() -> Option<GpuContext> {
        let ctx = GpuContext::new_blocking(&GpuInit::default()).ok();
        if ctx.is_none() {
            eprintln!("skipping: no GPU adapter");
        }
        ctx
    }

    #[test]
    fn zero_loops_is_rejected() {
        let Some(ctx) = adapter() else { return };
        let config = FboDemoConfig {
            tex_size: 2,
            loop_count: 0,
            preview_len: 16,
        };
        let mut out = Vec::new();

        assert!(run(&ctx, &config, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn unrenderable_float_format_is_an_error() {
        let Some(ctx) = adapter() else { return };
        if ctx.supports_render_attachment(TARGET_FORMAT) {
            return;
        }
        let config = FboDemoConfig {
            tex_size: 4,
            loop_count: 1,
            preview_len: 16,
        };

        let err = run(&ctx, &config, &mut Vec::new()).unwrap_err();

        assert!(format!("{err:#}").contains("not renderable"), "{err:#}");
    }

    #[test]
    fn small_texture_prints_every_value() {
        let Some(ctx) = adapter() else { return };
        if !ctx.supports_render_attachment(TARGET_FORMAT) {
            eprintln!("skipping: adapter cannot render {TARGET_FORMAT:?}");
            return;
        }
        let config = FboDemoConfig {
            tex_size: 2,
            loop_count: 3,
            preview_len: 16,
        };
        let mut out = Vec::new();

        let report = run(&ctx, &config, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(report.comparison.mismatches, 0);
        assert!(text.starts_with("Data before computing:\n1.000000\n2.000000\n"));
        assert!(text.contains("Data after computing:\n1.000000\n1.414214\n"));
        // 16 values on each side.
        assert!(text.contains("16.000000\nData after computing:"));
        assert!(text.contains("4.000000\nTotal ms (GPU): "));
        assert!(text.contains("Total ms (CPU): "));
        assert!(text.ends_with("Mismatches: 0 / 16\n"));
    }
}
