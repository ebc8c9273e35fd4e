//! Compute-API demos: create context, compile, bind arguments, enqueue, read back.

use std::io::Write;

use anyhow::{bail, Context, Result};

use gpulab_engine::compute::ComputeKernel;
use gpulab_engine::device::{GpuContext, GpuInit};
use gpulab_engine::time::Stopwatch;
use gpulab_engine::verify::{compare, cpu_sqrt, cpu_vector_add, Comparison, Tolerance};

use crate::config::{Backend, ComputeDemoConfig};

/// What one run measured.
#[derive(Debug, Clone)]
pub struct ComputeReport {
    pub gpu_ms: u128,
    pub cpu_ms: u128,
    pub comparison: Comparison,
}

/// `data_size` random integral floats in `[0, i32::MAX)`.
pub fn random_input(data_size: usize, seed: u64) -> Vec<f32> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..data_size).map(|_| rng.i32(0..i32::MAX) as f32).collect()
}

/// `(a, b)` with `a[i] = b[i] = 2 * i`.
pub fn vector_add_input(data_size: usize) -> (Vec<f32>, Vec<f32>) {
    let a: Vec<f32> = (0..data_size).map(|i| (2 * i) as f32).collect();
    let b = a.clone();
    (a, b)
}

/// Element-wise `sqrt` of random data on the configured backend.
pub fn run_sqrt(config: &ComputeDemoConfig, out: &mut impl Write) -> Result<ComputeReport> {
    let data = random_input(config.data_size, config.seed);
    log::info!("sqrt of {} values on {:?}", data.len(), config.backend);

    let launcher = Launcher::new(config.backend, Kernel::Sqrt)?;
    let gpu_clock = Stopwatch::start();
    let gpu = launcher.run(&[data.as_slice()])?;
    let gpu_ms = gpu_clock.elapsed_ms();

    let mut cpu = vec![0.0; data.len()];
    let cpu_clock = Stopwatch::start();
    cpu_sqrt(&data, &mut cpu);
    let cpu_ms = cpu_clock.elapsed_ms();

    let comparison = compare(&gpu, &cpu, Tolerance::default());

    writeln!(out, "GPU time: {gpu_ms} ms")?;
    writeln!(out, "CPU time: {cpu_ms} ms")?;
    writeln!(
        out,
        "Computed '{}/{}' correct values!",
        comparison.matches(),
        comparison.len
    )?;

    Ok(ComputeReport {
        gpu_ms,
        cpu_ms,
        comparison,
    })
}

/// `res = a + b` on the configured backend, checked exactly.
///
/// A single wrong element is an error.
pub fn run_vector_add(config: &ComputeDemoConfig, out: &mut impl Write) -> Result<ComputeReport> {
    let (a, b) = vector_add_input(config.data_size);
    log::info!("vector add of {} values on {:?}", a.len(), config.backend);

    let launcher = Launcher::new(config.backend, Kernel::VectorAdd)?;
    let gpu_clock = Stopwatch::start();
    let gpu = launcher.run(&[a.as_slice(), b.as_slice()])?;
    let gpu_ms = gpu_clock.elapsed_ms();

    let mut cpu = vec![0.0; a.len()];
    let cpu_clock = Stopwatch::start();
    cpu_vector_add(&a, &b, &mut cpu);
    let cpu_ms = cpu_clock.elapsed_ms();

    let comparison = compare(&gpu, &cpu, Tolerance::EXACT);
    if let Some(i) = comparison.first_mismatch {
        bail!(
            "{} of {} results differ, first at index {i}",
            comparison.mismatches,
            comparison.len
        );
    }

    writeln!(out, "GPU time: {gpu_ms} ms")?;
    writeln!(out, "CPU time: {cpu_ms} ms")?;
    writeln!(out)?;
    writeln!(out, "Congratulations, it's working!")?;

    Ok(ComputeReport {
        gpu_ms,
        cpu_ms,
        comparison,
    })
}

#[derive(Debug, Copy, Clone)]
enum Kernel {
    Sqrt,
    VectorAdd,
}

/// A built kernel on one backend. Building happens before the clock starts.
enum Launcher {
    Wgpu(GpuContext, ComputeKernel),
    #[cfg(feature = "opencl")]
    OpenCl(gpulab_engine::compute::opencl::OclKernel),
}

impl Launcher {
    fn new(backend: Backend, kernel: Kernel) -> Result<Self> {
        match backend {
            Backend::Wgpu => {
                let ctx = GpuContext::new_blocking(&GpuInit::default())
                    .context("failed to acquire a GPU device")?;
                let k = match kernel {
                    Kernel::Sqrt => ComputeKernel::sqrt(&ctx),
                    Kernel::VectorAdd => ComputeKernel::vector_add(&ctx),
                }
                .context("failed to build the compute kernel")?;
                Ok(Launcher::Wgpu(ctx, k))
            }
            #[cfg(feature = "opencl")]
            Backend::OpenCl => {
                use gpulab_engine::compute::opencl::OclKernel;

                let k = match kernel {
                    Kernel::Sqrt => OclKernel::sqrt(),
                    Kernel::VectorAdd => OclKernel::vector_add(),
                }?;
                Ok(Launcher::OpenCl(k))
            }
            #[cfg(not(feature = "opencl"))]
            Backend::OpenCl => bail!("the OpenCL backend needs the `opencl` feature"),
        }
    }

    /// Upload, launch and read back.
    fn run(&self, inputs: &[&[f32]]) -> Result<Vec<f32>> {
        match self {
            Launcher::Wgpu(ctx, k) => Ok(k.run(ctx, inputs)?),
            #[cfg(feature = "opencl")]
            Launcher::OpenCl(k) => Ok(k.run(inputs)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_input_is_integral_and_seeded() {
        let a = random_input(1000, 7);
        assert_eq!(a, random_input(1000, 7));
        assert!(a.iter().all(|v| *v >= 0.0 && v.fract() == 0.0));
    }

    #[test]
    fn vector_add_input_doubles_the_index() {
        let (a, b) = vector_add_input(4);
        assert_eq!(a, vec![0.0, 2.0, 4.0, 6.0]);
        assert_eq!(a, b);
    }

    #[cfg(not(feature = "opencl"))]
    #[test]
    fn opencl_without_the_feature_is_an_error() {
        let config = ComputeDemoConfig {
            data_size: 16,
            backend: Backend::OpenCl,
            seed: 1,
        };
        assert!(run_sqrt(&config, &mut Vec::new()).is_err());
    }

    #[test]
    fn small_sqrt_run_reports_all_correct() {
        let config = ComputeDemoConfig {
            data_size: 1000,
            ..ComputeDemoConfig::sqrt()
        };
        let mut out = Vec::new();
        let report = match run_sqrt(&config, &mut out) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("skipping: {e:#}");
                return;
            }
        };
        let text = String::from_utf8(out).unwrap();
        assert_eq!(report.comparison.mismatches, 0);
        assert!(text.ends_with("Computed '1000/1000' correct values!\n"), "{text}");
    }

    #[test]
    fn small_vector_add_run_congratulates() {
        let config = ComputeDemoConfig {
            data_size: 777,
            ..ComputeDemoConfig::vector_add()
        };
        let mut out = Vec::new();
        if let Err(e) = run_vector_add(&config, &mut out) {
            eprintln!("skipping: {e:#}");
            return;
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("Congratulations, it's working!\n"));
    }
}
