//! Compute-pipeline kernels on a real adapter.

use gpulab_engine::compute::{ComputeError, ComputeKernel};
use gpulab_engine::device::{GpuContext, GpuInit};
use gpulab_engine::shader::{ShaderAsset, ShaderError, Stage};
use gpulab_engine::verify::{compare, cpu_sqrt, cpu_vector_add, Tolerance};

fn context() -> Option<GpuContext> {
    match GpuContext::new_blocking(&GpuInit::default()) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("skipping: no GPU adapter ({e:#})");
            None
        }
    }
}

#[test]
fn sqrt_kernel_matches_cpu() {
    let Some(ctx) = context() else { return };
    let kernel = ComputeKernel::sqrt(&ctx).unwrap();
    // Not a multiple of the workgroup size, so the tail guard is exercised.
    let input: Vec<f32> = (0..10_007).map(|i| i as f32).collect();

    let gpu = kernel.run(&ctx, &[input.as_slice()]).unwrap();
    let mut cpu = vec![0.0; input.len()];
    cpu_sqrt(&input, &mut cpu);

    assert_eq!(gpu.len(), input.len());
    let cmp = compare(&gpu, &cpu, Tolerance::default());
    assert_eq!(cmp.mismatches, 0, "{cmp:?}");
    assert_eq!(gpu[0], 0.0);
}

#[test]
fn vector_add_is_exact() {
    let Some(ctx) = context() else { return };
    let kernel = ComputeKernel::vector_add(&ctx).unwrap();
    let a: Vec<f32> = (0..4097).map(|i| (2 * i) as f32).collect();
    let b = a.clone();

    let gpu = kernel.run(&ctx, &[a.as_slice(), b.as_slice()]).unwrap();
    let mut cpu = vec![0.0; a.len()];
    cpu_vector_add(&a, &b, &mut cpu);

    assert!(compare(&gpu, &cpu, Tolerance::EXACT).is_exact_match());
}

#[test]
fn mismatched_inputs_are_rejected() {
    let Some(ctx) = context() else { return };
    let kernel = ComputeKernel::vector_add(&ctx).unwrap();

    let two: &[f32] = &[1.0, 2.0];
    let one: &[f32] = &[1.0];

    let err = kernel.run(&ctx, &[two, one]).unwrap_err();
    assert!(matches!(err, ComputeError::LengthMismatch { index: 1, .. }));

    let err = kernel.run(&ctx, &[one]).unwrap_err();
    assert!(matches!(err, ComputeError::InputCount { expected: 2, actual: 1 }));
}

#[test]
fn broken_kernel_fails_to_build() {
    let Some(ctx) = context() else { return };
    let broken = ShaderAsset::from_source(
        "broken.comp.wgsl",
        "@compute @workgroup_size(256)\nfn main() {\n    let x: u32 = -1.5;\n}\n",
        "main",
        Stage::Compute,
    );

    match ComputeKernel::new(&ctx, &broken, 1, ComputeKernel::WORKGROUP_SIZE) {
        Err(ComputeError::Shader(ShaderError::Compile { line, .. })) => assert_eq!(line, 3),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("broken kernel compiled"),
    }
}
