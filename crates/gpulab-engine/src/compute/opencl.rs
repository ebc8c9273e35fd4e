//! OpenCL launch path (`opencl` feature).
//!
//! Mirrors [`ComputeKernel`](super::ComputeKernel): the kernel takes its
//! inputs, then the output, then a `data_size` guard, and runs over a 1D
//! global range of one work-item per element.

use ocl::flags::MemFlags;
use ocl::{Buffer, DeviceType, Platform, ProQue};

use crate::shader::{assets, ShaderAsset, ShaderError, SourceLanguage};

use super::{validate_inputs, ComputeError};

fn ocl_err(e: impl std::fmt::Display) -> ComputeError {
    ComputeError::OpenCl(e.to_string())
}

/// An OpenCL C kernel over flat `f32` arrays.
pub struct OclKernel {
    asset: ShaderAsset,
    inputs: usize,
    device_type: DeviceType,
}

impl OclKernel {
    pub fn sqrt() -> Result<Self, ComputeError> {
        Self::new(assets::SQRT_OPENCL, 1)
    }

    pub fn vector_add() -> Result<Self, ComputeError> {
        Self::new(assets::VECTOR_ADD_OPENCL, 2)
    }

    pub fn new(asset: ShaderAsset, inputs: usize) -> Result<Self, ComputeError> {
        if asset.language() != SourceLanguage::OpenCl {
            return Err(ShaderError::WrongLanguage {
                name: asset.name().to_string(),
                language: asset.language(),
            }
            .into());
        }
        Ok(Self {
            asset,
            inputs,
            device_type: DeviceType::GPU,
        })
    }

    /// Runs on an OpenCL CPU device instead of the GPU.
    pub fn on_cpu(mut self) -> Self {
        self.device_type = DeviceType::CPU;
        self
    }

    /// Builds the program for the input length, launches it and reads back.
    ///
    /// A failed program build is returned with its build log.
    pub fn run(&self, inputs: &[&[f32]]) -> Result<Vec<f32>, ComputeError> {
        let len = validate_inputs(inputs, self.inputs)?;

        let pro_que = ProQue::builder()
            .platform(Platform::default())
            .device(ocl::builders::DeviceSpecifier::TypeFlags(self.device_type))
            .src(self.asset.source())
            .dims(len)
            .build()
            .map_err(ocl_err)?;

        log::info!("OpenCL device: {}", pro_que.device().name().map_err(ocl_err)?);

        let input_buffers = inputs
            .iter()
            .map(|data| {
                Buffer::<f32>::builder()
                    .queue(pro_que.queue().clone())
                    .flags(MemFlags::new().read_only())
                    .len(len)
                    .copy_host_slice(data)
                    .build()
                    .map_err(ocl_err)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output: Buffer<f32> = pro_que.create_buffer().map_err(ocl_err)?;

        let mut builder = pro_que.kernel_builder(self.asset.entry_point());
        for buffer in &input_buffers {
            builder.arg(buffer);
        }
        builder.arg(&output).arg(len as u32);
        let kernel = builder.build().map_err(ocl_err)?;

        // Safety: every argument is bound above and the kernel guards `i < data_size`.
        unsafe {
            kernel.enq().map_err(ocl_err)?;
        }

        let mut out = vec![0.0f32; len];
        output.read(&mut out).enq().map_err(ocl_err)?;
        Ok(out)
    }
}
