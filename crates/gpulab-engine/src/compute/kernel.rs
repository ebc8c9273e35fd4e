use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::device::GpuContext;
use crate::gpgpu::map_read;
use crate::shader::{assets, compile_checked, ShaderAsset};

use super::{split_workgroups, validate_inputs, ComputeError};

/// Launch parameters visible to the kernel.
///
/// `data_size` guards the tail of the last workgroup; `row_stride` turns the
/// 2D dispatch back into a flat index.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Params {
    data_size: u32,
    row_stride: u32,
    _pad: [u32; 2], // 16-byte uniform
}

/// An element-wise compute kernel over flat `f32` arrays.
///
/// Binding layout: inputs at `@binding(0..n)` (read-only storage), the output
/// at `@binding(n)`, and the `Params` uniform at `@binding(n + 1)`.
pub struct ComputeKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    inputs: usize,
    workgroup_size: u32,
    label: String,
}

impl ComputeKernel {
    /// Workgroup size declared by the bundled kernels.
    pub const WORKGROUP_SIZE: u32 = 256;

    /// `output[i] = sqrt(input[i])`
    pub fn sqrt(ctx: &GpuContext) -> Result<Self, ComputeError> {
        Self::new(ctx, &assets::SQRT_COMPUTE, 1, Self::WORKGROUP_SIZE)
    }

    /// `res[i] = a[i] + b[i]`
    pub fn vector_add(ctx: &GpuContext) -> Result<Self, ComputeError> {
        Self::new(ctx, &assets::VECTOR_ADD_COMPUTE, 2, Self::WORKGROUP_SIZE)
    }

    /// Compiles `asset` into a compute pipeline taking `inputs` arrays.
    ///
    /// `workgroup_size` must match the kernel's `@workgroup_size`.
    pub fn new(
        ctx: &GpuContext,
        asset: &ShaderAsset,
        inputs: usize,
        workgroup_size: u32,
    ) -> Result<Self, ComputeError> {
        let device = ctx.device();
        let module = compile_checked(device, asset)?;
        let label = format!("gpulab compute {}", asset.name());

        let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..inputs)
            .map(|i| storage_entry(i as u32, true))
            .collect();
        entries.push(storage_entry(inputs as u32, false));
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: inputs as u32 + 1,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Params>() as u64),
            },
            count: None,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gpulab compute bgl"),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gpulab compute pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(&label),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some(asset.entry_point()),
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            inputs,
            workgroup_size,
            label,
        })
    }

    /// Uploads `inputs`, dispatches one invocation per element and reads the
    /// output back. Blocks until the result is on the host.
    pub fn run(&self, ctx: &GpuContext, inputs: &[&[f32]]) -> Result<Vec<f32>, ComputeError> {
        let len = validate_inputs(inputs, self.inputs)?;
        let device = ctx.device();
        let limits = ctx.limits();

        let bytes = (len * std::mem::size_of::<f32>()) as u64;
        let max = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
        if bytes > max || len > u32::MAX as usize {
            return Err(ComputeError::TooLarge { bytes, max });
        }

        let total_groups = (len as u32).div_ceil(self.workgroup_size);
        let (groups_x, groups_y) =
            split_workgroups(total_groups, limits.max_compute_workgroups_per_dimension);

        let params = Params {
            data_size: len as u32,
            row_stride: groups_x * self.workgroup_size,
            _pad: [0; 2],
        };

        let input_buffers: Vec<wgpu::Buffer> = inputs
            .iter()
            .map(|data| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("gpulab compute input"),
                    contents: bytemuck::cast_slice(data),
                    usage: wgpu::BufferUsages::STORAGE,
                })
            })
            .collect();

        let output = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpulab compute output"),
            size: bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpulab compute staging"),
            size: bytes,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let params_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gpulab compute params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let mut bind_entries: Vec<wgpu::BindGroupEntry> = input_buffers
            .iter()
            .enumerate()
            .map(|(i, b)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: b.as_entire_binding(),
            })
            .collect();
        bind_entries.push(wgpu::BindGroupEntry {
            binding: self.inputs as u32,
            resource: output.as_entire_binding(),
        });
        bind_entries.push(wgpu::BindGroupEntry {
            binding: self.inputs as u32 + 1,
            resource: params_ubo.as_entire_binding(),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gpulab compute bind group"),
            layout: &self.bind_group_layout,
            entries: &bind_entries,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("gpulab compute encoder"),
        });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("gpulab compute pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.pipeline);
            cpass.set_bind_group(0, &bind_group, &[]);
            cpass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        encoder.copy_buffer_to_buffer(&output, 0, &staging, 0, bytes);
        ctx.queue().submit(std::iter::once(encoder.finish()));

        log::debug!(
            "{}: {len} elements as {groups_x}x{groups_y} workgroups of {}",
            self.label,
            self.workgroup_size
        );

        let raw = map_read(ctx, &staging)?;
        Ok(raw
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
