use bytemuck::{Pod, Zeroable};
use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::device::GpuContext;
use crate::shader::{assets, compile_checked, ShaderAsset, ShaderError};

use super::{RenderTarget, TARGET_FORMAT};

#[derive(Debug, Error)]
pub enum PassError {
    #[error("render target #{0} is both an input and the output of a pass")]
    Aliased(u64),

    #[error("kernel samples {expected} source texture(s), got {actual}")]
    SourceCount { expected: usize, actual: usize },

    #[error("{0:?} is not renderable on this adapter")]
    UnsupportedFormat(wgpu::TextureFormat),

    #[error(transparent)]
    Shader(#[from] ShaderError),
}

// ── quad ──────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    corner: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

// ── kernel ────────────────────────────────────────────────────────────────

/// A fragment-stage kernel run over every texel of a destination target.
///
/// A kernel over `n` sources reads them from `@group(0) @binding(0..n)`
/// (`texture_2d<f32>` each) through the sampler at `@binding(n)`, using the
/// `uv` interpolated at `@location(0)`, and writes one `vec4<f32>` to
/// `@location(0)`. Invocations share nothing, so no synchronization is
/// involved.
pub struct FragmentKernel {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
    sources: usize,
    label: String,
}

impl FragmentKernel {
    /// Builds the per-channel `sqrt` kernel.
    pub fn sqrt(ctx: &GpuContext) -> Result<Self, PassError> {
        Self::new(ctx, &assets::QUAD_VERTEX, &assets::SQRT_FRAGMENT, 1)
    }

    /// Builds the two-source `a + b` kernel.
    pub fn add(ctx: &GpuContext) -> Result<Self, PassError> {
        Self::new(ctx, &assets::QUAD_VERTEX, &assets::ADD_FRAGMENT, 2)
    }

    /// Compiles `vertex` + `fragment` and builds a pipeline sampling
    /// `sources` input textures.
    ///
    /// Fails before any pipeline exists when the adapter cannot render into
    /// [`TARGET_FORMAT`] or either asset is broken.
    pub fn new(
        ctx: &GpuContext,
        vertex: &ShaderAsset,
        fragment: &ShaderAsset,
        sources: usize,
    ) -> Result<Self, PassError> {
        if !ctx.supports_render_attachment(TARGET_FORMAT) {
            return Err(PassError::UnsupportedFormat(TARGET_FORMAT));
        }

        let device = ctx.device();
        let vs = compile_checked(device, vertex)?;
        let fs = compile_checked(device, fragment)?;
        let label = format!("gpulab kernel {}", fragment.name());

        let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..sources)
            .map(|i| wgpu::BindGroupLayoutEntry {
                binding: i as u32,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    // 32-bit float textures are not filterable without an extra feature.
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            })
            .collect();
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: sources as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
            count: None,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gpulab kernel bgl"),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gpulab kernel pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(fragment.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    // Numeric output: write the kernel result as-is.
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // Arrays, not images: no interpolation between elements, no wraparound.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("gpulab kernel sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gpulab quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gpulab quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            sampler,
            quad_vbo,
            quad_ibo,
            sources,
            label,
        })
    }

    /// Number of source textures each pass samples.
    pub fn sources(&self) -> usize {
        self.sources
    }

    /// Runs the kernel once: `dest[i] = kernel(source[i])` for every texel of `dest`.
    pub fn run(
        &self,
        ctx: &GpuContext,
        source: &RenderTarget,
        dest: &RenderTarget,
    ) -> Result<(), PassError> {
        self.run_sources_repeated(ctx, &[source], dest, 1)
    }

    /// Single-source [`run_sources_repeated`](Self::run_sources_repeated).
    pub fn run_repeated(
        &self,
        ctx: &GpuContext,
        source: &RenderTarget,
        dest: &RenderTarget,
        loop_count: u32,
    ) -> Result<(), PassError> {
        self.run_sources_repeated(ctx, &[source], dest, loop_count)
    }

    /// Runs the kernel once over `sources`, bound in order.
    pub fn run_sources(
        &self,
        ctx: &GpuContext,
        sources: &[&RenderTarget],
        dest: &RenderTarget,
    ) -> Result<(), PassError> {
        self.run_sources_repeated(ctx, sources, dest, 1)
    }

    /// Submits the same pass `loop_count` times, one submission per iteration.
    ///
    /// The output depends only on `sources`, which no pass writes, so the
    /// result after any number of passes equals the result after one. The
    /// repetition only amortizes fixed costs for timing.
    ///
    /// Submission is asynchronous; call [`GpuContext::wait_idle`] before
    /// reading the clock.
    pub fn run_sources_repeated(
        &self,
        ctx: &GpuContext,
        sources: &[&RenderTarget],
        dest: &RenderTarget,
        loop_count: u32,
    ) -> Result<(), PassError> {
        if sources.len() != self.sources {
            return Err(PassError::SourceCount {
                expected: self.sources,
                actual: sources.len(),
            });
        }
        if let Some(src) = sources.iter().find(|s| s.id() == dest.id()) {
            return Err(PassError::Aliased(src.id()));
        }

        let bind_group = self.bind_sources(ctx, sources);

        for _ in 0..loop_count {
            let mut encoder = ctx
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("gpulab kernel encoder"),
                });
            self.encode(&mut encoder, &bind_group, dest);
            ctx.queue().submit(std::iter::once(encoder.finish()));
        }

        log::trace!("{}: {loop_count} pass(es) submitted", self.label);
        Ok(())
    }

    fn bind_sources(&self, ctx: &GpuContext, sources: &[&RenderTarget]) -> wgpu::BindGroup {
        let mut entries: Vec<wgpu::BindGroupEntry> = sources
            .iter()
            .enumerate()
            .map(|(i, src)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: wgpu::BindingResource::TextureView(src.view()),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: sources.len() as u32,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        });

        ctx.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gpulab kernel bind group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }

    fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        bind_group: &wgpu::BindGroup,
        dest: &RenderTarget,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("gpulab kernel pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: dest.view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(0.0, 0.0, dest.width() as f32, dest.height() as f32, 0.0, 1.0);
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
        rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}
