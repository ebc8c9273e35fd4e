use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::math::{Mat4, Vec3};
use crate::render::{DrawTarget, RenderCtx};
use crate::shader::{assets, compile_checked, validate_wgsl, ShaderError};

const FOVY_DEG: f32 = 60.0;
const Z_NEAR: f32 = 0.5;
const Z_FAR: f32 = 100.0;
const EYE: Vec3 = Vec3::new(0.0, 0.0, 3.0);
const ROTATION_AXIS: Vec3 = Vec3::new(0.0, 1.0, 1.0);
/// Degrees of rotation per elapsed millisecond.
const DEG_PER_MS: f32 = 0.1;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl CubeVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const fn v(position: [f32; 3], normal: [f32; 3]) -> CubeVertex {
    CubeVertex { position, normal }
}

/// Unit cube spanning `[0, 1]^3`, two triangles per face, flat normals.
pub const CUBE_VERTICES: [CubeVertex; 36] = {
    const L: [f32; 3] = [-1.0, 0.0, 0.0];
    const R: [f32; 3] = [1.0, 0.0, 0.0];
    const T: [f32; 3] = [0.0, 1.0, 0.0];
    const B: [f32; 3] = [0.0, -1.0, 0.0];
    const F: [f32; 3] = [0.0, 0.0, 1.0];
    const K: [f32; 3] = [0.0, 0.0, -1.0];
    [
        // left
        v([0.0, 0.0, 0.0], L),
        v([0.0, 1.0, 0.0], L),
        v([0.0, 1.0, 1.0], L),
        v([0.0, 1.0, 1.0], L),
        v([0.0, 0.0, 1.0], L),
        v([0.0, 0.0, 0.0], L),
        // right
        v([1.0, 0.0, 0.0], R),
        v([1.0, 0.0, 1.0], R),
        v([1.0, 1.0, 1.0], R),
        v([1.0, 1.0, 1.0], R),
        v([1.0, 1.0, 0.0], R),
        v([1.0, 0.0, 0.0], R),
        // top
        v([0.0, 1.0, 0.0], T),
        v([0.0, 1.0, 1.0], T),
        v([1.0, 1.0, 1.0], T),
        v([1.0, 1.0, 1.0], T),
        v([1.0, 1.0, 0.0], T),
        v([0.0, 1.0, 0.0], T),
        // bottom
        v([0.0, 0.0, 0.0], B),
        v([0.0, 0.0, 1.0], B),
        v([1.0, 0.0, 1.0], B),
        v([1.0, 0.0, 1.0], B),
        v([1.0, 0.0, 0.0], B),
        v([0.0, 0.0, 0.0], B),
        // front
        v([0.0, 0.0, 1.0], F),
        v([0.0, 1.0, 1.0], F),
        v([1.0, 1.0, 1.0], F),
        v([1.0, 1.0, 1.0], F),
        v([1.0, 0.0, 1.0], F),
        v([0.0, 0.0, 1.0], F),
        // back
        v([0.0, 0.0, 0.0], K),
        v([0.0, 1.0, 0.0], K),
        v([1.0, 1.0, 0.0], K),
        v([1.0, 1.0, 0.0], K),
        v([1.0, 0.0, 0.0], K),
        v([0.0, 0.0, 0.0], K),
    ]
};

/// Model-view-projection and model-view matrices for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubeMatrices {
    pub mvp: Mat4,
    pub model_view: Mat4,
}

/// Matrices for the cube at `elapsed_ms` since start, in a view of `aspect`.
///
/// The cube is centred on the origin, spun about (0, 1, 1) at 0.1 degrees
/// per millisecond, and viewed from (0, 0, 3).
pub fn cube_matrices(elapsed_ms: f32, aspect: f32) -> CubeMatrices {
    let view = Mat4::look_at(EYE, Vec3::zero(), Vec3::new(0.0, 1.0, 0.0));
    let model = Mat4::rotation(ROTATION_AXIS, elapsed_ms * DEG_PER_MS)
        * Mat4::translation(Vec3::new(-0.5, -0.5, -0.5));
    let model_view = view * model;
    let mvp = Mat4::perspective(FOVY_DEG, aspect, Z_NEAR, Z_FAR) * model_view;
    CubeMatrices { mvp, model_view }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CubeUniforms {
    mvp: [[f32; 4]; 4],
    model_view: [[f32; 4]; 4],
}

impl From<CubeMatrices> for CubeUniforms {
    fn from(m: CubeMatrices) -> Self {
        Self {
            mvp: m.mvp.cols,
            model_view: m.model_view.cols,
        }
    }
}

/// Draws the lit, rotating cube.
///
/// GPU resources are created on first use and the pipeline is rebuilt when
/// the surface format changes.
#[derive(Default)]
pub struct CubeRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    uniform_buffer: Option<wgpu::Buffer>,

    vertex_buffer: Option<wgpu::Buffer>,
}

impl CubeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the cube at `elapsed_ms` into `target`.
    ///
    /// Color and depth are loaded, so the caller clears them first.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut DrawTarget<'_>,
        elapsed_ms: f32,
    ) -> Result<(), ShaderError> {
        self.ensure_pipeline(ctx)?;
        self.ensure_buffers(ctx);
        self.ensure_bindings(ctx);

        let uniforms = CubeUniforms::from(cube_matrices(elapsed_ms, ctx.aspect));

        let (Some(pipeline), Some(bind_group), Some(ubo), Some(vbo)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.uniform_buffer.as_ref(),
            self.vertex_buffer.as_ref(),
        ) else {
            return Ok(());
        };

        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniforms));

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("gpulab cube pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.draw(0..CUBE_VERTICES.len() as u32, 0..1);

        Ok(())
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<(), ShaderError> {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return Ok(());
        }

        // One module holds both stages; validating the vertex asset covers it,
        // the fragment entry point is checked separately.
        let shader = compile_checked(ctx.device, &assets::CUBE_VERTEX)?;
        validate_wgsl(&assets::CUBE_FRAGMENT)?;

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("gpulab cube bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<CubeUniforms>() as u64,
                            ),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("gpulab cube pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gpulab cube pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(assets::CUBE_VERTEX.entry_point()),
                compilation_options: Default::default(),
                buffers: &[CubeVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(assets::CUBE_FRAGMENT.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            // Face winding is mixed; the depth test does the hiding.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.uniform_buffer = None;
        Ok(())
    }

    fn ensure_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.vertex_buffer.is_some() {
            return;
        }

        self.vertex_buffer = Some(ctx.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("gpulab cube vbo"),
                contents: bytemuck::cast_slice(&CUBE_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.uniform_buffer.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let uniform_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpulab cube ubo"),
            size: std::mem::size_of::<CubeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gpulab cube bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        self.uniform_buffer = Some(uniform_buffer);
        self.bind_group = Some(bind_group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip_to_ndc(m: &Mat4, p: [f32; 3]) -> [f32; 3] {
        let [x, y, z, w] = m.transform([p[0], p[1], p[2], 1.0]);
        [x / w, y / w, z / w]
    }

    #[test]
    fn uniforms_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<CubeUniforms>(), 128);
        assert_eq!(std::mem::size_of::<CubeVertex>(), 24);
    }

    #[test]
    fn every_face_has_two_triangles_with_its_normal() {
        for face in CUBE_VERTICES.chunks(6) {
            let n = face[0].normal;
            assert!(face.iter().all(|v| v.normal == n));
            // All corners lie on the plane the normal points out of.
            let axis = n.iter().position(|c| *c != 0.0).unwrap();
            let plane = if n[axis] > 0.0 { 1.0 } else { 0.0 };
            assert!(face.iter().all(|v| v.position[axis] == plane));
        }
    }

    #[test]
    fn cube_centre_is_in_front_of_the_camera() {
        let m = cube_matrices(0.0, 1.0);
        let centre = clip_to_ndc(&m.mvp, [0.5, 0.5, 0.5]);
        assert!(centre[0].abs() < 1e-5 && centre[1].abs() < 1e-5);
        assert!(centre[2] > 0.0 && centre[2] < 1.0);
        // Three units down -Z in view space.
        let eye_space = m.model_view.transform_point(Vec3::new(0.5, 0.5, 0.5));
        assert!((eye_space.z + 3.0).abs() < 1e-5);
    }

    #[test]
    fn whole_cube_stays_in_the_view_volume() {
        for t in [0.0, 450.0, 1800.0, 3333.0] {
            let m = cube_matrices(t, 1.0);
            for v in CUBE_VERTICES.iter() {
                let [x, y, z] = clip_to_ndc(&m.mvp, v.position);
                assert!(x.abs() <= 1.0 && y.abs() <= 1.0, "t={t} {x} {y}");
                assert!((0.0..=1.0).contains(&z));
            }
        }
    }

    #[test]
    fn full_turn_after_3600_ms() {
        let a = cube_matrices(0.0, 1.5);
        let b = cube_matrices(3600.0, 1.5);
        for (ca, cb) in a.mvp.cols.iter().zip(b.mvp.cols.iter()) {
            for (x, y) in ca.iter().zip(cb.iter()) {
                assert!((x - y).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn wider_aspect_narrows_x() {
        let square = clip_to_ndc(&cube_matrices(0.0, 1.0).mvp, [1.0, 0.5, 0.5]);
        let wide = clip_to_ndc(&cube_matrices(0.0, 2.0).mvp, [1.0, 0.5, 0.5]);
        assert!((wide[0] - square[0] * 0.5).abs() < 1e-5);
    }
}
