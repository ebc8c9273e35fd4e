use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::device::GpuContext;

use super::{ComputeBuffer, CHANNELS};

/// Texel format of every render target: four 32-bit floats.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

const BYTES_PER_TEXEL: u32 = (CHANNELS * std::mem::size_of::<f32>()) as u32;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("render target extent {width}x{height} has a zero side")]
    ZeroExtent { width: u32, height: u32 },

    #[error("render target extent {width}x{height} exceeds the device maximum of {max}")]
    ExceedsDeviceLimit { width: u32, height: u32, max: u32 },

    #[error("payload holds {actual} floats, expected {expected}")]
    PayloadLength { expected: usize, actual: usize },

    #[error("{0:?} is not renderable on this adapter")]
    UnsupportedFormat(wgpu::TextureFormat),
}

/// Checks a requested extent against the device's 2D texture limit.
pub fn validate_extent(width: u32, height: u32, max_dimension: u32) -> Result<(), TargetError> {
    if width == 0 || height == 0 {
        return Err(TargetError::ZeroExtent { width, height });
    }
    if width > max_dimension || height > max_dimension {
        return Err(TargetError::ExceedsDeviceLimit {
            width,
            height,
            max: max_dimension,
        });
    }
    Ok(())
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Off-screen float render target: the texture a pass samples from or draws into.
///
/// Texels are read with nearest filtering and clamped addressing (see
/// [`FragmentKernel`](super::FragmentKernel)); there is a single mip level.
/// GPU memory is released when the target is dropped.
#[derive(Debug)]
pub struct RenderTarget {
    id: u64,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Allocates a `width x height` target.
    ///
    /// With `payload = None` the texture is zero-initialized. A payload must
    /// hold exactly `width * height * 4` floats in RGBA row-major order.
    pub fn new(
        ctx: &GpuContext,
        width: u32,
        height: u32,
        payload: Option<&[f32]>,
    ) -> Result<Self, TargetError> {
        validate_extent(width, height, ctx.limits().max_texture_dimension_2d)?;

        if let Some(data) = payload {
            let expected = ComputeBuffer::element_count(width, height);
            if data.len() != expected {
                return Err(TargetError::PayloadLength {
                    expected,
                    actual: data.len(),
                });
            }
        }

        if !ctx.supports_render_attachment(TARGET_FORMAT) {
            return Err(TargetError::UnsupportedFormat(TARGET_FORMAT));
        }

        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let label = format!("gpulab render target #{id}");
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = ctx.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        if let Some(data) = payload {
            ctx.queue().write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                bytemuck::cast_slice(data),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(width * BYTES_PER_TEXEL),
                    rows_per_image: Some(height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("created {label} ({width}x{height}, initialized: {})", payload.is_some());

        Ok(Self {
            id,
            texture,
            view,
            width,
            height,
        })
    }

    /// Allocates a target holding `buffer`.
    pub fn from_buffer(ctx: &GpuContext, buffer: &ComputeBuffer) -> Result<Self, TargetError> {
        Self::new(ctx, buffer.width(), buffer.height(), Some(buffer.as_slice()))
    }

    /// Process-unique id; two targets alias only if their ids match.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of `f32` elements this target stores.
    pub fn element_count(&self) -> usize {
        ComputeBuffer::element_count(self.width, self.height)
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub(crate) fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    pub(crate) fn bytes_per_row(&self) -> u32 {
        self.width * BYTES_PER_TEXEL
    }
}
