use std::sync::mpsc;

use thiserror::Error;

use crate::device::GpuContext;

use super::{ComputeBuffer, RenderTarget};

#[derive(Debug, Error)]
pub enum ReadbackError {
    #[error("waiting for the device failed")]
    Poll(#[from] wgpu::PollError),

    #[error("mapping the readback buffer failed")]
    Map(#[from] wgpu::BufferAsyncError),

    #[error("map callback was dropped before it ran")]
    CallbackDropped,
}

/// Copies `target` into host memory.
///
/// Blocks until every pass submitted so far has finished, so the data
/// reflects all prior work on `target`.
pub fn read_target(ctx: &GpuContext, target: &RenderTarget) -> Result<ComputeBuffer, ReadbackError> {
    let unpadded = target.bytes_per_row();
    let padded = padded_bytes_per_row(unpadded);
    let height = target.height();

    let staging = ctx.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("gpulab readback buffer"),
        size: padded as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("gpulab readback encoder"),
        });

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: target.texture(),
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        target.extent(),
    );
    ctx.queue().submit(std::iter::once(encoder.finish()));

    let bytes = map_read(ctx, &staging)?;
    let data = unpad_rows(&bytes, unpadded as usize, padded as usize, height as usize);

    Ok(ComputeBuffer::from_raw(target.width(), target.height(), data))
}

/// Maps a `MAP_READ` buffer after waiting for the device, and copies it out.
pub(crate) fn map_read(ctx: &GpuContext, buffer: &wgpu::Buffer) -> Result<Vec<u8>, ReadbackError> {
    let slice = buffer.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |res| {
        // The receiver only disappears if the caller already bailed out.
        let _ = tx.send(res);
    });

    ctx.device().poll(wgpu::PollType::wait_indefinitely())?;
    rx.recv().map_err(|_| ReadbackError::CallbackDropped)??;

    let bytes = slice.get_mapped_range().to_vec();
    buffer.unmap();
    Ok(bytes)
}

/// Rounds a row up to `COPY_BYTES_PER_ROW_ALIGNMENT`, as texture copies require.
pub(crate) fn padded_bytes_per_row(unpadded: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drops the per-row padding of a texture copy and decodes the floats.
fn unpad_rows(bytes: &[u8], unpadded: usize, padded: usize, rows: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(unpadded / 4 * rows);
    for row in bytes.chunks(padded).take(rows) {
        out.extend(
            row[..unpadded]
                .chunks_exact(4)
                .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]])),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_256() {
        assert_eq!(padded_bytes_per_row(16), 256);
        assert_eq!(padded_bytes_per_row(256), 256);
        assert_eq!(padded_bytes_per_row(4096), 4096);
        assert_eq!(padded_bytes_per_row(4112), 4352);
    }

    #[test]
    fn unpad_strips_row_tails() {
        // Two rows of one texel each, padded to 32 bytes.
        let mut bytes = vec![0xAAu8; 64];
        for (i, v) in [1.0f32, 2.0, 3.0, 4.0].iter().enumerate() {
            bytes[i * 4..i * 4 + 4].copy_from_slice(&v.to_ne_bytes());
        }
        for (i, v) in [5.0f32, 6.0, 7.0, 8.0].iter().enumerate() {
            bytes[32 + i * 4..32 + i * 4 + 4].copy_from_slice(&v.to_ne_bytes());
        }

        let out = unpad_rows(&bytes, 16, 32, 2);
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }
}
