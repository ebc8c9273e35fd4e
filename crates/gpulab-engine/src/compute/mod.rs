//! True compute-API kernel launches.
//!
//! Where [`gpgpu`](crate::gpgpu) borrows the raster pipeline, this module uses
//! a real compute pipeline: create context → compile source → bind arguments →
//! dispatch → read back. [`ComputeKernel`] runs WGSL kernels through wgpu; with
//! the `opencl` feature, [`opencl::OclKernel`] launches the same kernels
//! written in OpenCL C.

mod kernel;
#[cfg(feature = "opencl")]
pub mod opencl;

use thiserror::Error;

use crate::gpgpu::ReadbackError;
use crate::shader::ShaderError;

pub use kernel::ComputeKernel;

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("kernel takes {expected} input array(s), got {actual}")]
    InputCount { expected: usize, actual: usize },

    #[error("kernel inputs are empty")]
    Empty,

    #[error("input {index} holds {actual} elements, input 0 holds {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{bytes} byte buffer exceeds the device limit of {max} bytes")]
    TooLarge { bytes: u64, max: u64 },

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Readback(#[from] ReadbackError),

    #[cfg(feature = "opencl")]
    #[error("OpenCL: {0}")]
    OpenCl(String),
}

/// Checks the argument arrays of a launch and returns their common length.
pub(crate) fn validate_inputs(inputs: &[&[f32]], expected: usize) -> Result<usize, ComputeError> {
    if inputs.len() != expected {
        return Err(ComputeError::InputCount {
            expected,
            actual: inputs.len(),
        });
    }

    let len = inputs.first().map_or(0, |a| a.len());
    if len == 0 {
        return Err(ComputeError::Empty);
    }

    for (index, input) in inputs.iter().enumerate().skip(1) {
        if input.len() != len {
            return Err(ComputeError::LengthMismatch {
                index,
                expected: len,
                actual: input.len(),
            });
        }
    }

    Ok(len)
}

/// Lays `total_groups` workgroups out as an (x, y) grid, keeping x within `limit`.
pub(crate) fn split_workgroups(total_groups: u32, limit: u32) -> (u32, u32) {
    if total_groups <= limit {
        (total_groups, 1)
    } else {
        (limit, total_groups.div_ceil(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_fits_in_one_row() {
        assert_eq!(split_workgroups(100, 65535), (100, 1));
        assert_eq!(split_workgroups(65535, 65535), (65535, 1));
    }

    #[test]
    fn split_wraps_into_rows() {
        let (x, y) = split_workgroups(65536, 65535);
        assert_eq!((x, y), (65535, 2));
        assert!(x * y >= 65536);
    }

    #[test]
    fn inputs_must_match_arity() {
        let a = [1.0f32; 4];
        assert!(matches!(
            validate_inputs(&[&a], 2),
            Err(ComputeError::InputCount {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn inputs_must_share_length() {
        let a = [1.0f32; 4];
        let b = [1.0f32; 3];
        assert!(matches!(
            validate_inputs(&[&a, &b], 2),
            Err(ComputeError::LengthMismatch { index: 1, .. })
        ));
        assert_eq!(validate_inputs(&[&a, &a], 2).unwrap(), 4);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let a: [f32; 0] = [];
        assert!(matches!(validate_inputs(&[&a], 1), Err(ComputeError::Empty)));
    }
}
