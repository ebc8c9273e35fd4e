//! Render-to-texture GPGPU.
//!
//! The pre-compute-shader way of running data-parallel work: an array lives
//! in a float texture, a fragment shader is the kernel, and drawing one
//! viewport-sized quad into another texture runs it once per element.
//!
//! - [`RenderTarget`]: float texture usable as both pass input and output
//! - [`FragmentKernel`]: draws the quad with a fragment kernel
//! - [`read_target`]: copies a target back into a [`ComputeBuffer`]

mod buffer;
mod pass;
mod readback;
mod target;

pub use buffer::{ComputeBuffer, CHANNELS};
pub use pass::{FragmentKernel, PassError};
pub use readback::{read_target, ReadbackError};
pub use target::{validate_extent, RenderTarget, TargetError, TARGET_FORMAT};

pub(crate) use readback::map_read;
