//! Adapters, devices and surfaces.
//!
//! - [`GpuContext`]: headless device for the GPGPU and compute demos
//! - [`Gpu`]: device bound to a window surface, with a depth buffer

mod context;
mod gpu;
mod init;
mod surface;

pub use context::GpuContext;
pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;

pub(crate) use context::request_device;
