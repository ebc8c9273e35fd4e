//! Drivers for the gpulab demo binaries.
//!
//! Each driver takes its config and an output sink so the binaries stay
//! one-liners and the printed report can be inspected in tests.

pub mod compute;
pub mod config;
pub mod cube;
pub mod fbo;
