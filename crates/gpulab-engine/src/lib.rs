//! GPU teaching demos engine.
//!
//! Headless pieces (`gpgpu`, `compute`, `verify`) run the data-parallel
//! demos; `window`, `core` and `render` drive the rotating cube.

pub mod device;
pub mod logging;
pub mod time;

pub mod compute;
pub mod gpgpu;
pub mod shader;
pub mod verify;

pub mod core;
pub mod math;
pub mod render;
pub mod window;
