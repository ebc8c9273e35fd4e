//! Timing utilities.
//!
//! - `FrameClock` drives animation in windowed demos (one per window)
//! - `FpsCounter` reports frames per second about once a second
//! - `Stopwatch` measures the GPU and CPU paths of the compute demos

mod fps;
mod frame_clock;
mod stopwatch;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
pub use stopwatch::Stopwatch;
