//! CPU reference paths and GPU/CPU comparison.

mod compare;
mod cpu;
mod preview;

pub use compare::{compare, Comparison, Tolerance};
pub use cpu::{cpu_sqrt, cpu_vector_add, repeat_cpu};
pub use preview::{preview, preview_len};
