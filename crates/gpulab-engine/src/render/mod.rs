//! Windowed rendering.
//!
//! Renderers own their GPU resources and build pipelines lazily for the
//! surface format they are first asked to draw into.

mod ctx;
mod cube;

pub use ctx::{DrawTarget, RenderCtx};
pub use cube::{cube_matrices, CubeMatrices, CubeRenderer, CubeVertex, CUBE_VERTICES};
