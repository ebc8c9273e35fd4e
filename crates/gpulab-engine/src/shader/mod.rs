//! Shader and kernel sources.
//!
//! Sources are asset files under `shaders/`. They are either embedded at build
//! time (the constants in [`assets`]) or loaded from disk at runtime. WGSL
//! assets are validated before a wgpu module is created, so a broken kernel is
//! reported as a [`ShaderError`] instead of being used.

mod asset;
pub mod assets;
mod compile;
mod error;

pub use asset::{ShaderAsset, SourceLanguage, Stage};
pub use compile::{compile_checked, validate_wgsl};
pub use error::ShaderError;
