//! Kernels and shaders shipped with the engine.

use super::{ShaderAsset, SourceLanguage, Stage};

/// Full-viewport quad feeding every fragment kernel.
pub const QUAD_VERTEX: ShaderAsset = ShaderAsset::embedded(
    "quad.vert.wgsl",
    include_str!("../../shaders/quad.vert.wgsl"),
    "vs_main",
    Stage::Vertex,
    SourceLanguage::Wgsl,
);

pub const SQRT_FRAGMENT: ShaderAsset = ShaderAsset::embedded(
    "sqrt.frag.wgsl",
    include_str!("../../shaders/sqrt.frag.wgsl"),
    "fs_main",
    Stage::Fragment,
    SourceLanguage::Wgsl,
);

/// `a + b` over two input textures.
pub const ADD_FRAGMENT: ShaderAsset = ShaderAsset::embedded(
    "add.frag.wgsl",
    include_str!("../../shaders/add.frag.wgsl"),
    "fs_main",
    Stage::Fragment,
    SourceLanguage::Wgsl,
);

pub const SQRT_COMPUTE: ShaderAsset = ShaderAsset::embedded(
    "sqrt.comp.wgsl",
    include_str!("../../shaders/sqrt.comp.wgsl"),
    "sqrt_kernel",
    Stage::Compute,
    SourceLanguage::Wgsl,
);

pub const VECTOR_ADD_COMPUTE: ShaderAsset = ShaderAsset::embedded(
    "vector_add.comp.wgsl",
    include_str!("../../shaders/vector_add.comp.wgsl"),
    "vector_add",
    Stage::Compute,
    SourceLanguage::Wgsl,
);

pub const SQRT_OPENCL: ShaderAsset = ShaderAsset::embedded(
    "sqrt.cl",
    include_str!("../../shaders/sqrt.cl"),
    "sqrt_kernel",
    Stage::Compute,
    SourceLanguage::OpenCl,
);

pub const VECTOR_ADD_OPENCL: ShaderAsset = ShaderAsset::embedded(
    "vector_add.cl",
    include_str!("../../shaders/vector_add.cl"),
    "vector_add",
    Stage::Compute,
    SourceLanguage::OpenCl,
);

/// Vertex + fragment stages of the cube demo (one module).
pub const CUBE_VERTEX: ShaderAsset = ShaderAsset::embedded(
    "cube.wgsl",
    include_str!("../../shaders/cube.wgsl"),
    "vs_main",
    Stage::Vertex,
    SourceLanguage::Wgsl,
);

pub const CUBE_FRAGMENT: ShaderAsset = ShaderAsset::embedded(
    "cube.wgsl",
    include_str!("../../shaders/cube.wgsl"),
    "fs_main",
    Stage::Fragment,
    SourceLanguage::Wgsl,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::validate_wgsl;

    #[test]
    fn embedded_wgsl_assets_validate() {
        for asset in [
            &QUAD_VERTEX,
            &SQRT_FRAGMENT,
            &ADD_FRAGMENT,
            &SQRT_COMPUTE,
            &VECTOR_ADD_COMPUTE,
            &CUBE_VERTEX,
            &CUBE_FRAGMENT,
        ] {
            if let Err(e) = validate_wgsl(asset) {
                panic!("{e}");
            }
        }
    }

    #[test]
    fn opencl_assets_name_their_entry_points() {
        for asset in [&SQRT_OPENCL, &VECTOR_ADD_OPENCL] {
            let decl = format!("void {}(", asset.entry_point());
            assert!(asset.source().contains(&decl), "{}", asset.name());
        }
    }
}
