use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::{ShaderAsset, ShaderError, SourceLanguage, Stage};

/// Parses and validates a WGSL asset, and checks that its entry point exists
/// in the asset's stage.
pub fn validate_wgsl(asset: &ShaderAsset) -> Result<naga::Module, ShaderError> {
    if asset.language() != SourceLanguage::Wgsl {
        return Err(ShaderError::WrongLanguage {
            name: asset.name().to_string(),
            language: asset.language(),
        });
    }

    let source = asset.source();
    let module = naga::front::wgsl::parse_str(source).map_err(|e| {
        let (line, column) = e
            .location(source)
            .map_or((0, 0), |l| (l.line_number, l.line_position));
        ShaderError::Compile {
            name: asset.name().to_string(),
            line,
            column,
            message: e.message().to_string(),
        }
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| {
            let (line, column) = e
                .location(source)
                .map_or((0, 0), |l| (l.line_number, l.line_position));
            ShaderError::Compile {
                name: asset.name().to_string(),
                line,
                column,
                message: e.as_inner().to_string(),
            }
        })?;

    let stage = naga_stage(asset.stage());
    let found = module
        .entry_points
        .iter()
        .any(|ep| ep.name == asset.entry_point() && ep.stage == stage);
    if !found {
        return Err(ShaderError::MissingEntryPoint {
            name: asset.name().to_string(),
            entry_point: asset.entry_point().to_string(),
            stage: asset.stage(),
        });
    }

    Ok(module)
}

/// Validates `asset` and creates a wgpu shader module from it.
///
/// wgpu reports invalid WGSL through the device's uncaptured-error handler,
/// which by default panics later. Validating first keeps a broken kernel
/// from ever reaching a pipeline.
pub fn compile_checked(
    device: &wgpu::Device,
    asset: &ShaderAsset,
) -> Result<wgpu::ShaderModule, ShaderError> {
    validate_wgsl(asset)?;

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(asset.name()),
        source: wgpu::ShaderSource::Wgsl(asset.source().into()),
    });

    log::debug!("compiled {} ({})", asset.name(), asset.entry_point());
    Ok(module)
}

fn naga_stage(stage: Stage) -> naga::ShaderStage {
    match stage {
        Stage::Vertex => naga::ShaderStage::Vertex,
        Stage::Fragment => naga::ShaderStage::Fragment,
        Stage::Compute => naga::ShaderStage::Compute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "
@compute @workgroup_size(1)
fn main() {}
";

    #[test]
    fn accepts_valid_kernel() {
        let asset = ShaderAsset::from_source("good", GOOD, "main", Stage::Compute);
        assert!(validate_wgsl(&asset).is_ok());
    }

    #[test]
    fn syntax_error_reports_location() {
        let src = "@compute @workgroup_size(1)\nfn main() {\n    let x = ;\n}\n";
        let asset = ShaderAsset::from_source("broken", src, "main", Stage::Compute);
        match validate_wgsl(&asset) {
            Err(ShaderError::Compile { name, line, .. }) => {
                assert_eq!(name, "broken");
                assert_eq!(line, 3);
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn type_error_is_rejected() {
        let src = "
@group(0) @binding(0) var<storage, read_write> out: array<f32>;
@compute @workgroup_size(1)
fn main() {
    out[0] = vec2<f32>(1.0, 2.0);
}
";
        let asset = ShaderAsset::from_source("typed", src, "main", Stage::Compute);
        assert!(matches!(validate_wgsl(&asset), Err(ShaderError::Compile { .. })));
    }

    #[test]
    fn missing_entry_point_is_rejected() {
        let asset = ShaderAsset::from_source("good", GOOD, "not_there", Stage::Compute);
        assert!(matches!(
            validate_wgsl(&asset),
            Err(ShaderError::MissingEntryPoint { .. })
        ));
    }

    #[test]
    fn entry_point_in_wrong_stage_is_rejected() {
        let asset = ShaderAsset::from_source("good", GOOD, "main", Stage::Fragment);
        assert!(matches!(
            validate_wgsl(&asset),
            Err(ShaderError::MissingEntryPoint { stage: Stage::Fragment, .. })
        ));
    }

    #[test]
    fn opencl_source_is_not_wgsl() {
        let asset = crate::shader::assets::SQRT_OPENCL;
        assert!(matches!(
            validate_wgsl(&asset),
            Err(ShaderError::WrongLanguage { .. })
        ));
    }
}
