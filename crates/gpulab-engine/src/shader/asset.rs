use std::borrow::Cow;
use std::path::Path;

use super::ShaderError;

/// Pipeline stage an asset's entry point runs in.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Stage {
    Vertex,
    Fragment,
    Compute,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SourceLanguage {
    Wgsl,
    OpenCl,
}

impl SourceLanguage {
    /// Infers the language from a file extension (`.wgsl`, `.cl`).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "wgsl" => Some(Self::Wgsl),
            "cl" => Some(Self::OpenCl),
            _ => None,
        }
    }
}

/// A named shader or kernel source with the entry point a pipeline should use.
#[derive(Debug, Clone)]
pub struct ShaderAsset {
    name: Cow<'static, str>,
    source: Cow<'static, str>,
    entry_point: Cow<'static, str>,
    stage: Stage,
    language: SourceLanguage,
}

impl ShaderAsset {
    /// An asset compiled into the binary (see [`super::assets`]).
    pub const fn embedded(
        name: &'static str,
        source: &'static str,
        entry_point: &'static str,
        stage: Stage,
        language: SourceLanguage,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            source: Cow::Borrowed(source),
            entry_point: Cow::Borrowed(entry_point),
            stage,
            language,
        }
    }

    /// Loads an asset from disk. The language comes from the file extension,
    /// falling back to WGSL.
    pub fn from_path(
        path: impl AsRef<Path>,
        entry_point: impl Into<String>,
        stage: Stage,
    ) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("loaded {} ({} bytes)", path.display(), source.len());

        Ok(Self {
            name: Cow::Owned(path.display().to_string()),
            source: Cow::Owned(source),
            entry_point: Cow::Owned(entry_point.into()),
            stage,
            language: SourceLanguage::from_path(path).unwrap_or(SourceLanguage::Wgsl),
        })
    }

    /// Builds an asset from an in-memory string (tests, generated kernels).
    pub fn from_source(
        name: impl Into<String>,
        source: impl Into<String>,
        entry_point: impl Into<String>,
        stage: Stage,
    ) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            source: Cow::Owned(source.into()),
            entry_point: Cow::Owned(entry_point.into()),
            stage,
            language: SourceLanguage::Wgsl,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_extension() {
        assert_eq!(SourceLanguage::from_path(Path::new("a/sqrt.cl")), Some(SourceLanguage::OpenCl));
        assert_eq!(SourceLanguage::from_path(Path::new("quad.vert.wgsl")), Some(SourceLanguage::Wgsl));
        assert_eq!(SourceLanguage::from_path(Path::new("noext")), None);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ShaderAsset::from_path("does/not/exist.wgsl", "main", Stage::Compute).unwrap_err();
        assert!(matches!(err, ShaderError::Io { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("gpulab-asset-{}.cl", std::process::id()));
        std::fs::write(&path, "__kernel void k() {}").unwrap();

        let asset = ShaderAsset::from_path(&path, "k", Stage::Compute).unwrap();
        assert_eq!(asset.language(), SourceLanguage::OpenCl);
        assert_eq!(asset.entry_point(), "k");
        assert!(asset.source().contains("__kernel"));

        std::fs::remove_file(&path).unwrap();
    }
}
