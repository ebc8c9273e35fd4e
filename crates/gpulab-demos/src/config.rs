use std::num::NonZeroU32;
use std::str::FromStr;

/// Side of the square FBO texture.
pub const TEX_SIZE_VAR: &str = "GPULAB_TEX_SIZE";
/// Number of repeated passes (and CPU loops) in the FBO demo.
pub const LOOPS_VAR: &str = "GPULAB_LOOPS";
/// Element count of the compute demos.
pub const DATA_SIZE_VAR: &str = "GPULAB_DATA_SIZE";
/// `wgpu` (default) or `opencl`.
pub const BACKEND_VAR: &str = "GPULAB_BACKEND";

/// Which API launches the compute kernels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Backend {
    #[default]
    Wgpu,
    OpenCl,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wgpu" => Ok(Backend::Wgpu),
            "opencl" | "ocl" | "cl" => Ok(Backend::OpenCl),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}

/// Render-to-texture sqrt demo.
#[derive(Debug, Clone, PartialEq)]
pub struct FboDemoConfig {
    pub tex_size: u32,
    pub loop_count: u32,
    /// Leading values printed before and after (all of them below 32x32).
    pub preview_len: usize,
}

impl Default for FboDemoConfig {
    fn default() -> Self {
        Self {
            tex_size: 256,
            loop_count: 1000,
            preview_len: 16,
        }
    }
}

impl FboDemoConfig {
    /// Defaults with `GPULAB_TEX_SIZE` / `GPULAB_LOOPS` applied.
    ///
    /// Both must be at least 1; zero falls back to the default.
    pub fn from_env() -> Self {
        Self::with_overrides(
            std::env::var(TEX_SIZE_VAR).ok().as_deref(),
            std::env::var(LOOPS_VAR).ok().as_deref(),
        )
    }

    fn with_overrides(tex_size: Option<&str>, loop_count: Option<&str>) -> Self {
        let d = Self::default();
        Self {
            tex_size: parse_nonzero(TEX_SIZE_VAR, tex_size, d.tex_size),
            loop_count: parse_nonzero(LOOPS_VAR, loop_count, d.loop_count),
            ..d
        }
    }
}

/// Compute-API demos (sqrt and vector add).
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeDemoConfig {
    pub data_size: usize,
    pub backend: Backend,
    /// Seed for the random sqrt input.
    pub seed: u64,
}

impl ComputeDemoConfig {
    pub const SQRT_DATA_SIZE: usize = 10_000_000;
    pub const VECTOR_ADD_DATA_SIZE: usize = 12_345_678;

    pub fn sqrt() -> Self {
        Self {
            data_size: Self::SQRT_DATA_SIZE,
            backend: Backend::default(),
            seed: 0x5EED,
        }
    }

    pub fn vector_add() -> Self {
        Self {
            data_size: Self::VECTOR_ADD_DATA_SIZE,
            ..Self::sqrt()
        }
    }

    /// Applies `GPULAB_DATA_SIZE` / `GPULAB_BACKEND` on top of `self`.
    pub fn with_env(self) -> Self {
        Self {
            data_size: env_override(DATA_SIZE_VAR, self.data_size),
            backend: env_override(BACKEND_VAR, self.backend),
            ..self
        }
    }
}

impl Default for ComputeDemoConfig {
    fn default() -> Self {
        Self::sqrt()
    }
}

/// Rotating cube window.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub clear: wgpu::Color,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            title: "Cube".to_string(),
            width: 800.0,
            height: 800.0,
            clear: wgpu::Color::BLACK,
        }
    }
}

fn env_override<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_override(key, std::env::var(key).ok().as_deref(), default)
}

fn parse_nonzero(key: &str, raw: Option<&str>, default: u32) -> u32 {
    let fallback = NonZeroU32::new(default).unwrap_or(NonZeroU32::MIN);
    parse_override(key, raw, fallback).get()
}

/// `raw` parsed as `T`; unset or unparsable values keep `default`.
fn parse_override<T>(key: &str, raw: Option<&str>, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else { return default };
    match raw.trim().parse() {
        Ok(v) => {
            log::debug!("{key}={raw}");
            v
        }
        Err(e) => {
            log::warn!("ignoring {key}={raw:?}: {e}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_demos() {
        let fbo = FboDemoConfig::default();
        assert_eq!((fbo.tex_size, fbo.loop_count, fbo.preview_len), (256, 1000, 16));
        assert_eq!(ComputeDemoConfig::sqrt().data_size, 10_000_000);
        assert_eq!(ComputeDemoConfig::vector_add().data_size, 12_345_678);
    }

    #[test]
    fn overrides_parse_or_fall_back() {
        assert_eq!(parse_override("K", Some(" 64 "), 256u32), 64);
        assert_eq!(parse_override("K", Some("huge"), 256u32), 256);
        assert_eq!(parse_override("K", Some("-1"), 256u32), 256);
        assert_eq!(parse_override("K", None, 256u32), 256);
    }

    #[test]
    fn fbo_overrides_must_be_positive() {
        let cfg = FboDemoConfig::with_overrides(Some("8"), Some("0"));
        assert_eq!((cfg.tex_size, cfg.loop_count), (8, 1000));
        let cfg = FboDemoConfig::with_overrides(Some("0"), Some("3"));
        assert_eq!((cfg.tex_size, cfg.loop_count), (256, 3));
    }

    #[test]
    fn backend_names() {
        assert_eq!("OpenCL".parse::<Backend>(), Ok(Backend::OpenCl));
        assert_eq!("wgpu".parse::<Backend>(), Ok(Backend::Wgpu));
        assert!("cuda".parse::<Backend>().is_err());
        assert_eq!(parse_override("K", Some("cuda"), Backend::Wgpu), Backend::Wgpu);
    }
}
