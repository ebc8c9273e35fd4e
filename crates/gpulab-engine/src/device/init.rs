/// Initialization parameters for the GPU layer.
///
/// Shared by the headless [`GpuContext`](super::GpuContext) and the windowed
/// [`Gpu`](super::Gpu). Surface-only fields are ignored by the headless path.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends wgpu may pick from.
    pub backends: wgpu::Backends,

    /// Adapter preference. The GPGPU demos want the discrete GPU when there is one.
    pub power_preference: wgpu::PowerPreference,

    /// Force the software fallback adapter (useful on CI machines without a GPU).
    pub force_fallback_adapter: bool,

    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is broadly supported; the cube demo is vsync-bound with it.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    ///
    /// `None` requests the adapter's own limits, which the compute demos need
    /// for their large storage buffers.
    pub required_limits: Option<wgpu::Limits>,

    /// Desired maximum frame latency for the surface. This value is a hint.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: None,
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Resolves the limits to request from `adapter`.
    pub(crate) fn limits_for(&self, adapter: &wgpu::Adapter) -> wgpu::Limits {
        self.required_limits
            .clone()
            .unwrap_or_else(|| adapter.limits())
    }
}
