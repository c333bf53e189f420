/// Which adapter class to request.
///
/// Hosts try `Hardware` first and fall back to `Software` when no usable
/// hardware device exists (headless CI, remote desktops, broken drivers).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AdapterChoice {
    Hardware,
    Software,
}

impl AdapterChoice {
    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            AdapterChoice::Hardware => "hardware",
            AdapterChoice::Software => "software",
        }
    }
}

/// Initialization parameters for the offscreen GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct OffscreenInit {
    /// Color format of render targets.
    ///
    /// Must be a 4-byte format so readback rows map to RGBA8 pixels.
    pub format: wgpu::TextureFormat,

    /// Backends the instance may use.
    pub backends: wgpu::Backends,

    /// Power preference passed to adapter selection for `AdapterChoice::Hardware`.
    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    ///
    /// Downlevel defaults keep software rasterizers eligible.
    pub required_limits: wgpu::Limits,

    /// Upper bound on a single readback wait.
    pub readback_timeout: std::time::Duration,
}

impl Default for OffscreenInit {
    fn default() -> Self {
        Self {
            format: wgpu::TextureFormat::Rgba8Unorm,
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            readback_timeout: std::time::Duration::from_secs(2),
        }
    }
}
