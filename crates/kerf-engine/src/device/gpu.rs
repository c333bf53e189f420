use anyhow::{Context, Result};

use super::{AdapterChoice, OffscreenInit};

/// Owns wgpu core objects for offscreen rendering.
///
/// This type is the low-level rendering context:
/// - creates and stores Instance/Adapter/Device/Queue
/// - records which adapter class was obtained, for diagnostics
/// - creates command encoders for offscreen passes
///
/// Every method must be called from the thread that owns the context; the
/// type is deliberately not shared.
pub struct GpuContext {
    /// Kept alive for the lifetime of the adapter.
    _instance: wgpu::Instance,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Render target color format.
    format: wgpu::TextureFormat,

    /// Adapter class that was requested and obtained.
    choice: AdapterChoice,

    readback_timeout: std::time::Duration,
}

/// One frame worth of recorded commands targeting an offscreen view.
pub struct GpuFrame<'t> {
    pub view: &'t wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuContext {
    /// Creates an offscreen GPU context of the requested adapter class.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: &OffscreenInit, choice: AdapterChoice) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let (power_preference, force_fallback_adapter) = match choice {
            AdapterChoice::Hardware => (init.power_preference, false),
            AdapterChoice::Software => (wgpu::PowerPreference::LowPower, true),
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .with_context(|| format!("no {} GPU adapter available", choice.label()))?;

        let info = adapter.get_info();
        if choice == AdapterChoice::Hardware && info.device_type == wgpu::DeviceType::Cpu {
            anyhow::bail!("adapter {:?} is a CPU rasterizer, not a hardware device", info.name);
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("kerf-engine device"),
                required_features: init.required_features,
                required_limits: init
                    .required_limits
                    .clone()
                    .using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        log::info!(
            "gpu context ready: {} adapter {:?} ({:?}, {:?})",
            choice.label(),
            info.name,
            info.backend,
            info.device_type
        );

        Ok(Self {
            _instance: instance,
            adapter,
            device,
            queue,
            format: init.format,
            choice,
            readback_timeout: init.readback_timeout,
        })
    }

    /// Blocking variant of [`GpuContext::new`].
    pub fn new_blocking(init: &OffscreenInit, choice: AdapterChoice) -> Result<Self> {
        pollster::block_on(Self::new(init, choice))
    }

    /// Returns the render target format.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Returns which adapter class backs this context.
    pub fn choice(&self) -> AdapterChoice {
        self.choice
    }

    /// Vendor/renderer/driver description of the adapter.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn readback_timeout(&self) -> std::time::Duration {
        self.readback_timeout
    }

    /// Creates an encoder recording into `view`.
    pub fn begin_frame<'t>(&self, view: &'t wgpu::TextureView) -> GpuFrame<'t> {
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kerf frame encoder"),
            });

        GpuFrame { view, encoder }
    }

    /// Submits the recorded commands for the given frame.
    pub fn submit(&self, frame: GpuFrame<'_>) -> wgpu::SubmissionIndex {
        self.queue.submit(std::iter::once(frame.encoder.finish()))
    }
}
