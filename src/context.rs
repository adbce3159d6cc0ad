//! The rendering context shared by reference with everything that talks to the GPU.
//!
//! [`Context`] owns the adapter, device, queue and the output target. The
//! target is either a window surface or, for headless runs and tests, an
//! offscreen texture of the same format family. Nothing else in the crate
//! stores a device; behaviors receive `&Context` when they need one.

use std::sync::{Arc, OnceLock};

use winit::window::Window;

use crate::error::{EngineError, Result};

/// Where finished frames end up.
#[derive(Debug)]
enum RenderTarget {
    Window {
        window: Arc<Window>,
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
    },
}

/// A frame acquired from the target, ready to be drawn into.
pub enum Frame {
    Surface(wgpu::SurfaceTexture),
    Offscreen(wgpu::Texture),
}

impl Frame {
    pub fn view(&self) -> wgpu::TextureView {
        let texture = match self {
            Frame::Surface(output) => &output.texture,
            Frame::Offscreen(texture) => texture,
        };
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn present(self) {
        if let Frame::Surface(output) = self {
            output.present();
        }
    }
}

#[derive(Debug)]
pub struct Context {
    pub(crate) adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    target: RenderTarget,
    format: wgpu::TextureFormat,
    size: (u32, u32),
    vsync: bool,
    lost: Arc<OnceLock<String>>,
}

impl Context {
    /// Creates a context presenting to `window`.
    ///
    /// The surface is not configured yet; the renderer does that on its
    /// initial resize.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();

        log::info!("Requesting GPU adapter");
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| EngineError::DeviceUnavailable(e.to_string()))?;
        let (device, queue) = request_device(&adapter).await?;

        let config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or_else(|| {
                EngineError::DeviceUnavailable("surface is not supported by the adapter".into())
            })?;
        let format = preferred_format(&surface.get_capabilities(&adapter).formats, config.format);

        let lost = watch_device_loss(&device);
        Ok(Self {
            adapter,
            device,
            queue,
            format,
            size: (config.width, config.height),
            target: RenderTarget::Window {
                window,
                surface,
                config,
            },
            vsync,
            lost,
        })
    }

    /// Creates a context that renders into an offscreen texture.
    pub async fn headless(width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| EngineError::DeviceUnavailable(e.to_string()))?;
        let (device, queue) = request_device(&adapter).await?;

        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let size = (width.max(1), height.max(1));
        let texture = offscreen_texture(&device, format, size);
        let lost = watch_device_loss(&device);
        Ok(Self {
            adapter,
            device,
            queue,
            target: RenderTarget::Offscreen { texture },
            format,
            size,
            vsync: false,
            lost,
        })
    }

    /// Colour format of the output target.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        match &self.target {
            RenderTarget::Window { window, .. } => Some(window),
            RenderTarget::Offscreen { .. } => None,
        }
    }

    /// Why the device was lost, once it has been.
    pub fn lost_reason(&self) -> Option<&str> {
        self.lost.get().map(String::as_str)
    }

    /// Applies a new output size, re-deriving the presentation format.
    pub(crate) fn reconfigure(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        match &mut self.target {
            RenderTarget::Window {
                surface, config, ..
            } => {
                let caps = surface.get_capabilities(&self.adapter);
                self.format = preferred_format(&caps.formats, self.format);
                config.format = self.format;
                config.width = width;
                config.height = height;
                config.present_mode = if self.vsync {
                    wgpu::PresentMode::AutoVsync
                } else {
                    wgpu::PresentMode::AutoNoVsync
                };
                surface.configure(&self.device, config);
            }
            RenderTarget::Offscreen { texture } => {
                texture.destroy();
                *texture = offscreen_texture(&self.device, self.format, self.size);
            }
        }
    }

    pub(crate) fn acquire_frame(&self) -> Result<Frame> {
        match &self.target {
            RenderTarget::Window { surface, .. } => {
                Ok(Frame::Surface(surface.get_current_texture()?))
            }
            RenderTarget::Offscreen { texture } => Ok(Frame::Offscreen(texture.clone())),
        }
    }

    /// The offscreen colour target, when rendering headless.
    pub fn offscreen_texture(&self) -> Option<&wgpu::Texture> {
        match &self.target {
            RenderTarget::Offscreen { texture } => Some(texture),
            RenderTarget::Window { .. } => None,
        }
    }
}

async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
    let info = adapter.get_info();
    log::info!("Using {} ({:?})", info.name, info.backend);
    let device = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("lumen device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            ..Default::default()
        })
        .await?;
    Ok(device)
}

fn watch_device_loss(device: &wgpu::Device) -> Arc<OnceLock<String>> {
    let lost = Arc::new(OnceLock::new());
    let flag = lost.clone();
    device.set_device_lost_callback(move |reason, message| {
        log::error!("GPU device lost ({reason:?}): {message}");
        let _ = flag.set(format!("{reason:?}: {message}"));
    });
    lost
}

// The shader writes linear colour, so prefer an sRGB target when there is one.
fn preferred_format(
    formats: &[wgpu::TextureFormat],
    fallback: wgpu::TextureFormat,
) -> wgpu::TextureFormat {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
        .unwrap_or(fallback)
}

fn offscreen_texture(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    (width, height): (u32, u32),
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen colour target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_formats_are_preferred() {
        let formats = [
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            preferred_format(&formats, wgpu::TextureFormat::Rgba8Unorm),
            wgpu::TextureFormat::Bgra8UnormSrgb
        );
    }

    #[test]
    fn first_format_is_used_without_srgb() {
        let formats = [wgpu::TextureFormat::Rgba16Float];
        assert_eq!(
            preferred_format(&formats, wgpu::TextureFormat::Rgba8Unorm),
            wgpu::TextureFormat::Rgba16Float
        );
        assert_eq!(
            preferred_format(&[], wgpu::TextureFormat::Rgba8Unorm),
            wgpu::TextureFormat::Rgba8Unorm
        );
    }
}
