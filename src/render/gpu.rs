//! Headless GPU device and texture uploads

use crate::core::error::Error;
use crate::texture::buffer::PixelBuffer;

/// Color and normal layers of one bundle, resident on the GPU.
#[derive(Debug)]
pub struct GpuTextures {
    pub color: wgpu::Texture,
    pub normal: wgpu::Texture,
}

impl GpuTextures {
    /// Free the GPU memory. Repeated calls are no-ops.
    pub fn destroy(&self) {
        self.color.destroy();
        self.normal.destroy();
    }
}

/// Headless wgpu device used for uploads
pub struct GpuDevice {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuDevice {
    /// Create a device without a surface, blocking until the adapter answers.
    pub fn new_headless() -> Result<Self, Error> {
        pollster::block_on(Self::request())
    }

    async fn request() -> Result<Self, Error> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .map_err(|e| Error::Gpu(format!("No suitable adapter found: {:?}", e)))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("planetex_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| Error::Gpu(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("GPU device ready: {} ({:?})", info.name, info.backend);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Upload the color and normal layers as `Rgba8Unorm` textures.
    pub fn upload(&self, label: &str, color: &PixelBuffer, normal: &PixelBuffer) -> GpuTextures {
        let color = self.upload_rgba(&format!("{}_color", label), color);
        let normal = self.upload_rgba(&format!("{}_normal", label), normal);
        self.queue.submit(std::iter::empty());
        GpuTextures { color, normal }
    }

    fn upload_rgba(&self, label: &str, pixels: &PixelBuffer) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width: pixels.size(),
            height: pixels.size(),
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(pixels.size() * PixelBuffer::CHANNELS as u32),
                rows_per_image: Some(pixels.size()),
            },
            size,
        );

        texture
    }
}
