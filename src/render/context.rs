//! Rendering context shared by the parametric generators
//!
//! One context is created per factory and reused by every category. It owns
//! the optional GPU device and runs fragment programs into fresh targets,
//! which become the layers of the finished bundle.

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, Vec2};
use crate::math::SphericalProjector;
use crate::math::blend::unit_to_byte;
use crate::texture::buffer::{HeightGrid, PixelBuffer};
use super::gpu::{GpuDevice, GpuTextures};
use super::program::FragmentProgram;

/// Which backend the context runs on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackend {
    /// CPU only. Always available.
    #[default]
    Software,
    /// Headless wgpu device. Shading stays on the CPU so results are
    /// bit-identical across machines; finished layers can be uploaded.
    Wgpu,
}

/// Color and relief produced by one pass.
#[derive(Clone, Debug)]
pub struct RenderTarget {
    pub color: PixelBuffer,
    pub height: HeightGrid,
}

impl RenderTarget {
    fn new(size: u32) -> Self {
        Self {
            color: PixelBuffer::new(size),
            height: HeightGrid::new(size),
        }
    }

    pub fn size(&self) -> u32 {
        self.height.size()
    }
}

/// Shared rendering context.
///
/// Not meant to be driven from several threads at once; the factory keeps
/// it behind a lock.
pub struct RenderContext {
    backend: RenderBackend,
    gpu: Option<GpuDevice>,
    passes: u64,
    disposed: bool,
}

impl RenderContext {
    /// Create a context. Fails with [`Error::Gpu`] if a GPU backend was
    /// requested and no compatible adapter exists.
    pub fn new(backend: RenderBackend) -> Result<Self> {
        let gpu = match backend {
            RenderBackend::Software => None,
            RenderBackend::Wgpu => Some(GpuDevice::new_headless()?),
        };
        log::info!("Rendering context created ({:?} backend)", backend);
        Ok(Self {
            backend,
            gpu,
            passes: 0,
            disposed: false,
        })
    }

    /// CPU-only context. Cannot fail.
    pub fn software() -> Self {
        Self {
            backend: RenderBackend::Software,
            gpu: None,
            passes: 0,
            disposed: false,
        }
    }

    pub fn backend(&self) -> RenderBackend {
        self.backend
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Number of passes rendered so far.
    pub fn passes_rendered(&self) -> u64 {
        self.passes
    }

    /// Whether finished layers can be uploaded to GPU textures.
    pub fn has_gpu(&self) -> bool {
        self.gpu.is_some()
    }

    /// Evaluate `program` over every texel of a new `size`×`size` target.
    ///
    /// The target is handed to the caller, which keeps its layers.
    pub fn render(&mut self, program: &dyn FragmentProgram, size: u32) -> Result<RenderTarget> {
        if self.disposed {
            return Err(Error::Disposed);
        }

        let start = std::time::Instant::now();
        let mut target = RenderTarget::new(size);
        for py in 0..size {
            for px in 0..size {
                let (u, v) = SphericalProjector::pixel_uv(px, py, size);
                let frag = program.shade(Vec2::new(u, v));
                let [r, g, b] = frag.color;
                target.color.set(px, py, [unit_to_byte(r), unit_to_byte(g), unit_to_byte(b), 255]);
                target.height.set(px, py, frag.height);
            }
        }

        self.passes += 1;

        log::debug!(
            "Rendered '{}' pass {}x{} in {:.1}ms",
            program.label(),
            size,
            size,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(target)
    }

    /// Upload layers to the GPU when a device is present.
    pub fn upload(&self, label: &str, color: &PixelBuffer, normal: &PixelBuffer) -> Result<Option<GpuTextures>> {
        if self.disposed {
            return Err(Error::Disposed);
        }
        Ok(self.gpu.as_ref().map(|gpu| gpu.upload(label, color, normal)))
    }

    /// Release the device. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.gpu = None;
        self.disposed = true;
        log::info!("Rendering context disposed after {} passes", self.passes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::program::Fragment;

    struct Gradient;

    impl FragmentProgram for Gradient {
        fn label(&self) -> &str {
            "gradient"
        }

        fn shade(&self, uv: Vec2) -> Fragment {
            Fragment::new([uv.x, uv.y, 0.0], uv.y)
        }
    }

    #[test]
    fn test_render_gradient() {
        let mut ctx = RenderContext::software();
        let out = ctx.render(&Gradient, 4).unwrap();
        assert_eq!(out.size(), 4);
        assert_eq!(out.color.get(0, 0), [0, 0, 0, 255]);
        assert_eq!(out.color.get(3, 3), [255, 255, 0, 255]);
        assert_eq!(out.height.get(0, 3), 1.0);
        assert_eq!(ctx.passes_rendered(), 1);
    }

    #[test]
    fn test_context_reused_across_passes() {
        let mut ctx = RenderContext::software();
        let mut first = ctx.render(&Gradient, 8).unwrap();
        let second = ctx.render(&Gradient, 8).unwrap();
        let third = ctx.render(&Gradient, 16).unwrap();
        assert_eq!(ctx.passes_rendered(), 3);
        assert_eq!(third.size(), 16);

        // Targets are owned by the caller and independent of later passes.
        first.color.fill([1, 2, 3, 4]);
        assert_eq!(second.color.get(7, 7), [255, 255, 0, 255]);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut ctx = RenderContext::software();
        ctx.render(&Gradient, 4).unwrap();
        ctx.dispose();
        ctx.dispose();
        assert!(ctx.is_disposed());
        assert!(!ctx.has_gpu());
        assert!(matches!(ctx.render(&Gradient, 4), Err(Error::Disposed)));
        assert!(matches!(
            ctx.upload("x", &PixelBuffer::new(1), &PixelBuffer::new(1)),
            Err(Error::Disposed)
        ));
    }

    #[test]
    fn test_software_upload_is_none() {
        let ctx = RenderContext::new(RenderBackend::Software).unwrap();
        assert!(!ctx.has_gpu());
        assert!(ctx.upload("x", &PixelBuffer::new(2), &PixelBuffer::new(2)).unwrap().is_none());
    }

    #[test]
    fn test_wgpu_backend_initializes_or_reports_gpu_error() {
        match RenderContext::new(RenderBackend::Wgpu) {
            Ok(ctx) => {
                assert!(ctx.has_gpu());
                let tex = ctx.upload("probe", &PixelBuffer::new(4), &PixelBuffer::new(4)).unwrap();
                let tex = tex.expect("wgpu context should upload");
                tex.destroy();
                tex.destroy();
            }
            Err(Error::Gpu(_)) => {}
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_backend_serde() {
        let b: RenderBackend = serde_json::from_str("\"wgpu\"").unwrap();
        assert_eq!(b, RenderBackend::Wgpu);
    }
}
