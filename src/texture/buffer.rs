//! Pixel, height and bundle containers produced by the generators.

use crate::core::error::Error;
use crate::core::types::Result;
use crate::render::gpu::GpuTextures;

/// Square RGBA8 image, row-major, top row first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    size: u32,
    data: Vec<[u8; 4]>,
}

impl PixelBuffer {
    /// Bytes per pixel
    pub const CHANNELS: usize = 4;

    /// Create a buffer with every byte zeroed.
    pub fn new(size: u32) -> Self {
        Self::filled(size, [0, 0, 0, 0])
    }

    /// Create a buffer with every pixel set to `rgba`.
    pub fn filled(size: u32, rgba: [u8; 4]) -> Self {
        Self {
            size,
            data: vec![rgba; size as usize * size as usize],
        }
    }

    /// Width and height in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.size && y < self.size, "pixel ({}, {}) out of range", x, y);
        y as usize * self.size as usize + x as usize
    }

    /// Read the pixel at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        self.data[self.index(x, y)]
    }

    /// Write the pixel at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.index(x, y);
        self.data[i] = rgba;
    }

    /// Overwrite every pixel.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        self.data.fill(rgba);
    }

    /// Pixels, row-major.
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.data
    }

    /// Raw RGBA bytes, ready for texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Pixels of one column, top to bottom.
    pub fn column(&self, x: u32) -> Vec<[u8; 4]> {
        (0..self.size).map(|y| self.get(x, y)).collect()
    }
}

/// Square grid of heights in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    size: u32,
    data: Vec<f32>,
}

impl HeightGrid {
    /// Create a grid filled with zero.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            data: vec![0.0; size as usize * size as usize],
        }
    }

    /// Build a grid from row-major values. Values are clamped into `[0, 1]`.
    pub fn from_values(size: u32, values: Vec<f32>) -> Result<Self> {
        let expected = size as usize * size as usize;
        if values.len() != expected {
            return Err(Error::InvalidParameters(format!(
                "height grid of size {} needs {} values, got {}",
                size,
                expected,
                values.len()
            )));
        }
        let data = values.into_iter().map(clamp_height).collect();
        Ok(Self { size, data })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.size as usize + x as usize]
    }

    /// Store a height, clamped into `[0, 1]`.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, h: f32) {
        let i = y as usize * self.size as usize + x as usize;
        self.data[i] = clamp_height(h);
    }

    /// Sample with toroidal wraparound on both axes.
    #[inline]
    pub fn get_wrapped(&self, x: i64, y: i64) -> f32 {
        let n = self.size as i64;
        self.get(x.rem_euclid(n) as u32, y.rem_euclid(n) as u32)
    }

    /// All heights, row-major.
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    /// Smallest and largest stored height.
    pub fn range(&self) -> (f32, f32) {
        self.data.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
            (lo.min(h), hi.max(h))
        })
    }
}

#[inline]
fn clamp_height(h: f32) -> f32 {
    if h.is_nan() { 0.0 } else { h.clamp(0.0, 1.0) }
}

/// Color map, normal map and the height field they were derived from.
///
/// Immutable once built. GPU copies, when present, are released by the
/// owning cache through [`TextureBundle::release_gpu`].
#[derive(Debug)]
pub struct TextureBundle {
    color: PixelBuffer,
    normal: PixelBuffer,
    height: HeightGrid,
    gpu: Option<GpuTextures>,
}

impl TextureBundle {
    /// Assemble a bundle, checking that all three layers share one size.
    pub fn new(color: PixelBuffer, normal: PixelBuffer, height: HeightGrid) -> Result<Self> {
        let size = height.size();
        for actual in [color.size(), normal.size()] {
            if actual != size {
                return Err(Error::DimensionMismatch { expected: size, actual });
            }
        }
        Ok(Self { color, normal, height, gpu: None })
    }

    /// Attach GPU copies of the color and normal layers.
    pub fn with_gpu(mut self, gpu: Option<GpuTextures>) -> Self {
        self.gpu = gpu;
        self
    }

    pub fn size(&self) -> u32 {
        self.height.size()
    }

    pub fn color_buffer(&self) -> &PixelBuffer {
        &self.color
    }

    pub fn normal_buffer(&self) -> &PixelBuffer {
        &self.normal
    }

    pub fn height_grid(&self) -> &HeightGrid {
        &self.height
    }

    /// GPU textures, if the bundle was uploaded.
    pub fn gpu(&self) -> Option<&GpuTextures> {
        self.gpu.as_ref()
    }

    /// Destroy GPU copies. Safe to call more than once.
    pub fn release_gpu(&self) {
        if let Some(gpu) = &self.gpu {
            gpu.destroy();
        }
    }
}
