//! Texture factory: one entry point per celestial category
//!
//! Terrestrial-like bodies run through [`TerrainTextureBuilder`]. Gas giants,
//! stars and rocks are shaded by the pooled [`RenderContext`], which all
//! categories share behind a lock. Every category has its own
//! [`TextureCache`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::celestial::{
    BodyCategory, BodyParameters, GasGiantParameters, ParametricSurface, RockParameters,
    StarParameters,
};
use crate::config::FactoryConfig;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::render::{GpuTextures, RenderContext};
use crate::terrain::normal_map::NormalMapSynthesizer;
use crate::terrain::params::SurfaceParameters;
use crate::terrain::TerrainTextureBuilder;
use super::buffer::{PixelBuffer, TextureBundle};
use super::cache::{CacheStats, TextureCache};

/// Generates and caches texture bundles for every body category.
pub struct TextureFactory {
    context: Mutex<RenderContext>,
    caches: [TextureCache; 4],
    upload_to_gpu: bool,
    disposed: AtomicBool,
}

impl TextureFactory {
    /// Create the rendering context described by `config`.
    ///
    /// Fails with [`Error::Gpu`] when the wgpu backend is requested and no
    /// adapter is available, or [`Error::Config`] for unusable settings.
    pub fn new(config: &FactoryConfig) -> Result<Self> {
        config.validate()?;
        let context = RenderContext::new(config.backend)?;
        Ok(Self::from_context(context, config))
    }

    /// Factory on a CPU-only context with default settings.
    pub fn software() -> Self {
        Self::from_context(RenderContext::software(), &FactoryConfig::default())
    }

    /// Wrap an existing rendering context.
    pub fn from_context(context: RenderContext, config: &FactoryConfig) -> Self {
        Self {
            context: Mutex::new(context),
            caches: BodyCategory::ALL.map(|c| TextureCache::new(c.as_str())),
            upload_to_gpu: config.upload_to_gpu,
            disposed: AtomicBool::new(false),
        }
    }

    fn lock_context(&self) -> MutexGuard<'_, RenderContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed.load(Ordering::Acquire) {
            Err(Error::Disposed)
        } else {
            Ok(())
        }
    }

    /// The cache backing `category`.
    pub fn cache(&self, category: BodyCategory) -> &TextureCache {
        let index = match category {
            BodyCategory::Terrestrial => 0,
            BodyCategory::GasGiant => 1,
            BodyCategory::Star => 2,
            BodyCategory::Rock => 3,
        };
        &self.caches[index]
    }

    /// Counters for every category cache.
    pub fn stats(&self) -> Vec<(BodyCategory, CacheStats)> {
        BodyCategory::ALL
            .iter()
            .map(|&c| (c, self.cache(c).stats()))
            .collect()
    }

    /// Generate (or fetch) the bundle for any body.
    pub fn generate(&self, params: &BodyParameters) -> Result<Arc<TextureBundle>> {
        match params {
            BodyParameters::Terrestrial(p) => self.terrestrial(p),
            BodyParameters::GasGiant(p) => self.gas_giant(p),
            BodyParameters::Star(p) => self.star(p),
            BodyParameters::Rock(p) => self.rock(p),
        }
    }

    pub fn terrestrial(&self, params: &SurfaceParameters) -> Result<Arc<TextureBundle>> {
        self.ensure_live()?;
        let surface = params.resolve()?;
        let key = surface.cache_key()?;

        self.cache(BodyCategory::Terrestrial).get_or_create(&key, || {
            let start = Instant::now();
            let bundle = TerrainTextureBuilder::new(&surface).build()?;
            let gpu = self.upload("terrestrial", bundle.color_buffer(), bundle.normal_buffer())?;
            log::info!(
                "Generated {} surface {}x{} (seed {}) in {:.1}ms",
                surface.surface_type.as_str(),
                surface.texture_size,
                surface.texture_size,
                surface.seed,
                start.elapsed().as_secs_f64() * 1000.0
            );
            Ok(bundle.with_gpu(gpu))
        })
    }

    pub fn gas_giant(&self, params: &GasGiantParameters) -> Result<Arc<TextureBundle>> {
        self.ensure_live()?;
        self.parametric(&params.resolve()?)
    }

    pub fn star(&self, params: &StarParameters) -> Result<Arc<TextureBundle>> {
        self.ensure_live()?;
        self.parametric(&params.resolve()?)
    }

    pub fn rock(&self, params: &RockParameters) -> Result<Arc<TextureBundle>> {
        self.ensure_live()?;
        self.parametric(&params.resolve()?)
    }

    fn parametric<S: ParametricSurface>(&self, surface: &S) -> Result<Arc<TextureBundle>> {
        let key = surface.cache_key()?;
        let label = S::CATEGORY.as_str();

        self.cache(S::CATEGORY).get_or_create(&key, || {
            let start = Instant::now();
            let size = surface.texture_size();
            let program = surface.program();

            let mut ctx = self.lock_context();
            let target = ctx.render(program.as_ref(), size)?;
            let normal = NormalMapSynthesizer::new(surface.normal_strength())
                .synthesize(&target.height, size)?;
            let gpu = if self.upload_to_gpu {
                ctx.upload(label, &target.color, &normal)?
            } else {
                None
            };
            drop(ctx);

            log::info!(
                "Generated {} texture {}x{} in {:.1}ms",
                label,
                size,
                size,
                start.elapsed().as_secs_f64() * 1000.0
            );
            Ok(TextureBundle::new(target.color, normal, target.height)?.with_gpu(gpu))
        })
    }

    fn upload(&self, label: &str, color: &PixelBuffer, normal: &PixelBuffer) -> Result<Option<GpuTextures>> {
        if !self.upload_to_gpu {
            return Ok(None);
        }
        self.lock_context().upload(label, color, normal)
    }

    /// Drop every cached bundle in every category.
    pub fn clear(&self) {
        for cache in &self.caches {
            cache.clear();
        }
    }

    /// Release the rendering context and close every cache. Idempotent.
    ///
    /// Generation afterwards fails with [`Error::Disposed`], including builds
    /// that were already running.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        for cache in &self.caches {
            cache.close();
        }
        self.lock_context().dispose();
        log::info!("Texture factory disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl Drop for TextureFactory {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::params::SurfaceType;

    fn small_surface(seed: u32) -> SurfaceParameters {
        SurfaceParameters {
            seed,
            texture_size: 16,
            ..Default::default()
        }
    }

    #[test]
    fn test_terrestrial_is_cached() {
        let factory = TextureFactory::software();
        let a = factory.terrestrial(&small_surface(1)).unwrap();
        let b = factory.terrestrial(&small_surface(1)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let stats = factory.cache(BodyCategory::Terrestrial).stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn test_equivalent_colors_share_entry() {
        let factory = TextureFactory::software();
        let hex = SurfaceParameters {
            surface_type: SurfaceType::Desert,
            colors: vec![crate::core::ColorValue::Hex("#808080".into())],
            ..small_surface(3)
        };
        let unit = SurfaceParameters {
            colors: vec![crate::core::ColorValue::Unit([0.5, 0.5, 0.5])],
            ..hex.clone()
        };
        let a = factory.terrestrial(&hex).unwrap();
        let b = factory.terrestrial(&unit).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_categories_use_separate_caches() {
        let factory = TextureFactory::software();
        factory.gas_giant(&GasGiantParameters { texture_size: 8, ..Default::default() }).unwrap();
        factory.star(&StarParameters { texture_size: 8, ..Default::default() }).unwrap();
        factory.rock(&RockParameters { texture_size: 8, ..Default::default() }).unwrap();

        assert!(factory.cache(BodyCategory::Terrestrial).is_empty());
        for category in [BodyCategory::GasGiant, BodyCategory::Star, BodyCategory::Rock] {
            assert_eq!(factory.cache(category).len(), 1);
        }
        assert_eq!(factory.lock_context().passes_rendered(), 3);
    }

    #[test]
    fn test_generate_dispatches_by_category() {
        let factory = TextureFactory::software();
        let body = BodyParameters::Star(StarParameters { texture_size: 8, ..Default::default() });
        let bundle = factory.generate(&body).unwrap();
        assert_eq!(bundle.size(), 8);
        assert_eq!(factory.cache(BodyCategory::Star).len(), 1);
    }

    #[test]
    fn test_invalid_size_is_error() {
        let factory = TextureFactory::software();
        let result = factory.rock(&RockParameters { texture_size: 0, ..Default::default() });
        assert!(matches!(result, Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_clear_then_regenerate() {
        let factory = TextureFactory::software();
        let a = factory.terrestrial(&small_surface(2)).unwrap();
        factory.clear();
        factory.clear();
        let b = factory.terrestrial(&small_surface(2)).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.color_buffer(), b.color_buffer());
    }

    #[test]
    fn test_dispose() {
        let factory = TextureFactory::software();
        factory.star(&StarParameters { texture_size: 8, ..Default::default() }).unwrap();
        factory.dispose();
        factory.dispose();
        assert!(factory.is_disposed());
        assert!(factory.cache(BodyCategory::Star).is_empty());
        assert!(factory.lock_context().is_disposed());
        assert!(matches!(factory.terrestrial(&small_surface(1)), Err(Error::Disposed)));
        assert!(matches!(
            factory.gas_giant(&GasGiantParameters::default()),
            Err(Error::Disposed)
        ));
    }

    #[test]
    fn test_huge_granule_scale_degrades() {
        let factory = TextureFactory::software();
        let star = StarParameters { granule_scale: 1e10, texture_size: 8, ..Default::default() };
        let bundle = factory.star(&star).unwrap();
        assert_eq!(bundle.size(), 8);
    }

    #[test]
    fn test_dispose_during_build_discards_result() {
        use std::sync::Barrier;
        use std::thread;

        let factory = TextureFactory::software();
        let key = small_surface(6).resolve().unwrap().cache_key().unwrap();
        let started = Barrier::new(2);
        let proceed = Barrier::new(2);
        let (factory, started, proceed, key) = (&factory, &started, &proceed, &key);

        thread::scope(|s| {
            let worker = s.spawn(move || {
                factory.cache(BodyCategory::Terrestrial).get_or_create(key, || {
                    started.wait();
                    proceed.wait();
                    TerrainTextureBuilder::from_params(&small_surface(6))?.build()
                })
            });
            started.wait();
            factory.dispose();
            proceed.wait();
            assert!(matches!(worker.join().unwrap(), Err(Error::Disposed)));
        });

        assert!(factory.cache(BodyCategory::Terrestrial).is_empty());
        assert!(matches!(factory.terrestrial(&small_surface(6)), Err(Error::Disposed)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FactoryConfig { default_texture_size: 0, ..Default::default() };
        assert!(matches!(TextureFactory::new(&config), Err(Error::Config(_))));
    }
}
