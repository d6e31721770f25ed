//! Factory configuration
//!
//! ```json
//! { "backend": "wgpu", "default_texture_size": 1024, "upload_to_gpu": true }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::celestial::{BodyCategory, BodyParameters, GasGiantParameters, RockParameters, StarParameters};
use crate::core::error::Error;
use crate::core::types::Result;
use crate::render::RenderBackend;
use crate::terrain::params::{validate_texture_size, SurfaceParameters};

/// Settings for a [`crate::texture::TextureFactory`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    pub backend: RenderBackend,
    /// Edge length used by [`FactoryConfig::body_defaults`].
    pub default_texture_size: u32,
    /// Upload finished bundles when the backend has a GPU device.
    pub upload_to_gpu: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            backend: RenderBackend::Software,
            default_texture_size: 512,
            upload_to_gpu: true,
        }
    }
}

impl FactoryConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded factory config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_texture_size(self.default_texture_size)
            .map(|_| ())
            .map_err(|_| Error::Config(format!("default_texture_size {} is not usable", self.default_texture_size)))
    }

    /// Default parameters for `category` at the configured texture size.
    pub fn body_defaults(&self, category: BodyCategory) -> BodyParameters {
        let texture_size = self.default_texture_size;
        match category {
            BodyCategory::Terrestrial => {
                BodyParameters::Terrestrial(SurfaceParameters { texture_size, ..Default::default() })
            }
            BodyCategory::GasGiant => {
                BodyParameters::GasGiant(GasGiantParameters { texture_size, ..Default::default() })
            }
            BodyCategory::Star => BodyParameters::Star(StarParameters { texture_size, ..Default::default() }),
            BodyCategory::Rock => BodyParameters::Rock(RockParameters { texture_size, ..Default::default() }),
        }
    }
}
