//! Planetex - deterministic procedural textures for celestial bodies
//!
//! Color, normal and height layers for planets, gas giants, stars and rocks,
//! generated from a seed and a parameter set and cached per category.

pub mod core;
pub mod math;
pub mod render;
pub mod terrain;
pub mod celestial;
pub mod texture;
pub mod config;

pub use celestial::{BodyCategory, BodyParameters};
pub use config::FactoryConfig;
pub use crate::core::{Error, Result};
pub use texture::{TextureBundle, TextureCache, TextureFactory};
