//! Texture generator binary: builds one bundle and prints its statistics.
//!
//! Usage: cargo run --release --bin generate_texture -- [OPTIONS]
//!
//! Options:
//!   --category <NAME>     terrestrial | gas_giant | star | rock (default: terrestrial)
//!   --seed <SEED>         Random seed (default: 12345)
//!   --size <PIXELS>       Texture edge length (default: from config, 512)
//!   --type <TAG>          Surface type for terrestrial bodies (default: rocky)
//!   --octaves <N>         Noise octaves for terrestrial bodies (default: 4)
//!   --class <1-5>         Gas giant class (default: 1)
//!   --temperature <K>     Star temperature in Kelvin (default: 5778)
//!   --config <PATH>       Factory config JSON
//!   --gpu                 Use the wgpu backend
//!   --repeat <N>          Generate N times to exercise the cache (default: 2)
//!
//! Nothing is written to disk.

use std::time::Instant;

use planetex::celestial::BodyParameters;
use planetex::core::logging;
use planetex::render::RenderBackend;
use planetex::terrain::{decode_normal, SurfaceType};
use planetex::{BodyCategory, FactoryConfig, Result, TextureBundle, TextureFactory};

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("Texture generation failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => FactoryConfig::from_file(path)?,
        None => FactoryConfig::default(),
    };
    if args.iter().any(|a| a == "--gpu") {
        config.backend = RenderBackend::Wgpu;
    }
    if let Some(size) = parse_u32_arg(&args, "--size") {
        config.default_texture_size = size;
    }

    let category = match parse_str_arg(&args, "--category").as_deref() {
        None | Some("terrestrial") => BodyCategory::Terrestrial,
        Some("gas_giant") => BodyCategory::GasGiant,
        Some("star") => BodyCategory::Star,
        Some("rock") => BodyCategory::Rock,
        Some(other) => {
            log::warn!("Unknown category '{}', using terrestrial", other);
            BodyCategory::Terrestrial
        }
    };
    let seed = parse_u32_arg(&args, "--seed").unwrap_or(12345);
    let repeat = parse_u32_arg(&args, "--repeat").unwrap_or(2).max(1);

    let mut body = config.body_defaults(category);
    match &mut body {
        BodyParameters::Terrestrial(p) => {
            p.seed = seed;
            if let Some(tag) = parse_str_arg(&args, "--type") {
                p.surface_type = SurfaceType::parse(&tag);
            }
            if let Some(octaves) = parse_u32_arg(&args, "--octaves") {
                p.noise.octaves = octaves;
            }
        }
        BodyParameters::GasGiant(p) => {
            p.seed = seed;
            if let Some(class) = parse_u32_arg(&args, "--class") {
                p.class = class.min(u8::MAX as u32) as u8;
            }
        }
        BodyParameters::Star(p) => {
            p.seed = seed;
            if let Some(t) = parse_f32_arg(&args, "--temperature") {
                p.temperature = t;
            }
        }
        BodyParameters::Rock(p) => p.seed = seed,
    }

    println!("=== Planetex Texture Generator ===");
    println!("Category: {}", category.as_str());
    println!("Seed:     {}", seed);
    println!("Size:     {}", config.default_texture_size);
    println!("Backend:  {:?}", config.backend);
    println!();

    let factory = TextureFactory::new(&config)?;
    for i in 0..repeat {
        let start = Instant::now();
        let bundle = factory.generate(&body)?;
        println!(
            "Run {}: {:.1}ms (gpu textures: {})",
            i + 1,
            start.elapsed().as_secs_f64() * 1000.0,
            bundle.gpu().is_some()
        );
        if i == 0 {
            print_summary(&bundle);
        }
    }

    for (category, stats) in factory.stats() {
        if stats.hits + stats.misses > 0 {
            log::info!(
                "[{}] hits: {}, misses: {}, entries: {}, hit rate: {:.0}%",
                category.as_str(),
                stats.hits,
                stats.misses,
                stats.entries,
                stats.hit_rate() * 100.0
            );
        }
    }

    factory.dispose();
    Ok(())
}

fn print_summary(bundle: &TextureBundle) {
    let (lo, hi) = bundle.height_grid().range();
    let values = bundle.height_grid().values();
    let mean = values.iter().map(|&h| h as f64).sum::<f64>() / values.len() as f64;

    let mut rgb_sum = [0u64; 3];
    for px in bundle.color_buffer().pixels() {
        for c in 0..3 {
            rgb_sum[c] += px[c] as u64;
        }
    }
    let n = bundle.color_buffer().pixels().len() as u64;

    let worst_normal = bundle
        .normal_buffer()
        .pixels()
        .iter()
        .map(|&p| (decode_normal(p).length() - 1.0).abs())
        .fold(0.0f32, f32::max);

    let seam_ok = bundle.color_buffer().column(0) == bundle.color_buffer().column(bundle.size() - 1);

    println!("Height:   min {:.3}, max {:.3}, mean {:.3}", lo, hi, mean);
    println!("Color:    mean rgb({}, {}, {})", rgb_sum[0] / n, rgb_sum[1] / n, rgb_sum[2] / n);
    println!("Normals:  max |len - 1| = {:.4}", worst_normal);
    println!("Seam:     {}", if seam_ok { "continuous" } else { "BROKEN" });
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
