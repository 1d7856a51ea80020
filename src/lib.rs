//! Echoes Artwork - deterministic procedural artwork
//!
//! # The Rules
//! 1. Same request, same bytes
//! 2. One random stream per call, never shared
//! 3. Layers draw in a fixed order
//! 4. Bad input falls back, it never raises
//! 5. No surface, no artwork: `None`, not an error

pub mod rng;
pub mod color;
pub mod themes;
pub mod surface;
pub mod composition;
pub mod validation;
pub mod hashing;
pub mod generator;
pub mod manifest;
pub mod synthesis;
pub mod cache;

pub use rng::SeededRandom;
pub use color::{ColorPipeline, ColorSpec, Rgb};
pub use themes::{Palette, PaletteLengthError, ThemeTable, ThemeTableError};
pub use composition::{CompositionPlan, LayerCounts, ShapeKind};
pub use validation::{NormalizedRequest, ValidationNotice, NoticeSeverity};
pub use generator::{generate_artwork, Artwork, ArtworkError, ArtworkGenerator, ArtworkRequest, GeneratorConfig};
pub use manifest::ArtworkManifest;
pub use cache::{ArtworkCache, ArtworkCacheConfig};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_THEME_TABLE_VERSION: &str = "1.0.0";
