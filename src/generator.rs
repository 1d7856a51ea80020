//! Artwork Generator - Single Entry Point
//!
//! generate() never raises: unavailable artwork is `None`.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::ColorPipeline;
use crate::composition::{CompositionPlan, LayerCounts};
use crate::hashing::sha256_hex;
use crate::rng::SeededRandom;
use crate::surface::Surface;
use crate::themes::{Palette, ThemeTable};
use crate::validation::{NormalizedRequest, ValidationNotice, Validator};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 800;
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("No drawing surface available for {width}x{height}")]
    SurfaceUnavailable { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkRequest {
    pub themes: Vec<String>,
    /// Only feeds seed derivation.
    #[serde(default)]
    pub agent_ids: Vec<String>,
    #[serde(default)]
    pub seed: Option<String>,
    /// Signed so that negative sizes reach the dimension fallback.
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

impl ArtworkRequest {
    pub fn new(themes: Vec<String>) -> Self {
        Self { themes, ..Self::default() }
    }

    pub fn with_agent_ids(mut self, agent_ids: Vec<String>) -> Self {
        self.agent_ids = agent_ids;
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(i64::from(width));
        self.height = Some(i64::from(height));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(default = "default_width")]
    pub default_width: u32,
    #[serde(default = "default_height")]
    pub default_height: u32,
    /// Larger surfaces are treated as unavailable.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    #[serde(default)]
    pub color_pipeline: ColorPipeline,
}

fn default_width() -> u32 { DEFAULT_WIDTH }
fn default_height() -> u32 { DEFAULT_HEIGHT }
fn default_max_dimension() -> u32 { DEFAULT_MAX_DIMENSION }

impl GeneratorConfig {
    /// Missing or non-positive sides take the configured defaults.
    ///
    /// Sides beyond `u32` saturate and are rejected later by the size limit.
    pub fn resolve_dimensions(&self, width: Option<i64>, height: Option<i64>) -> (u32, u32) {
        let side = |requested: Option<i64>, default: u32| match requested {
            Some(v) if v > 0 => u32::try_from(v).unwrap_or(u32::MAX),
            _ => default,
        };
        (side(width, self.default_width), side(height, self.default_height))
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_WIDTH,
            default_height: DEFAULT_HEIGHT,
            max_dimension: DEFAULT_MAX_DIMENSION,
            color_pipeline: ColorPipeline::default(),
        }
    }
}

/// A finished, encoded artwork. Holds no reference to the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Artwork {
    pub request: NormalizedRequest,
    pub palette: Palette,
    pub color_pipeline: ColorPipeline,
    pub layers: LayerCounts,
    pub png: Vec<u8>,
}

impl Artwork {
    pub fn seed(&self) -> &str {
        &self.request.seed
    }

    pub fn width(&self) -> u32 {
        self.request.width
    }

    pub fn height(&self) -> u32 {
        self.request.height
    }

    pub fn notices(&self) -> &[ValidationNotice] {
        &self.request.notices
    }

    /// Self-contained `data:image/png;base64,...` URI.
    pub fn data_uri(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }

    /// SHA-256 of the PNG bytes, hex.
    pub fn image_hash(&self) -> String {
        sha256_hex(&self.png)
    }
}

/// The generator - immutable, shareable across threads
pub struct ArtworkGenerator {
    config: GeneratorConfig,
    themes: ThemeTable,
    validator: Validator,
}

impl ArtworkGenerator {
    pub fn new(config: GeneratorConfig, themes: ThemeTable) -> Self {
        Self {
            config,
            themes,
            validator: Validator::new(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn themes(&self) -> &ThemeTable {
        &self.themes
    }

    /// Apply fallbacks and derive the seed without drawing anything.
    pub fn normalize(&self, request: &ArtworkRequest) -> NormalizedRequest {
        self.validator.normalize(request, &self.config, &self.themes)
    }

    pub fn resolve_palette(&self, themes: &[String]) -> Palette {
        self.themes.resolve_palette(themes, self.config.color_pipeline)
    }

    /// Generate artwork, or `None` when it is unavailable.
    ///
    /// Callers should treat `None` as "no artwork", not as a failure to
    /// retry: an identical call fails identically.
    pub fn generate(&self, request: &ArtworkRequest) -> Option<Artwork> {
        match self.try_generate(request) {
            Ok(artwork) => Some(artwork),
            Err(e) => {
                tracing::warn!(error = %e, "artwork unavailable");
                None
            }
        }
    }

    /// Generate artwork, surfacing why it is unavailable.
    pub fn try_generate(&self, request: &ArtworkRequest) -> Result<Artwork, ArtworkError> {
        let normalized = self.normalize(request);
        let (width, height) = (normalized.width, normalized.height);
        tracing::debug!(
            seed = %normalized.seed,
            width,
            height,
            themes = normalized.themes.len(),
            "generating artwork"
        );

        // Dropped on every early return below
        let mut surface = Surface::acquire(width, height, self.config.max_dimension)
            .ok_or(ArtworkError::SurfaceUnavailable { width, height })?;

        let mut rng = SeededRandom::new(&normalized.seed);
        let palette = self.resolve_palette(&normalized.themes);
        let plan = CompositionPlan::plan(width, height, palette.len(), normalized.themes.len(), &mut rng);
        plan.render(&mut surface, &palette);

        let png = surface.into_png()?;
        let layers = plan.counts();
        tracing::debug!(palette = palette.len(), blobs = layers.blobs, bytes = png.len(), "artwork encoded");

        Ok(Artwork {
            request: normalized,
            palette,
            color_pipeline: self.config.color_pipeline,
            layers,
            png,
        })
    }
}

impl Default for ArtworkGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default(), ThemeTable::builtin())
    }
}

/// Generate with the builtin theme table and default configuration.
pub fn generate_artwork(request: &ArtworkRequest) -> Option<Artwork> {
    ArtworkGenerator::default().generate(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(themes: &[&str]) -> ArtworkRequest {
        ArtworkRequest::new(themes.iter().map(|s| s.to_string()).collect()).with_size(64, 64)
    }

    #[test]
    fn test_png_signature_and_data_uri() {
        let artwork = generate_artwork(&small(&["meaning"]).with_seed("x")).unwrap();
        assert_eq!(&artwork.png[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert!(artwork.data_uri().starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_resolve_dimensions() {
        let config = GeneratorConfig::default();
        assert_eq!(config.resolve_dimensions(None, None), (800, 800));
        assert_eq!(config.resolve_dimensions(Some(0), Some(10)), (800, 10));
        assert_eq!(config.resolve_dimensions(Some(-5), Some(-1)), (800, 800));
        assert_eq!(config.resolve_dimensions(Some(1 << 40), Some(1)), (u32::MAX, 1));
    }

    #[test]
    fn test_negative_width_payload_deserializes() {
        let request: ArtworkRequest =
            serde_json::from_str(r#"{"themes": ["meaning"], "seed": "neg", "width": -5, "height": 40}"#).unwrap();
        assert_eq!(request.width, Some(-5));

        let artwork = generate_artwork(&request).unwrap();
        assert_eq!((artwork.width(), artwork.height()), (800, 40));
    }

    #[test]
    fn test_oversize_is_unavailable() {
        let generator = ArtworkGenerator::default();
        let request = small(&["meaning"]).with_size(DEFAULT_MAX_DIMENSION + 1, 10);
        assert!(matches!(
            generator.try_generate(&request),
            Err(ArtworkError::SurfaceUnavailable { .. })
        ));
        assert!(generator.generate(&request).is_none());
    }

    #[test]
    fn test_config_from_json_defaults() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"colorPipeline": "exact"}"#).unwrap();
        assert_eq!(config.default_width, 800);
        assert_eq!(config.max_dimension, 8192);
        assert_eq!(config.color_pipeline, ColorPipeline::Exact);
    }

    #[test]
    fn test_generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ArtworkGenerator>();
    }
}
