//! Request Validation - Normalize, Never Reject
//!
//! Rules produce structured notices.
//! Normalization applies the documented fallbacks; nothing here is fatal.

use serde::{Deserialize, Serialize};

use crate::generator::{ArtworkRequest, GeneratorConfig};
use crate::themes::{ThemeTable, MAX_PALETTE_COLORS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeSeverity {
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationNotice {
    pub rule: String,
    pub severity: NoticeSeverity,
    pub message: String,
    pub actual: Option<String>,
    pub applied: Option<String>,
}

/// A request after fallbacks: what the pipeline actually draws.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRequest {
    pub themes: Vec<String>,
    pub agent_ids: Vec<String>,
    pub seed: String,
    pub width: u32,
    pub height: u32,
    pub notices: Vec<ValidationNotice>,
}

impl NormalizedRequest {
    pub fn has_warnings(&self) -> bool {
        self.notices.iter().any(|n| n.severity == NoticeSeverity::Warning)
    }
}

/// `"{themes joined by '-'}-{agentIds joined by '-'}"`
pub fn derive_seed(themes: &[String], agent_ids: &[String]) -> String {
    format!("{}-{}", themes.join("-"), agent_ids.join("-"))
}

/// Request rule trait - produces notices
pub trait RequestRule {
    fn name(&self) -> &'static str;
    fn check(&self, request: &ArtworkRequest, config: &GeneratorConfig, table: &ThemeTable) -> Vec<ValidationNotice>;
}

// --- Concrete Rules ---

pub struct DimensionRule;

impl RequestRule for DimensionRule {
    fn name(&self) -> &'static str { "dimensions" }

    fn check(&self, request: &ArtworkRequest, config: &GeneratorConfig, _table: &ThemeTable) -> Vec<ValidationNotice> {
        [
            ("width", request.width, config.default_width),
            ("height", request.height, config.default_height),
        ]
        .into_iter()
        .filter_map(|(side, requested, default)| match requested {
            Some(v) if v <= 0 => Some((side, v, default)),
            _ => None,
        })
        .map(|(side, actual, default)| ValidationNotice {
            rule: self.name().to_string(),
            severity: NoticeSeverity::Info,
            message: format!("Non-positive {side}, using default"),
            actual: Some(actual.to_string()),
            applied: Some(default.to_string()),
        })
        .collect()
    }
}

pub struct SizeLimitRule;

impl RequestRule for SizeLimitRule {
    fn name(&self) -> &'static str { "size_limit" }

    fn check(&self, request: &ArtworkRequest, config: &GeneratorConfig, _table: &ThemeTable) -> Vec<ValidationNotice> {
        let (width, height) = config.resolve_dimensions(request.width, request.height);
        if width > config.max_dimension || height > config.max_dimension {
            vec![ValidationNotice {
                rule: self.name().to_string(),
                severity: NoticeSeverity::Warning,
                message: "Surface too large, artwork unavailable".to_string(),
                actual: Some(format!("{width}x{height}")),
                applied: Some(format!("{} maximum per side", config.max_dimension)),
            }]
        } else {
            vec![]
        }
    }
}

pub struct ThemeRule;

impl RequestRule for ThemeRule {
    fn name(&self) -> &'static str { "themes" }

    fn check(&self, request: &ArtworkRequest, _config: &GeneratorConfig, table: &ThemeTable) -> Vec<ValidationNotice> {
        let mut notices: Vec<_> = request
            .themes
            .iter()
            .filter(|theme| !table.contains(theme))
            .map(|theme| ValidationNotice {
                rule: self.name().to_string(),
                severity: NoticeSeverity::Info,
                message: "Unknown theme, using default color".to_string(),
                actual: Some(theme.clone()),
                applied: Some(table.default_theme().to_string()),
            })
            .collect();

        if request.themes.len() > MAX_PALETTE_COLORS {
            notices.push(ValidationNotice {
                rule: self.name().to_string(),
                severity: NoticeSeverity::Info,
                message: "Palette uses the first themes only".to_string(),
                actual: Some(format!("{} themes", request.themes.len())),
                applied: Some(format!("{MAX_PALETTE_COLORS} colors")),
            });
        }
        notices
    }
}

/// Validator runs every rule and applies the fallbacks
pub struct Validator {
    rules: Vec<Box<dyn RequestRule + Send + Sync>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(DimensionRule),
                Box::new(SizeLimitRule),
                Box::new(ThemeRule),
            ],
        }
    }

    pub fn normalize(&self, request: &ArtworkRequest, config: &GeneratorConfig, table: &ThemeTable) -> NormalizedRequest {
        let notices = self
            .rules
            .iter()
            .flat_map(|rule| rule.check(request, config, table))
            .collect();

        let (width, height) = config.resolve_dimensions(request.width, request.height);

        // an empty explicit seed counts as absent
        let seed = match request.seed.as_deref() {
            Some(seed) if !seed.is_empty() => seed.to_string(),
            _ => derive_seed(&request.themes, &request.agent_ids),
        };

        NormalizedRequest {
            themes: request.themes.clone(),
            agent_ids: request.agent_ids.clone(),
            seed,
            width,
            height,
            notices,
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
