//! Theme Table - semantic labels to colors, and palette resolution

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::color::{ColorPipeline, ColorSpec, Rgb};
use crate::ENGINE_VERSION;

/// Palette length cap. Positional, not a dedup.
pub const MAX_PALETTE_COLORS: usize = 5;

pub const DEFAULT_THEME: &str = "meaning";

const BUILTIN_HUES: [(&str, f64); 12] = [
    ("meaning", 280.0),
    ("technology", 190.0),
    ("creativity", 330.0),
    ("identity", 35.0),
    ("future", 210.0),
    ("systems", 160.0),
    ("sovereignty", 250.0),
    ("expression", 310.0),
    ("beauty", 50.0),
    ("narrative", 70.0),
    ("journey", 100.0),
    ("consciousness", 270.0),
];

#[derive(Debug, Error)]
pub enum ThemeTableError {
    #[error("Failed to read theme table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid theme table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Theme table requires engine >= {0}, current is {1}")]
    EngineVersionMismatch(String, String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),
}

/// On-disk form of a theme table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeTableFile {
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    #[serde(default)]
    pub default_theme: Option<String>,
    #[serde(default)]
    pub themes: BTreeMap<String, ColorSpec>,
}

fn default_engine_min_version() -> String {
    crate::MIN_THEME_TABLE_VERSION.to_string()
}

/// Palette built from a color list outside `1..=MAX_PALETTE_COLORS`.
#[derive(Debug, Error)]
#[error("Palette must hold 1 to {MAX_PALETTE_COLORS} colors, got {0}")]
pub struct PaletteLengthError(pub usize);

/// Ordered list of device colors resolved for one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgb>")]
pub struct Palette(Vec<Rgb>);

impl TryFrom<Vec<Rgb>> for Palette {
    type Error = PaletteLengthError;

    fn try_from(colors: Vec<Rgb>) -> Result<Self, Self::Error> {
        let len = colors.len();
        Self::new(colors).ok_or(PaletteLengthError(len))
    }
}

impl Palette {
    /// Wraps resolved colors; `None` when empty or over the cap.
    pub fn new(colors: Vec<Rgb>) -> Option<Self> {
        (1..=MAX_PALETTE_COLORS)
            .contains(&colors.len())
            .then_some(Self(colors))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.0
    }

    /// Color at `index`, wrapping around the palette.
    pub fn cycle(&self, index: usize) -> Rgb {
        self.0[index % self.0.len()]
    }

    pub fn to_hex(&self) -> Vec<String> {
        self.0.iter().map(|c| c.to_hex()).collect()
    }
}

/// Theme table - case-insensitive label lookup with a designated default
#[derive(Debug, Clone)]
pub struct ThemeTable {
    colors: BTreeMap<String, ColorSpec>,
    default_theme: String,
}

impl ThemeTable {
    /// The twelve conversation themes.
    pub fn builtin() -> Self {
        let colors = BUILTIN_HUES
            .iter()
            .map(|&(label, hue)| (label.to_string(), ColorSpec::oklch(0.65, 0.25, hue)))
            .collect();
        Self {
            colors,
            default_theme: DEFAULT_THEME.to_string(),
        }
    }

    /// Parse a table from JSON text. Labels are stored lowercased.
    pub fn from_json(content: &str) -> Result<Self, ThemeTableError> {
        let file: ThemeTableFile = serde_json::from_str(content)?;
        check_engine_version(&file.engine_min_version)?;

        let mut table = Self::builtin();
        table.merge(file);
        Ok(table)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ThemeTableError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Merge every `*.json` table in `dir` over the builtin table.
    ///
    /// Files that cannot be read, parsed or that require a newer engine are
    /// skipped with a warning. A missing directory yields the builtin table.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ThemeTableError> {
        let mut table = Self::builtin();
        if !dir.exists() {
            return Ok(table);
        }

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |e| e == "json"))
            .collect();
        // read_dir order is platform dependent; merge order decides overrides
        paths.sort();

        for path in paths {
            let parsed = fs::read_to_string(&path)
                .map_err(ThemeTableError::from)
                .and_then(|content| {
                    let file: ThemeTableFile = serde_json::from_str(&content)?;
                    check_engine_version(&file.engine_min_version)?;
                    Ok(file)
                });
            match parsed {
                Ok(file) => {
                    tracing::debug!(path = %path.display(), themes = file.themes.len(), "loaded theme table");
                    table.merge(file);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping theme table");
                }
            }
        }
        Ok(table)
    }

    fn merge(&mut self, file: ThemeTableFile) {
        for (label, spec) in file.themes {
            self.colors.insert(label.to_lowercase(), spec);
        }
        if let Some(default_theme) = file.default_theme {
            self.default_theme = default_theme.to_lowercase();
        }
    }

    pub fn register(&mut self, label: &str, spec: ColorSpec) {
        self.colors.insert(label.to_lowercase(), spec);
    }

    pub fn get(&self, label: &str) -> Option<&ColorSpec> {
        self.colors.get(&label.to_lowercase())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }

    pub fn default_theme(&self) -> &str {
        &self.default_theme
    }

    /// Color used for unknown labels and for an empty theme list.
    ///
    /// A default label missing from the table falls back to builtin meaning.
    pub fn default_color(&self) -> ColorSpec {
        self.colors
            .get(&self.default_theme)
            .cloned()
            .unwrap_or(ColorSpec::oklch(0.65, 0.25, 280.0))
    }

    /// Color for one label; unknown labels get the default color.
    pub fn color_for(&self, label: &str) -> ColorSpec {
        self.get(label).cloned().unwrap_or_else(|| self.default_color())
    }

    /// Resolve the ordered palette for a theme list.
    ///
    /// First five themes in input order, duplicates kept; an empty list
    /// resolves to the single default color.
    pub fn resolve_palette(&self, themes: &[String], pipeline: ColorPipeline) -> Palette {
        let mut specs: Vec<ColorSpec> = themes
            .iter()
            .take(MAX_PALETTE_COLORS)
            .map(|theme| self.color_for(theme))
            .collect();
        if specs.is_empty() {
            specs.push(self.default_color());
        }

        for spec in specs.iter().filter(|s| !s.is_recognized()) {
            tracing::debug!(color = %spec, "unrecognized color encoding, using fallback");
        }

        Palette(specs.iter().map(|spec| spec.to_rgb(pipeline)).collect())
    }
}

impl Default for ThemeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn check_engine_version(min_version: &str) -> Result<(), ThemeTableError> {
    let engine_ver = semver::Version::parse(ENGINE_VERSION)
        .map_err(|_| ThemeTableError::InvalidVersion(ENGINE_VERSION.to_string()))?;
    let min_ver = semver::Version::parse(min_version)
        .map_err(|_| ThemeTableError::InvalidVersion(min_version.to_string()))?;

    if engine_ver < min_ver {
        return Err(ThemeTableError::EngineVersionMismatch(
            min_version.to_string(),
            ENGINE_VERSION.to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn themes(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_truncates_to_five_in_order() {
        let table = ThemeTable::builtin();
        let input = themes(&[
            "meaning", "technology", "creativity", "identity", "future", "systems", "beauty",
        ]);
        let palette = table.resolve_palette(&input, ColorPipeline::Analytic);

        assert_eq!(palette.len(), 5);
        let expected: Vec<Rgb> = input[..5]
            .iter()
            .map(|t| table.color_for(t).to_rgb(ColorPipeline::Analytic))
            .collect();
        assert_eq!(palette.colors(), expected.as_slice());
        assert_eq!(palette.colors()[1], Rgb::new(141, 174, 182));
    }

    #[test]
    fn test_empty_themes_single_default() {
        let table = ThemeTable::builtin();
        let palette = table.resolve_palette(&[], ColorPipeline::Analytic);
        assert_eq!(palette.colors(), &[Rgb::new(170, 142, 185)]);
    }

    #[test]
    fn test_case_insensitive_and_unknown() {
        let table = ThemeTable::builtin();
        let palette = table.resolve_palette(&themes(&["BEAUTY", "web3"]), ColorPipeline::Analytic);
        assert_eq!(palette.colors(), &[Rgb::new(182, 174, 141), Rgb::new(170, 142, 185)]);
    }

    #[test]
    fn test_duplicates_preserved() {
        let table = ThemeTable::builtin();
        let palette = table.resolve_palette(&themes(&["future", "future"]), ColorPipeline::Analytic);
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.colors()[0], palette.colors()[1]);
    }

    #[test]
    fn test_from_json_overrides_and_default() {
        let table = ThemeTable::from_json(
            r##"{"defaultTheme": "Legacy", "themes": {"Legacy": "#102030", "meaning": "nope"}}"##,
        )
        .unwrap();
        assert_eq!(table.default_theme(), "legacy");
        let palette = table.resolve_palette(&themes(&["unknown", "meaning"]), ColorPipeline::Analytic);
        assert_eq!(palette.colors(), &[Rgb::new(16, 32, 48), crate::color::NEUTRAL_RGB]);
    }

    #[test]
    fn test_engine_version_gate() {
        let err = ThemeTable::from_json(r#"{"engineMinVersion": "99.0.0", "themes": {}}"#).unwrap_err();
        assert!(err.to_string().contains("requires engine"));
    }

    #[test]
    fn test_palette_bounds() {
        assert!(Palette::new(vec![]).is_none());
        assert!(Palette::new(vec![Rgb::new(0, 0, 0); 6]).is_none());
        let p = Palette::new(vec![Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]).unwrap();
        assert_eq!(p.cycle(3), Rgb::new(4, 5, 6));
    }

    #[test]
    fn test_palette_deserialize_enforces_length() {
        assert!(serde_json::from_str::<Palette>("[]").is_err());

        let six = serde_json::to_string(&vec![Rgb::new(0, 0, 0); 6]).unwrap();
        let err = serde_json::from_str::<Palette>(&six).unwrap_err();
        assert!(err.to_string().contains("got 6"));

        let palette: Palette = serde_json::from_str(r#"[{"r": 1, "g": 2, "b": 3}]"#).unwrap();
        assert_eq!(palette.colors(), &[Rgb::new(1, 2, 3)]);
        assert_eq!(serde_json::to_string(&palette).unwrap(), r#"[{"r":1,"g":2,"b":3}]"#);
    }
}
