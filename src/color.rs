//! Color encodings and perceptual-to-device conversion
//!
//! Theme colors are authored as CSS-style strings (`oklch(L C H)` or
//! `#rrggbb`). Conversion to device RGB never fails: anything that cannot be
//! read lands on a fixed fallback triple.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Fallback for encodings that are neither OKLCH nor hex.
pub const NEUTRAL_RGB: Rgb = Rgb::new(100, 100, 200);

/// Fallback for an `oklch(...)` string whose components cannot be read.
pub const DEFAULT_PURPLE: Rgb = Rgb::new(139, 92, 246);

/// Device sRGB triple, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Which perceptual-to-device conversion a generator uses.
///
/// A generator picks one and keeps it for every color it resolves; mixing
/// the two would change output bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorPipeline {
    /// Three hue-shifted cosine projections. Coefficients are frozen.
    #[default]
    Analytic,
    /// OKLCH -> Oklab -> linear sRGB -> sRGB, clamped to gamut.
    Exact,
}

/// A parsed color encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    Oklch { l: f64, c: f64, h: f64 },
    Hex(Rgb),
    /// `oklch(` prefix with an unreadable body
    MalformedOklch(String),
    Unrecognized(String),
}

impl ColorSpec {
    pub const fn oklch(l: f64, c: f64, h: f64) -> Self {
        Self::Oklch { l, c, h }
    }

    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.starts_with("oklch") {
            return parse_oklch(trimmed)
                .map(|(l, c, h)| Self::Oklch { l, c, h })
                .unwrap_or_else(|| Self::MalformedOklch(trimmed.to_string()));
        }
        if trimmed.starts_with('#') {
            return parse_hex(trimmed)
                .map(Self::Hex)
                .unwrap_or_else(|| Self::Unrecognized(trimmed.to_string()));
        }
        Self::Unrecognized(trimmed.to_string())
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Oklch { .. } | Self::Hex(_))
    }

    /// Resolve to device RGB. Never fails.
    pub fn to_rgb(&self, pipeline: ColorPipeline) -> Rgb {
        match *self {
            Self::Oklch { l, c, h } => match pipeline {
                ColorPipeline::Analytic => oklch_to_rgb_analytic(l, c, h),
                ColorPipeline::Exact => oklch_to_rgb_exact(l, c, h),
            },
            Self::Hex(rgb) => rgb,
            Self::MalformedOklch(_) => DEFAULT_PURPLE,
            Self::Unrecognized(_) => NEUTRAL_RGB,
        }
    }
}

impl FromStr for ColorSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oklch { l, c, h } => write!(f, "oklch({l} {c} {h})"),
            Self::Hex(rgb) => f.write_str(&rgb.to_hex()),
            Self::MalformedOklch(raw) | Self::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for ColorSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColorSpec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// `oklch(L C H)`: exactly three unsigned decimals, whitespace between
/// them only. No alpha, no padding inside the parentheses.
fn parse_oklch(s: &str) -> Option<(f64, f64, f64)> {
    let body = s.strip_prefix("oklch(")?;
    let body = &body[..body.find(')')?];
    if body.starts_with(char::is_whitespace) || body.ends_with(char::is_whitespace) {
        return None;
    }
    let parts = body
        .split_whitespace()
        .map(parse_unsigned_decimal)
        .collect::<Option<Vec<_>>>()?;
    match parts[..] {
        [l, c, h] => Some((l, c, h)),
        _ => None,
    }
}

fn parse_unsigned_decimal(s: &str) -> Option<f64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    s.parse().ok()
}

fn parse_hex(s: &str) -> Option<Rgb> {
    let digits = s.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Round half up, then clamp into a channel.
fn to_channel(value: f64) -> u8 {
    (value + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Approximate OKLCH -> RGB used for byte-compatible output.
pub fn oklch_to_rgb_analytic(l: f64, c: f64, h: f64) -> Rgb {
    let h_rad = h * PI / 180.0;
    let base = l * 255.0;
    let third = 2.0 * PI / 3.0;
    Rgb::new(
        to_channel(base + c * h_rad.cos() * 100.0),
        to_channel(base + c * (h_rad - third).cos() * 100.0),
        to_channel(base + c * (h_rad + third).cos() * 100.0),
    )
}

/// Colorimetric OKLCH -> sRGB, gamut clamped per channel.
pub fn oklch_to_rgb_exact(l: f64, c: f64, h: f64) -> Rgb {
    let h_rad = h.to_radians();
    let (a, b) = (c * h_rad.cos(), c * h_rad.sin());

    // Oklab -> LMS (cube roots)
    let l_ = l + 0.396_337_777_4 * a + 0.215_803_757_3 * b;
    let m_ = l - 0.105_561_345_8 * a - 0.063_854_172_8 * b;
    let s_ = l - 0.089_484_177_5 * a - 1.291_485_548_0 * b;

    let (lc, mc, sc) = (l_ * l_ * l_, m_ * m_ * m_, s_ * s_ * s_);

    let r = 4.076_741_662_1 * lc - 3.307_711_591_3 * mc + 0.230_969_929_2 * sc;
    let g = -1.268_438_004_6 * lc + 2.609_757_401_1 * mc - 0.341_319_396_5 * sc;
    let bl = -0.004_196_086_3 * lc - 0.703_418_614_7 * mc + 1.707_614_701_0 * sc;

    let encode = |v: f64| to_channel(linear_to_srgb(v.clamp(0.0, 1.0)) * 255.0);
    Rgb::new(encode(r), encode(g), encode(bl))
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
