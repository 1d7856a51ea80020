//! Composition Pipeline - fixed layer order over one random stream
//!
//! Planning draws every random value up front, layer by layer and item by
//! item, in the order below. Rasterization then replays the plan. Changing
//! the draw order changes every image ever generated.
//!
//! 1. background gradient (no draws)
//! 2. radial blobs: x, y, radius, color index
//! 3. polyline points: x, y
//! 4. particles: x, y, size, color index
//! 5. theme shapes: kind, x, y, size

use serde::{Deserialize, Serialize};
use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, PathBuilder, Point, RadialGradient,
    Rect, Shader, SpreadMode, Stroke, Transform,
};

use crate::color::Rgb;
use crate::rng::SeededRandom;
use crate::surface::Surface;
use crate::themes::Palette;

pub const MAX_BLOBS: usize = 8;
pub const MAX_POLYLINE_POINTS: usize = 6;
pub const PARTICLE_COUNT: usize = 20;

const BACKGROUND_ALPHA: f32 = 0.8;
const BLOB_ALPHA: f32 = 0.3;
const LINE_ALPHA: f32 = 0.2;
const LINE_WIDTH: f32 = 2.0;
const PARTICLE_ALPHA: f32 = 0.6;
const SHAPE_ALPHA: f32 = 0.5;
const SHAPE_LINE_WIDTH: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Triangle,
    Square,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Circle, ShapeKind::Triangle, ShapeKind::Square];
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeShape {
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: usize,
}

/// Every randomized parameter of one artwork, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    pub width: f64,
    pub height: f64,
    pub blobs: Vec<Blob>,
    pub points: Vec<(f64, f64)>,
    pub particles: Vec<Particle>,
    pub shapes: Vec<ThemeShape>,
}

/// How many items each layer produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerCounts {
    pub blobs: usize,
    pub polyline_points: usize,
    pub polyline_segments: usize,
    pub particles: usize,
    pub shapes: usize,
}

pub fn blob_count(theme_count: usize) -> usize {
    theme_count.saturating_mul(2).min(MAX_BLOBS)
}

pub fn polyline_point_count(theme_count: usize) -> usize {
    theme_count.min(MAX_POLYLINE_POINTS)
}

impl CompositionPlan {
    /// Draw all layer parameters from `rng`.
    pub fn plan(
        width: u32,
        height: u32,
        palette_len: usize,
        theme_count: usize,
        rng: &mut SeededRandom,
    ) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        let palette_len = palette_len.max(1);

        let blobs = (0..blob_count(theme_count))
            .map(|_| {
                let x = rng.range(w * 0.2, w * 0.8);
                let y = rng.range(h * 0.2, h * 0.8);
                let radius = rng.range(w * 0.1, w * 0.3);
                let color = rng.index(palette_len);
                Blob { x, y, radius, color }
            })
            .collect();

        let points = (0..polyline_point_count(theme_count))
            .map(|_| {
                let x = rng.range(w * 0.15, w * 0.85);
                let y = rng.range(h * 0.15, h * 0.85);
                (x, y)
            })
            .collect();

        let particles = (0..PARTICLE_COUNT)
            .map(|_| {
                let x = rng.range(0.0, w);
                let y = rng.range(0.0, h);
                let size = rng.range(2.0, 6.0);
                let color = rng.index(palette_len);
                Particle { x, y, size, color }
            })
            .collect();

        let shapes = (0..theme_count)
            .map(|i| {
                let kind = ShapeKind::ALL[rng.index(ShapeKind::ALL.len())];
                let x = rng.range(w * 0.3, w * 0.7);
                let y = rng.range(h * 0.3, h * 0.7);
                let size = rng.range(30.0, 80.0);
                ThemeShape { kind, x, y, size, color: i % palette_len }
            })
            .collect();

        Self { width: w, height: h, blobs, points, particles, shapes }
    }

    pub fn counts(&self) -> LayerCounts {
        LayerCounts {
            blobs: self.blobs.len(),
            polyline_points: self.points.len(),
            polyline_segments: self.points.len().saturating_sub(1),
            particles: self.particles.len(),
            shapes: self.shapes.len(),
        }
    }

    /// Rasterize the plan onto `surface`, layer by layer.
    pub fn render(&self, surface: &mut Surface, palette: &Palette) {
        let pixmap = surface.pixmap_mut();
        let identity = Transform::identity();

        // 1. background
        let bounds = Rect::from_xywh(0.0, 0.0, self.width as f32, self.height as f32);
        if let (Some(rect), Some(shader)) = (bounds, background_shader(self.width, self.height, palette)) {
            let paint = Paint { shader, anti_alias: true, ..Paint::default() };
            pixmap.fill_rect(rect, &paint, identity, None);
        }

        // 2. blobs
        for blob in &self.blobs {
            let rgb = palette.cycle(blob.color);
            let center = Point::from_xy(blob.x as f32, blob.y as f32);
            let stops = vec![
                GradientStop::new(0.0, with_alpha(rgb, BLOB_ALPHA)),
                GradientStop::new(1.0, with_alpha(rgb, 0.0)),
            ];
            let shader = RadialGradient::new(center, center, blob.radius as f32, stops, SpreadMode::Pad, identity);
            let path = PathBuilder::from_circle(center.x, center.y, blob.radius as f32);
            if let (Some(shader), Some(path)) = (shader, path) {
                let paint = Paint { shader, anti_alias: true, ..Paint::default() };
                pixmap.fill_path(&path, &paint, FillRule::Winding, identity, None);
            }
        }

        // 3. polyline, one stroke per segment
        let line_paint = solid_paint(Rgb::new(255, 255, 255), LINE_ALPHA);
        let line_stroke = Stroke { width: LINE_WIDTH, ..Stroke::default() };
        for pair in self.points.windows(2) {
            let mut pb = PathBuilder::new();
            pb.move_to(pair[0].0 as f32, pair[0].1 as f32);
            pb.line_to(pair[1].0 as f32, pair[1].1 as f32);
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &line_paint, &line_stroke, identity, None);
            }
        }

        // 4. particles
        for particle in &self.particles {
            let paint = solid_paint(palette.cycle(particle.color), PARTICLE_ALPHA);
            if let Some(path) = PathBuilder::from_circle(particle.x as f32, particle.y as f32, particle.size as f32) {
                pixmap.fill_path(&path, &paint, FillRule::Winding, identity, None);
            }
        }

        // 5. theme shapes, outlined
        let shape_stroke = Stroke { width: SHAPE_LINE_WIDTH, ..Stroke::default() };
        for shape in &self.shapes {
            let paint = solid_paint(palette.cycle(shape.color), SHAPE_ALPHA);
            if let Some(path) = shape_path(shape) {
                pixmap.stroke_path(&path, &paint, &shape_stroke, identity, None);
            }
        }
    }
}

/// Diagonal gradient, stops evenly spaced in palette order.
fn background_shader(width: f64, height: f64, palette: &Palette) -> Option<Shader<'static>> {
    let colors = palette.colors();
    if let [only] = colors {
        return Some(Shader::SolidColor(with_alpha(*only, BACKGROUND_ALPHA)));
    }

    let last = (colors.len() - 1) as f32;
    let stops = colors
        .iter()
        .enumerate()
        .map(|(i, &rgb)| GradientStop::new(i as f32 / last, with_alpha(rgb, BACKGROUND_ALPHA)))
        .collect();
    LinearGradient::new(
        Point::from_xy(0.0, 0.0),
        Point::from_xy(width as f32, height as f32),
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    )
}

fn shape_path(shape: &ThemeShape) -> Option<tiny_skia::Path> {
    let (x, y) = (shape.x as f32, shape.y as f32);
    let half = (shape.size / 2.0) as f32;
    match shape.kind {
        ShapeKind::Circle => PathBuilder::from_circle(x, y, half),
        ShapeKind::Triangle => {
            let mut pb = PathBuilder::new();
            pb.move_to(x, y - half);
            pb.line_to(x - half, y + half);
            pb.line_to(x + half, y + half);
            pb.close();
            pb.finish()
        }
        ShapeKind::Square => {
            Rect::from_xywh(x - half, y - half, shape.size as f32, shape.size as f32).map(PathBuilder::from_rect)
        }
    }
}

fn with_alpha(rgb: Rgb, alpha: f32) -> Color {
    let mut color = Color::from_rgba8(rgb.r, rgb.g, rgb.b, 255);
    color.set_alpha(alpha);
    color
}

fn solid_paint(rgb: Rgb, alpha: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(with_alpha(rgb, alpha));
    paint.anti_alias = true;
    paint
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(theme_count: usize, palette_len: usize) -> CompositionPlan {
        let mut rng = SeededRandom::new("layers");
        CompositionPlan::plan(800, 600, palette_len, theme_count, &mut rng)
    }

    #[test]
    fn test_counts_for_three_themes() {
        let counts = plan(3, 3).counts();
        assert_eq!(counts.blobs, 6);
        assert_eq!(counts.polyline_points, 3);
        assert_eq!(counts.polyline_segments, 2);
        assert_eq!(counts.particles, 20);
        assert_eq!(counts.shapes, 3);
    }

    #[test]
    fn test_counts_cap_at_ten_themes() {
        let counts = plan(10, 5).counts();
        assert_eq!(counts.blobs, 8);
        assert_eq!(counts.polyline_points, 6);
        assert_eq!(counts.shapes, 10);
    }

    #[test]
    fn test_zero_themes_only_particles() {
        let counts = plan(0, 1).counts();
        assert_eq!(counts.blobs, 0);
        assert_eq!(counts.polyline_points, 0);
        assert_eq!(counts.polyline_segments, 0);
        assert_eq!(counts.particles, 20);
        assert_eq!(counts.shapes, 0);
    }

    #[test]
    fn test_draw_order_of_first_blob() {
        let mut reference = SeededRandom::new("layers");
        let x = reference.range(800.0 * 0.2, 800.0 * 0.8);
        let y = reference.range(600.0 * 0.2, 600.0 * 0.8);
        let radius = reference.range(800.0 * 0.1, 800.0 * 0.3);
        let color = reference.index(2);

        let blob = &plan(1, 2).blobs[0];
        assert_eq!(blob, &Blob { x, y, radius, color });
    }

    #[test]
    fn test_consumes_fixed_number_of_draws() {
        // blobs 4 each, points 2 each, particles 4 each, shapes 4 each
        let mut rng = SeededRandom::new("layers");
        CompositionPlan::plan(100, 100, 2, 2, &mut rng);

        let mut reference = SeededRandom::new("layers");
        for _ in 0..(4 * 4 + 2 * 2 + 20 * 4 + 2 * 4) {
            reference.next();
        }
        assert_eq!(rng, reference);
    }

    #[test]
    fn test_items_within_bounds() {
        let p = plan(10, 5);
        for blob in &p.blobs {
            assert!((800.0 * 0.2..800.0 * 0.8).contains(&blob.x));
            assert!((600.0 * 0.2..600.0 * 0.8).contains(&blob.y));
            assert!((800.0 * 0.1..800.0 * 0.3).contains(&blob.radius));
            assert!(blob.color < 5);
        }
        for particle in &p.particles {
            assert!((2.0..6.0).contains(&particle.size));
        }
        for (i, shape) in p.shapes.iter().enumerate() {
            assert!((30.0..80.0).contains(&shape.size));
            assert_eq!(shape.color, i % 5);
        }
    }

    #[test]
    fn test_render_single_color_is_solid_background() {
        let palette = Palette::new(vec![Rgb::new(200, 100, 50)]).unwrap();
        let mut rng = SeededRandom::new("solid");
        let plan = CompositionPlan::plan(16, 16, 1, 0, &mut rng);
        let mut surface = Surface::acquire(16, 16, 8192).unwrap();
        plan.render(&mut surface, &palette);

        // every pixel covered by the 0.8 alpha fill at least
        assert!(surface.data().chunks_exact(4).all(|px| px[3] >= 200));
    }
}
