use std::f32::consts::PI;

use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, Path, PathBuilder, Pixmap, Point, Rect,
    SpreadMode, Stroke, Transform,
};

use crate::{
    analysis::{ArtConfig, PatternFlags, Rgb},
    config::CanvasConfig,
    DreamCanvasError, Result,
};

/// Distance in pixels at which the pointer stops influencing circles.
pub const CIRCLE_POINTER_REACH: f32 = 150.0;
/// Distance in pixels at which the pointer stops influencing stars.
pub const STAR_POINTER_REACH: f32 = 200.0;

/// Last-known pointer position in surface-local coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Per-call inputs shared by every draw routine. The routines keep no
/// state of their own between frames; all motion derives from `time_ms`.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub pointer: PointerState,
    pub time_ms: f64,
}

impl FrameContext {
    pub fn new(pointer: PointerState, time_ms: f64) -> Self {
        Self { pointer, time_ms }
    }
}

/// The closed set of pattern families the renderer can paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Circles,
    Lines,
    Spirals,
    Waves,
    Stars,
}

impl PatternKind {
    /// Every pattern kind in paint order. Order matters: later kinds land
    /// on top of earlier ones.
    pub const ALL: [PatternKind; 5] = [
        PatternKind::Circles,
        PatternKind::Lines,
        PatternKind::Spirals,
        PatternKind::Waves,
        PatternKind::Stars,
    ];

    /// Whether this kind is switched on by the given flags.
    pub fn enabled(self, flags: &PatternFlags) -> bool {
        match self {
            PatternKind::Circles => flags.circles,
            PatternKind::Lines => flags.lines,
            PatternKind::Spirals => flags.spirals,
            PatternKind::Waves => flags.waves,
            PatternKind::Stars => flags.stars,
        }
    }

    /// Number of elements this kind paints at the given complexity,
    /// `floor(complexity * scale) + base` with fixed per-kind constants.
    pub fn element_count(self, complexity: f32) -> usize {
        let (scale, base) = match self {
            PatternKind::Circles => (8.0, 3),
            PatternKind::Lines => (8.0, 2),
            PatternKind::Spirals => (4.0, 1),
            PatternKind::Waves => (3.0, 1),
            PatternKind::Stars => (15.0, 5),
        };
        (complexity * scale).floor() as usize + base
    }

    fn draw(self, pixmap: &mut Pixmap, config: &ArtConfig, frame: &FrameContext) {
        match self {
            PatternKind::Circles => draw_circles(pixmap, config, frame),
            PatternKind::Lines => draw_lines(pixmap, config, frame),
            PatternKind::Spirals => draw_spirals(pixmap, config, frame),
            PatternKind::Waves => draw_waves(pixmap, config, frame),
            PatternKind::Stars => draw_stars(pixmap, config, frame),
        }
    }
}

/// Allocates the raster surface described by `config`.
pub fn create_surface(config: &CanvasConfig) -> Result<Pixmap> {
    Pixmap::new(config.width, config.height)
        .ok_or(DreamCanvasError::InvalidInput(
            "canvas dimensions must be non-zero",
        ))
}

/// Paints one complete frame: the background gradient first (the surface
/// must never show through), then every enabled pattern kind in order.
pub fn render_frame(pixmap: &mut Pixmap, config: &ArtConfig, frame: &FrameContext) {
    let (Some(first), Some(last)) = (config.colors.first(), config.colors.last()) else {
        return;
    };
    paint_background(pixmap, *first, *last);

    for kind in PatternKind::ALL {
        if kind.enabled(&config.patterns) {
            kind.draw(pixmap, config, frame);
        }
    }
}

/// Pointer proximity term in [0, 1]: 1 at the pointer, fading linearly to
/// 0 at `reach` pixels and beyond.
pub fn pointer_influence(dx: f32, dy: f32, reach: f32) -> f32 {
    let distance = (dx * dx + dy * dy).sqrt();
    (1.0 - distance / reach).max(0.0)
}

/// Radius multiplier for circles: full pointer influence adds 80%, the
/// idle pulse contributes the remaining motion.
pub fn circle_scale(influence: f32, pulse: f32) -> f32 {
    1.0 + influence * 0.8 + pulse * 0.2
}

/// Radius multiplier for stars.
pub fn star_scale(influence: f32) -> f32 {
    1.0 + influence * 0.5
}

fn paint_background(pixmap: &mut Pixmap, start: Rgb, end: Rgb) {
    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;

    let shader = LinearGradient::new(
        Point::from_xy(0.0, 0.0),
        Point::from_xy(width, height),
        vec![
            GradientStop::new(0.0, tint(start, 1.0)),
            GradientStop::new(1.0, tint(end, 1.0)),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    );

    match shader {
        Some(shader) => {
            let mut paint = Paint::default();
            paint.shader = shader;
            if let Some(rect) = Rect::from_xywh(0.0, 0.0, width, height) {
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }
        None => pixmap.fill(tint(start, 1.0)),
    }
}

fn draw_circles(pixmap: &mut Pixmap, config: &ArtConfig, frame: &FrameContext) {
    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;
    let count = PatternKind::Circles.element_count(config.complexity);
    let t = frame.time_ms;

    for i in 0..count {
        let x = (width / count as f32) * i as f32 + sin_phase(t, 0.0003, i) * 30.0;
        let y = height / 2.0 + cos_phase(t, 0.0002, i) * 20.0;
        let base_radius = 15.0 + config.intensity * 25.0;

        let influence = pointer_influence(
            x - frame.pointer.x,
            y - frame.pointer.y,
            CIRCLE_POINTER_REACH,
        );
        let pulse = sin_phase(t, 0.0008, i) * 0.1 + 0.9;
        let radius = base_radius * circle_scale(influence, pulse);
        let alpha = 0.2 + config.intensity * 0.3 + influence * 0.4;

        fill_circle(pixmap, x, y, radius, palette_color(config, i), alpha);
    }
}

fn draw_lines(pixmap: &mut Pixmap, config: &ArtConfig, frame: &FrameContext) {
    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;
    let count = PatternKind::Lines.element_count(config.complexity);
    let t = frame.time_ms;

    for i in 0..count {
        let start_x = (width / count as f32) * i as f32;
        let start_y = height * 0.3 + sin_phase(t, 0.0002, i) * 50.0;
        let end_x = start_x + cos_phase(t, 0.0003, i) * 100.0;
        let end_y = height * 0.7 + sin_phase(t, 0.0002, i) * 50.0;

        let mut pb = PathBuilder::new();
        pb.move_to(start_x, start_y);
        pb.line_to(end_x, end_y);
        let Some(path) = pb.finish() else { continue };

        stroke_path(
            pixmap,
            &path,
            palette_color(config, i),
            0.3 + config.intensity * 0.2,
            1.5 + config.intensity * 2.0,
        );
    }
}

fn draw_spirals(pixmap: &mut Pixmap, config: &ArtConfig, frame: &FrameContext) {
    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;
    let count = PatternKind::Spirals.element_count(config.complexity);
    let t = frame.time_ms;

    for i in 0..count {
        let center_x = (width / count as f32) * i as f32 + width / (count as f32 * 2.0);
        let center_y = height / 2.0;

        let mut pb = PathBuilder::new();
        pb.move_to(center_x, center_y);

        let mut angle: f32 = 0.0;
        while angle < PI * 3.0 {
            let radius = angle * 1.5 + sin_phase(t, 0.0005, i) * 10.0;
            pb.line_to(
                center_x + angle.cos() * radius,
                center_y + angle.sin() * radius,
            );
            angle += 0.15;
        }
        let Some(path) = pb.finish() else { continue };

        stroke_path(
            pixmap,
            &path,
            palette_color(config, i),
            0.2 + config.intensity * 0.3,
            1.0 + config.intensity * 1.5,
        );
    }
}

fn draw_waves(pixmap: &mut Pixmap, config: &ArtConfig, frame: &FrameContext) {
    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;
    let count = PatternKind::Waves.element_count(config.complexity);
    let t = frame.time_ms;

    for i in 0..count {
        let mut pb = PathBuilder::new();
        pb.move_to(0.0, height / 2.0);

        // Two stacked sinusoids at different spatial frequencies; 8 px
        // steps keep the polyline smooth without overloading the path.
        let mut x: f32 = 0.0;
        while x < width {
            let slow = ((x as f64) * 0.008 + (t * 0.0003 + i as f64)).sin() as f32
                * (20.0 + config.intensity * 30.0);
            let fast = ((x as f64) * 0.015 + (t * 0.0005 + i as f64)).sin() as f32
                * (8.0 + config.intensity * 12.0);
            pb.line_to(x, height / 2.0 + slow + fast);
            x += 8.0;
        }
        let Some(path) = pb.finish() else { continue };

        stroke_path(
            pixmap,
            &path,
            palette_color(config, i),
            0.3 + config.intensity * 0.2,
            1.5 + config.intensity * 2.0,
        );
    }
}

fn draw_stars(pixmap: &mut Pixmap, config: &ArtConfig, frame: &FrameContext) {
    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;
    let count = PatternKind::Stars.element_count(config.complexity);
    let t = frame.time_ms;

    for i in 0..count {
        let x = (width / count as f32) * i as f32 + sin_phase(t, 0.0005, i) * 20.0;
        let y = height * 0.3 + cos_phase(t, 0.0003, i) * 15.0;
        let base_size = 1.5 + config.intensity * 2.0;

        let influence =
            pointer_influence(x - frame.pointer.x, y - frame.pointer.y, STAR_POINTER_REACH);
        let twinkle = sin_phase(t, 0.001, i) * 0.2 + 0.8;
        let radius = base_size * star_scale(influence);
        let alpha = 0.4 + twinkle * 0.2 + influence * 0.3;

        fill_circle(pixmap, x, y, radius, palette_color(config, i), alpha);
    }
}

fn palette_color(config: &ArtConfig, index: usize) -> Rgb {
    config.colors[index % config.colors.len()]
}

fn sin_phase(time_ms: f64, rate: f64, index: usize) -> f32 {
    (time_ms * rate + index as f64).sin() as f32
}

fn cos_phase(time_ms: f64, rate: f64, index: usize) -> f32 {
    (time_ms * rate + index as f64).cos() as f32
}

fn fill_circle(pixmap: &mut Pixmap, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32) {
    let mut pb = PathBuilder::new();
    pb.push_circle(x, y, radius);
    let Some(path) = pb.finish() else { return };

    let mut paint = Paint::default();
    paint.set_color(tint(color, alpha));
    paint.anti_alias = true;
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn stroke_path(pixmap: &mut Pixmap, path: &Path, color: Rgb, alpha: f32, width: f32) {
    let mut paint = Paint::default();
    paint.set_color(tint(color, alpha));
    paint.anti_alias = true;

    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    pixmap.stroke_path(path, &paint, &stroke, Transform::identity(), None);
}

fn tint(color: Rgb, alpha: f32) -> Color {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::from_rgba8(color.r, color.g, color.b, a)
}
