//! Needle geometry and a plain-text renderer.
//!
//! The core hands over animated values; this crate decides where on the dial
//! they land and how they are drawn.

use gauge_core::{Face, MetricKind, Renderer, Scale};
use std::io::Write;

/// Sweep of a gauge dial in degrees, centred on twelve o'clock.
pub const GAUGE_SWEEP: f64 = 270.0;
/// Clock-like faces use the whole circle.
pub const FULL_SWEEP: f64 = 360.0;

const BAR_WIDTH: usize = 20;

/// Where a value sits between `scale.min` (0.0) and `scale.max` (1.0).
pub fn fraction(value: i64, scale: Scale, reversed: bool) -> f64 {
    let span = scale.max as f64 - scale.min as f64;
    let f = if span <= 0.0 {
        0.0
    } else {
        ((value as f64 - scale.min as f64) / span).clamp(0.0, 1.0)
    };
    if reversed {
        1.0 - f
    } else {
        f
    }
}

/// Needle positions for one face, as fractions of the dial.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Needles {
    pub value: Option<f64>,
    pub secondary: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    /// Degrees covered by the full scale.
    pub sweep: f64,
}

impl Needles {
    pub fn from_face(face: &Face) -> Self {
        let scale = face.scale;
        let reversed = face.flags.reversed;
        let at = |v: Option<i64>| v.map(|v| fraction(v, scale, reversed));
        let sweep = match face.kind() {
            MetricKind::Clock | MetricKind::Stopwatch | MetricKind::MoonPhase => FULL_SWEEP,
            _ => GAUGE_SWEEP,
        };
        Self {
            value: at(face.needle()),
            secondary: at(face.secondary_needle()),
            max: at(face.max_needle()),
            min: at(face.min_needle()),
            sweep,
        }
    }

    /// Angle in degrees clockwise from twelve o'clock.
    pub fn angle(&self, fraction: f64) -> f64 {
        if self.sweep >= FULL_SWEEP {
            fraction * FULL_SWEEP
        } else {
            fraction * self.sweep - self.sweep / 2.0
        }
    }

    /// The arc between the min and max needles, when both are shown.
    pub fn hot_cold_arc(&self) -> Option<(f64, f64)> {
        match (self.min, self.max) {
            (Some(a), Some(b)) => Some((a.min(b), a.max(b))),
            _ => None,
        }
    }
}

/// Format a fixed-point raw value with `decimals` digits after the point.
pub fn format_value(value: i64, decimals: u32) -> String {
    let Some(unit) = 10u64.checked_pow(decimals).filter(|_| decimals > 0) else {
        return value.to_string();
    };
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    format!(
        "{sign}{}.{:0width$}",
        abs / unit,
        abs % unit,
        width = decimals as usize
    )
}

/// Writes one line per face each time a redraw is requested.
pub struct TextRenderer<W> {
    out: W,
    redraws: u64,
}

impl TextRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, redraws: 0 }
    }

    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(face: &Face) -> String {
        let needles = Needles::from_face(face);
        let decimals = face.decimals();

        let value = match face.needle() {
            Some(v) => format!("{}{}", format_value(v, decimals), face.unit),
            None => "--".to_string(),
        };

        let mut bar = vec!['.'; BAR_WIDTH];
        let cell = |f: f64| ((f * (BAR_WIDTH - 1) as f64).round() as usize).min(BAR_WIDTH - 1);
        if face.flags.hot_cold_arc {
            if let Some((lo, hi)) = needles.hot_cold_arc() {
                for c in &mut bar[cell(lo)..=cell(hi)] {
                    *c = '-';
                }
            }
        }
        if let Some(f) = needles.min {
            bar[cell(f)] = '<';
        }
        if let Some(f) = needles.max {
            bar[cell(f)] = '>';
        }
        if let Some(f) = needles.secondary {
            bar[cell(f)] = '+';
        }
        if let Some(f) = needles.value {
            bar[cell(f)] = '|';
        }
        let bar: String = bar.into_iter().collect();

        let mut line = format!("{:<12} {:>10} [{bar}]", face.title, value);
        if let Some(max) = face.max_needle() {
            line.push_str(&format!(" max {}", format_value(max, decimals)));
        }
        if let Some(min) = face.min_needle() {
            line.push_str(&format!(" min {}", format_value(min, decimals)));
        }
        if !face.value_text.is_empty() {
            line.push_str("  ");
            line.push_str(&face.value_text);
        }
        line
    }

    fn write_frame(&mut self, faces: &[Face]) -> std::io::Result<()> {
        for face in faces {
            writeln!(self.out, "{}", Self::line(face))?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn request_redraw(&mut self, faces: &[Face]) {
        self.redraws += 1;
        if let Err(e) = self.write_frame(faces) {
            tracing::warn!("Failed to draw faces: {e}");
        }
    }
}

impl<W> std::fmt::Debug for TextRenderer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("redraws", &self.redraws)
            .finish_non_exhaustive()
    }
}
