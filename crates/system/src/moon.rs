use chrono::{DateTime, TimeZone, Utc};
use gauge_core::{Face, MetricKind, SampleSource};
use std::f64::consts::TAU;

/// Mean length of a lunation in days.
pub const SYNODIC_MONTH: f64 = 29.530_588_853;

const PHASES: [&str; 8] = [
    "New moon",
    "Waxing crescent",
    "First quarter",
    "Waxing gibbous",
    "Full moon",
    "Waning gibbous",
    "Last quarter",
    "Waning crescent",
];

/// A new moon to count lunations from: 2000-01-06 18:14 UTC.
fn reference_new_moon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 6, 18, 14, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Days since the last new moon, in `[0, SYNODIC_MONTH)`.
pub fn moon_age(at: DateTime<Utc>) -> f64 {
    let days = (at - reference_new_moon()).num_seconds() as f64 / 86_400.0;
    days.rem_euclid(SYNODIC_MONTH)
}

/// Fraction of the disc lit, 0 (new) to 1 (full).
pub fn illumination(age: f64) -> f64 {
    (1.0 - (TAU * age / SYNODIC_MONTH).cos()) / 2.0
}

pub fn phase_name(age: f64) -> &'static str {
    let sector = (age / SYNODIC_MONTH * 8.0 + 0.5).floor() as usize % 8;
    PHASES[sector]
}

/// Age of the moon in tenths of a day.
#[derive(Debug, Default)]
pub struct MoonSource;

impl MoonSource {
    pub fn new() -> Self {
        Self
    }

    fn sample_at(&self, face: &mut Face, at: DateTime<Utc>) {
        let age = moon_age(at);
        let raw = (age * 10.0).round() as i64;
        if face.raw.is_some_and(|prev| raw < prev) {
            face.shown = None;
        }
        face.raw = Some(raw);
        face.value_text = format!(
            "{} {:.0}% lit",
            phase_name(age),
            illumination(age) * 100.0
        );
    }
}

impl SampleSource for MoonSource {
    fn kind(&self) -> MetricKind {
        MetricKind::MoonPhase
    }

    fn sample(&mut self, face: &mut Face, _tick: u64) {
        self.sample_at(face, Utc::now());
    }
}
