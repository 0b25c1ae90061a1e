use chrono::{DateTime, Local, Timelike, Utc};
use chrono_tz::Tz;
use gauge_core::{Face, MetricKind, SampleSource};

/// Hour and minute hand positions on a 720-unit dial (one unit per minute
/// for the hour hand, per five seconds for the minute hand).
pub fn hands(hour: u32, minute: u32, second: u32) -> (i64, i64) {
    let hour_hand = (hour % 12) * 60 + minute;
    let minute_hand = minute * 12 + second / 5;
    (i64::from(hour_hand), i64::from(minute_hand))
}

/// Wall-clock time, optionally in another time zone.
#[derive(Debug)]
pub struct ClockSource {
    zone: Option<Tz>,
}

impl ClockSource {
    pub fn new(zone: Option<Tz>) -> Self {
        Self { zone }
    }

    fn sample_at(&self, face: &mut Face, now: DateTime<Utc>) {
        let (h, m, s, label) = match self.zone {
            Some(tz) => {
                let t = now.with_timezone(&tz);
                (t.hour(), t.minute(), t.second(), tz.name().to_string())
            }
            None => {
                let t = now.with_timezone(&Local);
                (t.hour(), t.minute(), t.second(), t.format("%Z").to_string())
            }
        };
        let (hour_hand, minute_hand) = hands(h, m, s);

        // Passing twelve (or the top of the hour) would otherwise sweep the
        // needle backwards round the dial; jump instead.
        if face.raw.is_some_and(|prev| hour_hand < prev) {
            face.shown = None;
        }
        if face.secondary_raw.is_some_and(|prev| minute_hand < prev) {
            face.secondary_shown = None;
        }

        face.raw = Some(hour_hand);
        face.secondary_raw = Some(minute_hand);
        face.value_text = format!("{h:02}:{m:02}:{s:02} {label}");
    }
}

impl SampleSource for ClockSource {
    fn kind(&self) -> MetricKind {
        MetricKind::Clock
    }

    fn sample(&mut self, face: &mut Face, _tick: u64) {
        self.sample_at(face, Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gauge_core::FaceSpec;

    #[test]
    fn hand_positions() {
        assert_eq!(hands(0, 0, 0), (0, 0));
        assert_eq!(hands(15, 30, 0), (210, 360));
        assert_eq!(hands(23, 59, 59), (719, 719));
    }

    #[test]
    fn reads_time_in_zone() {
        let src = ClockSource::new(Some(chrono_tz::Asia::Tokyo));
        let mut face = Face::new(FaceSpec::new(MetricKind::Clock));
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 3, 15, 10).unwrap();
        src.sample_at(&mut face, now);
        // 03:15 UTC is 12:15 in Tokyo.
        assert_eq!(face.raw, Some(15));
        assert_eq!(face.secondary_raw, Some(182));
        assert_eq!(face.value_text, "12:15:10 Asia/Tokyo");
    }

    #[test]
    fn wrapping_hand_jumps_instead_of_sweeping_back() {
        let src = ClockSource::new(Some(chrono_tz::UTC));
        let mut face = Face::new(FaceSpec::new(MetricKind::Clock));
        src.sample_at(&mut face, Utc.with_ymd_and_hms(2024, 3, 1, 11, 59, 55).unwrap());
        face.advance(std::time::Instant::now());
        assert_eq!(face.shown, Some(719));

        src.sample_at(&mut face, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap());
        face.advance(std::time::Instant::now());
        assert_eq!(face.shown, Some(0));
        assert_eq!(face.secondary_shown, Some(1));
    }
}
