use gauge_core::{Face, MetricKind, SampleSource};
use std::time::Instant;

/// Elapsed time since the face was set up: seconds on the primary needle,
/// minutes on the secondary, both on a 60-unit dial.
#[derive(Debug)]
pub struct StopwatchSource {
    started: Instant,
}

impl StopwatchSource {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(started: Instant) -> Self {
        Self { started }
    }

    fn sample_at(&self, face: &mut Face, now: Instant) {
        let total = now.saturating_duration_since(self.started).as_secs();
        let seconds = (total % 60) as i64;
        let minutes = ((total / 60) % 60) as i64;

        if face.raw.is_some_and(|prev| seconds < prev) {
            face.shown = None;
        }
        if face.secondary_raw.is_some_and(|prev| minutes < prev) {
            face.secondary_shown = None;
        }

        face.raw = Some(seconds);
        face.secondary_raw = Some(minutes);
        face.value_text = format!("{}:{minutes:02}:{seconds:02}", total / 3600);
    }
}

impl Default for StopwatchSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for StopwatchSource {
    fn kind(&self) -> MetricKind {
        MetricKind::Stopwatch
    }

    fn sample(&mut self, face: &mut Face, _tick: u64) {
        self.sample_at(face, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_core::FaceSpec;
    use std::time::Duration;

    #[test]
    fn splits_elapsed_time() {
        let start = Instant::now();
        let src = StopwatchSource::started_at(start);
        let mut face = Face::new(FaceSpec::new(MetricKind::Stopwatch));
        src.sample_at(&mut face, start + Duration::from_secs(3_725));
        assert_eq!(face.raw, Some(5));
        assert_eq!(face.secondary_raw, Some(2));
        assert_eq!(face.value_text, "1:02:05");
    }
}
