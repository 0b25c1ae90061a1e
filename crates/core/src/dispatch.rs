//! Decides, tick by tick, which faces fetch a fresh sample.

use crate::face::Face;
use crate::source::SampleSource;
use tracing::debug;

/// How often a face is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Fetch when `tick % n == 0`. Every face of the kind samples in the same
    /// tick, so shared data is refreshed once.
    EveryNthTick(u32),
    /// Fetch once every `n` ticks, counted per face. Faces of the same kind
    /// drift apart instead of all fetching together.
    Countdown(u32),
}

impl Cadence {
    /// Period in ticks, never zero.
    pub fn period(self) -> u32 {
        match self {
            Self::EveryNthTick(n) | Self::Countdown(n) => n.max(1),
        }
    }

    /// Same discipline with a different period.
    pub fn with_period(self, n: u32) -> Self {
        match self {
            Self::EveryNthTick(_) => Self::EveryNthTick(n),
            Self::Countdown(_) => Self::Countdown(n),
        }
    }
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Fetch,
    /// Fetched because the face asked for it, whatever the cadence said.
    Forced,
}

impl Decision {
    pub fn fetched(self) -> bool {
        !matches!(self, Self::Skip)
    }
}

/// Whether `face` should fetch on `tick`. Updates the face's countdown and
/// clears a pending force flag.
pub fn decide(face: &mut Face, tick: u64) -> Decision {
    let cadence = face.cadence();
    let period = cadence.period();

    if face.flags.force_redraw {
        face.flags.force_redraw = false;
        if let Cadence::Countdown(_) = cadence {
            face.countdown = period;
        }
        return Decision::Forced;
    }

    match cadence {
        Cadence::EveryNthTick(_) => {
            if tick % u64::from(period) == 0 {
                Decision::Fetch
            } else {
                Decision::Skip
            }
        }
        Cadence::Countdown(_) => {
            face.countdown = face.countdown.saturating_sub(1);
            if face.countdown == 0 {
                face.countdown = period;
                Decision::Fetch
            } else {
                Decision::Skip
            }
        }
    }
}

/// Run `source` for `face` if this tick is due.
///
/// When a sample changes the face's scale, unit or fixed-point mode, the
/// collected extremes no longer mean anything: the tracker is reset and the
/// face is flagged for a forced refresh on the next tick.
pub fn dispatch(face: &mut Face, source: &mut dyn SampleSource, tick: u64) -> Decision {
    let decision = decide(face, tick);
    if !decision.fetched() {
        return decision;
    }

    let before = face.display_params();
    source.sample(face, tick);
    face.last_dispatched_tick = Some(tick);

    if face.display_params() != before {
        debug!(face = %face.title, tick, "display parameters changed; resetting extremes");
        face.extremes.reset();
        face.flags.force_redraw = true;
    }
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::{FaceSpec, MetricKind, ScaleGrowth};
    use std::time::Instant;

    fn face_with(cadence: Cadence) -> Face {
        let mut spec = FaceSpec::new(MetricKind::External);
        spec.cadence = cadence;
        let mut face = Face::new(spec);
        face.flags.force_redraw = false;
        face
    }

    #[derive(Debug, Default)]
    struct Counting {
        calls: Vec<u64>,
        next: Vec<i64>,
    }

    impl SampleSource for Counting {
        fn kind(&self) -> MetricKind {
            MetricKind::External
        }

        fn sample(&mut self, face: &mut Face, tick: u64) {
            self.calls.push(tick);
            if let Some(v) = self.next.pop() {
                face.raw = Some(v);
                face.grow_scale_to_fit(v);
            }
        }
    }

    #[test]
    fn modulus_cadence_is_deterministic() {
        for p in [2u32, 5, 10, 15, 25, 50, 60] {
            let mut face = face_with(Cadence::EveryNthTick(p));
            let fetched: Vec<u64> = (0..300)
                .filter(|&t| decide(&mut face, t).fetched())
                .collect();
            let expected: Vec<u64> = (0..300).filter(|t| t % u64::from(p) == 0).collect();
            assert_eq!(fetched, expected, "period {p}");
        }
    }

    #[test]
    fn modulus_ignores_tick_magnitude() {
        let mut face = face_with(Cadence::EveryNthTick(10));
        assert!(decide(&mut face, u64::MAX - 5).fetched());
        assert!(!decide(&mut face, u64::MAX).fetched());
    }

    #[test]
    fn countdown_fetches_every_n_ticks() {
        let mut face = face_with(Cadence::Countdown(4));
        let fetched: Vec<u64> = (0..13).filter(|&t| decide(&mut face, t).fetched()).collect();
        assert_eq!(fetched, vec![0, 4, 8, 12]);
    }

    #[test]
    fn countdown_faces_drift_apart() {
        let mut a = face_with(Cadence::Countdown(5));
        let mut b = face_with(Cadence::Countdown(5));
        decide(&mut a, 0);
        decide(&mut b, 0);
        // `b` is refreshed by hand on ticks 1 and 2 and keeps its own phase.
        b.request_refresh();
        let mut a_ticks = vec![];
        let mut b_ticks = vec![];
        for t in 1..12 {
            if decide(&mut a, t).fetched() {
                a_ticks.push(t);
            }
            if t == 2 {
                b.request_refresh();
            }
            if decide(&mut b, t).fetched() {
                b_ticks.push(t);
            }
        }
        assert_eq!(a_ticks, vec![5, 10]);
        assert_eq!(b_ticks, vec![1, 2, 7]);
    }

    #[test]
    fn force_overrides_cadence_once() {
        let mut face = face_with(Cadence::EveryNthTick(60));
        face.request_refresh();
        assert_eq!(decide(&mut face, 7), Decision::Forced);
        assert!(!face.flags.force_redraw);
        assert_eq!(decide(&mut face, 8), Decision::Skip);
    }

    #[test]
    fn dispatch_records_tick_and_skips_source() {
        let mut face = face_with(Cadence::EveryNthTick(10));
        let mut src = Counting::default();
        for t in 0..25 {
            dispatch(&mut face, &mut src, t);
        }
        assert_eq!(src.calls, vec![0, 10, 20]);
        assert_eq!(face.last_dispatched_tick, Some(20));
    }

    #[test]
    fn rescale_resets_extremes_and_forces_refresh() {
        let mut spec = FaceSpec::new(MetricKind::External);
        spec.cadence = Cadence::EveryNthTick(10);
        spec.growth = ScaleGrowth::Step(25);
        let mut face = Face::new(spec);
        let mut src = Counting { next: vec![130, 60], ..Counting::default() };
        let now = Instant::now();

        dispatch(&mut face, &mut src, 0);
        face.advance(now);
        assert_eq!(face.extremes.shown_max(), Some(60));
        assert!(!face.flags.force_redraw);

        dispatch(&mut face, &mut src, 10);
        assert_eq!(face.scale.max, 150);
        assert_eq!(face.extremes.shown_max(), None);
        assert!(face.flags.force_redraw);
        assert_eq!(dispatch(&mut face, &mut src, 11), Decision::Forced);
    }
}
