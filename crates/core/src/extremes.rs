//! Rolling maximum/minimum over a fixed number of timed buckets.
//!
//! Every bucket covers `interval` of wall-clock time. Only the bucket under
//! the cursor receives observations; when its time is up the cursor moves on
//! and the next bucket is cleared for reuse. The aggregate over all active
//! buckets is animated with [`crate::animator::slide`] before it is shown.

use crate::animator;
use std::time::{Duration, Instant};

/// Capacity of the bucket ring.
pub const MAX_BUCKETS: usize = 24;

/// Which extremes a face wants tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Track {
    pub max: bool,
    pub min: bool,
}

impl Track {
    pub const BOTH: Self = Self { max: true, min: true };

    pub fn any(self) -> bool {
        self.max || self.min
    }
}

#[derive(Debug, Clone)]
pub struct RollingExtremes {
    active: usize,
    interval: Duration,
    max_buckets: [Option<i64>; MAX_BUCKETS],
    min_buckets: [Option<i64>; MAX_BUCKETS],
    cursor: usize,
    next_rotate_at: Option<Instant>,
    shown_max: Option<i64>,
    shown_min: Option<i64>,
}

impl RollingExtremes {
    /// `active` is clamped to `1..=MAX_BUCKETS` and `interval` to at least one
    /// second; callers validate configuration before getting here.
    pub fn new(active: usize, interval: Duration) -> Self {
        Self {
            active: active.clamp(1, MAX_BUCKETS),
            interval: interval.max(Duration::from_secs(1)),
            max_buckets: [None; MAX_BUCKETS],
            min_buckets: [None; MAX_BUCKETS],
            cursor: 0,
            next_rotate_at: None,
            shown_max: None,
            shown_min: None,
        }
    }

    /// Forget everything. The next observation seeds the shown extremes.
    pub fn reset(&mut self) {
        self.max_buckets = [None; MAX_BUCKETS];
        self.min_buckets = [None; MAX_BUCKETS];
        self.cursor = 0;
        self.next_rotate_at = None;
        self.shown_max = None;
        self.shown_min = None;
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn shown_max(&self) -> Option<i64> {
        self.shown_max
    }

    pub fn shown_min(&self) -> Option<i64> {
        self.shown_min
    }

    /// Largest value held by any active bucket.
    pub fn aggregate_max(&self) -> Option<i64> {
        self.max_buckets[..self.active].iter().flatten().copied().max()
    }

    /// Smallest value held by any active bucket.
    pub fn aggregate_min(&self) -> Option<i64> {
        self.min_buckets[..self.active].iter().flatten().copied().min()
    }

    /// Record `value` (the face's current shown value) at time `now`.
    ///
    /// Returns `true` when the shown max or min moved.
    pub fn observe(&mut self, now: Instant, value: i64, track: Track) -> bool {
        self.rotate(now);

        if track.max {
            let slot = &mut self.max_buckets[self.cursor];
            if slot.map_or(true, |m| value > m) {
                *slot = Some(value);
            }
        }
        if track.min {
            let slot = &mut self.min_buckets[self.cursor];
            if slot.map_or(true, |m| value < m) {
                *slot = Some(value);
            }
        }

        let before = (self.shown_max, self.shown_min);

        self.shown_max = if track.max {
            match (self.shown_max, self.aggregate_max()) {
                (None, _) => Some(value),
                (Some(shown), Some(target)) => Some(animator::slide(shown, target).max(value)),
                (Some(shown), None) => Some(shown.max(value)),
            }
        } else {
            None
        };

        self.shown_min = if track.min {
            match (self.shown_min, self.aggregate_min()) {
                (None, _) => Some(value),
                (Some(shown), Some(target)) => Some(animator::slide(shown, target).min(value)),
                (Some(shown), None) => Some(shown.min(value)),
            }
        } else {
            None
        };

        before != (self.shown_max, self.shown_min)
    }

    /// Close the open bucket for every interval that has elapsed.
    fn rotate(&mut self, now: Instant) {
        let Some(due) = self.next_rotate_at else {
            self.next_rotate_at = Some(now + self.interval);
            return;
        };
        if now < due {
            return;
        }

        // After a long gap every bucket is stale; one lap clears them all.
        let overdue = now.duration_since(due).as_secs() / self.interval.as_secs().max(1);
        let rotations = (overdue as usize).saturating_add(1).min(self.active);

        for _ in 0..rotations {
            self.cursor = (self.cursor + 1) % self.active;
            self.max_buckets[self.cursor] = None;
            self.min_buckets[self.cursor] = None;
        }
        self.next_rotate_at = Some(now + self.interval);
    }
}

impl Default for RollingExtremes {
    fn default() -> Self {
        Self::new(12, Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    /// Observe the same value until the shown extremes settle.
    fn settle(tracker: &mut RollingExtremes, at: Instant, value: i64) {
        for _ in 0..64 {
            if !tracker.observe(at, value, Track::BOTH) {
                return;
            }
        }
        panic!("extremes never settled");
    }

    #[test]
    fn first_observation_seeds_without_animation() {
        let mut t = RollingExtremes::new(4, secs(2));
        assert!(t.observe(Instant::now(), 70, Track::BOTH));
        assert_eq!(t.shown_max(), Some(70));
        assert_eq!(t.shown_min(), Some(70));
    }

    #[test]
    fn untracked_extremes_stay_absent() {
        let mut t = RollingExtremes::new(4, secs(2));
        t.observe(Instant::now(), 10, Track { max: true, min: false });
        assert_eq!(t.shown_max(), Some(10));
        assert_eq!(t.shown_min(), None);
    }

    #[test]
    fn window_keeps_only_recent_buckets() {
        let start = Instant::now();
        let mut t = RollingExtremes::new(4, secs(2));

        // One observation per second: rising to 100 over the first 10 s,
        // then falling back to 40 by second 16.
        let mut now = start;
        for second in 0..=16u64 {
            now = start + secs(second);
            let value = if second <= 10 { second as i64 * 10 } else { 100 - (second as i64 - 10) * 10 };
            t.observe(now, value, Track::BOTH);
        }
        settle(&mut t, now, 40);

        // Rotations happened at 2, 4, .. 16 s; the four live buckets opened
        // at 10, 12, 14 and 16 s.
        assert_eq!(t.aggregate_max(), Some(100));
        assert_eq!(t.shown_max(), Some(100));
        assert_eq!(t.shown_min(), Some(40));

        // Let the bucket holding the peak age out.
        for second in 17..=24u64 {
            now = start + secs(second);
            t.observe(now, 40, Track::BOTH);
        }
        settle(&mut t, now, 40);
        assert_eq!(t.aggregate_max(), Some(40));
        assert_eq!(t.shown_max(), Some(40));
        assert_eq!(t.shown_min(), Some(40));
    }

    #[test]
    fn long_gap_clears_every_bucket() {
        let start = Instant::now();
        let mut t = RollingExtremes::new(6, secs(2));
        t.observe(start, 95, Track::BOTH);
        t.observe(start + secs(1), 5, Track::BOTH);

        t.observe(start + secs(600), 50, Track::BOTH);
        assert_eq!(t.aggregate_max(), Some(50));
        assert_eq!(t.aggregate_min(), Some(50));
    }

    #[test]
    fn shown_extremes_bracket_the_value() {
        let start = Instant::now();
        let mut t = RollingExtremes::new(3, secs(1));
        let values = [50, 90, 10, 200, -40, 60, 60, 0, 300, 299, 1, 75];

        for (i, &v) in values.iter().cycle().take(120).enumerate() {
            t.observe(start + Duration::from_millis(i as u64 * 350), v, Track::BOTH);
            let (max, min) = (t.shown_max().unwrap(), t.shown_min().unwrap());
            assert!(max >= v && v >= min, "max {max} value {v} min {min}");
        }
    }

    #[test]
    fn max_needle_animates_down_after_expiry() {
        let start = Instant::now();
        let mut t = RollingExtremes::new(1, secs(1));
        t.observe(start, 100, Track::BOTH);

        // Single bucket: the next rotation drops the peak. The shown max
        // then halves its way down instead of jumping.
        t.observe(start + secs(1), 0, Track::BOTH);
        assert_eq!(t.aggregate_max(), Some(0));
        assert_eq!(t.shown_max(), Some(49));
    }

    #[test]
    fn reset_reseeds() {
        let mut t = RollingExtremes::new(4, secs(2));
        let now = Instant::now();
        t.observe(now, 80, Track::BOTH);
        t.reset();
        assert_eq!(t.shown_max(), None);
        t.observe(now, 3, Track::BOTH);
        assert_eq!(t.shown_max(), Some(3));
        assert_eq!(t.shown_min(), Some(3));
    }
}
