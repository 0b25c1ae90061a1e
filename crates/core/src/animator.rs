//! Needle animation: moves a shown value toward its target a step per tick.
//!
//! Gaps wider than twice [`SNAP_THRESHOLD`] are halved each tick, so the
//! needle decelerates as it nears the target. Smaller gaps close at once.

/// Largest half-step that is still closed in a single tick.
pub const SNAP_THRESHOLD: i64 = 12;

/// Next shown value on the way from `shown` to `target`.
///
/// Never overshoots, and reaches `target` in roughly `log2(|target - shown|)`
/// calls.
#[must_use]
pub fn slide(shown: i64, target: i64) -> i64 {
    let step = target.saturating_sub(shown);
    if step == 0 {
        return shown;
    }

    // Rounded away from zero, so a non-zero gap never yields a zero half-step.
    let half = step / 2 + step.signum();
    if half.abs() > SNAP_THRESHOLD {
        shown + half
    } else {
        shown + step
    }
}

/// [`slide`] lifted over absent values.
///
/// An absent target leaves `shown` where it is. An absent `shown` is seeded
/// straight to the target, so needles never animate in from a meaningless
/// default.
#[must_use]
pub fn advance(shown: Option<i64>, target: Option<i64>) -> Option<i64> {
    match (shown, target) {
        (_, None) => shown,
        (None, Some(t)) => Some(t),
        (Some(s), Some(t)) => Some(slide(s, t)),
    }
}
