use crate::face::{Face, MetricKind};

/// Produces raw samples for one face.
///
/// `sample` runs inside the tick and must not block: a source whose data
/// is slow to obtain publishes it from a background task and only reads the
/// latest published value here. When nothing new is available it leaves the
/// face untouched, or writes `None` to hide the needle.
pub trait SampleSource: Send + std::fmt::Debug {
    /// Metric this source serves.
    fn kind(&self) -> MetricKind;

    /// Write `raw`/`secondary_raw` and display strings into `face`.
    ///
    /// May call [`Face::grow_scale_to_fit`] when a value overflows the scale.
    fn sample(&mut self, face: &mut Face, tick: u64);
}

/// Receives the coalesced "something changed" notification.
pub trait Renderer {
    /// Called at most once per tick, after every face has been advanced.
    fn request_redraw(&mut self, faces: &[Face]);
}
