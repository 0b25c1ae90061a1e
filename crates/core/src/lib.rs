pub mod animator;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod event;
pub mod extremes;
pub mod face;
pub mod source;

pub use dispatch::{Cadence, Decision};
pub use driver::{Slot, TickDriver, MAX_FACES};
pub use error::{GaugeError, Result};
pub use event::Message;
pub use extremes::{RollingExtremes, Track, MAX_BUCKETS};
pub use face::{Face, FaceFlags, FaceSpec, MetricKind, Scale, ScaleGrowth};
pub use source::{Renderer, SampleSource};
