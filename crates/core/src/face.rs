use crate::dispatch::Cadence;
use crate::extremes::{RollingExtremes, Track};
use crate::animator;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Every metric a face can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// CPU load in percent. `sub_kind` 0 = all CPUs, n = CPU n-1.
    Cpu,
    /// RAM in use, percent.
    Memory,
    /// Swap in use, percent.
    Swap,
    /// Load average in hundredths; secondary needle is the 5-minute figure.
    LoadAverage,
    /// Battery charge, percent.
    Battery,
    /// Space used on a mounted filesystem, percent. `sub_kind` picks the disk.
    DiskUsage,
    /// Disk read (primary) / write (secondary) throughput in KiB/s.
    DiskIo,
    /// Network receive (primary) / transmit (secondary) in KiB/s.
    Network,
    /// Sensor temperature in tenths of a degree Celsius.
    Temperature,
    /// Wall-clock hands in a time zone, on a 720-unit dial.
    Clock,
    /// Seconds (primary) and minutes (secondary) since the face was set up.
    Stopwatch,
    /// Age of the moon in tenths of a day.
    MoonPhase,
    /// Number published by a user-supplied probe (file or command).
    External,
}

impl MetricKind {
    /// How often a face of this kind is sampled, in ticks.
    ///
    /// Cheap local reads use the global tick modulus so that all faces of a
    /// kind share one refresh. Slow or rate-limited sources count down per
    /// face instead.
    pub fn default_cadence(self) -> Cadence {
        match self {
            Self::Clock => Cadence::EveryNthTick(2),
            Self::Stopwatch => Cadence::EveryNthTick(5),
            Self::Cpu => Cadence::EveryNthTick(10),
            Self::Network | Self::DiskIo => Cadence::EveryNthTick(15),
            Self::Memory | Self::Swap => Cadence::EveryNthTick(25),
            Self::LoadAverage | Self::Temperature => Cadence::EveryNthTick(50),
            Self::DiskUsage | Self::Battery => Cadence::EveryNthTick(60),
            Self::External => Cadence::Countdown(50),
            Self::MoonPhase => Cadence::Countdown(600),
        }
    }

    pub fn default_scale(self) -> Scale {
        match self {
            Self::Cpu | Self::Memory | Self::Swap | Self::Battery | Self::DiskUsage => {
                Scale::new(0, 100)
            }
            Self::External => Scale::new(0, 100),
            Self::LoadAverage => Scale::new(0, 100),
            Self::DiskIo | Self::Network => Scale::new(0, 1024),
            Self::Temperature => Scale::new(0, 1000),
            Self::Clock => Scale::new(0, 720),
            Self::Stopwatch => Scale::new(0, 60),
            Self::MoonPhase => Scale::new(0, 295),
        }
    }

    pub fn default_growth(self) -> ScaleGrowth {
        match self {
            Self::DiskIo | Self::Network => ScaleGrowth::Double,
            Self::LoadAverage => ScaleGrowth::Step(100),
            _ => ScaleGrowth::None,
        }
    }

    /// Whether max/min needles make sense for this metric.
    pub fn tracks_extremes(self) -> bool {
        !matches!(self, Self::Clock | Self::Stopwatch | Self::MoonPhase)
    }

    /// Whether raw values are fixed-point rather than whole units.
    pub fn fixed_point(self) -> bool {
        self.decimals() > 0
    }

    /// Digits after the decimal point in a fixed-point raw value: tenths
    /// for temperature and moon age, hundredths for load.
    pub fn decimals(self) -> u32 {
        match self {
            Self::Temperature | Self::MoonPhase => 1,
            Self::LoadAverage => 2,
            _ => 0,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Cpu | Self::Memory | Self::Swap | Self::Battery | Self::DiskUsage => "%",
            Self::DiskIo | Self::Network => "KiB/s",
            Self::Temperature => "°C",
            Self::MoonPhase => "days",
            Self::Stopwatch => "s",
            Self::LoadAverage | Self::Clock | Self::External => "",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Memory => "Memory",
            Self::Swap => "Swap",
            Self::LoadAverage => "Load",
            Self::Battery => "Battery",
            Self::DiskUsage => "Disk",
            Self::DiskIo => "Disk I/O",
            Self::Network => "Network",
            Self::Temperature => "Temp",
            Self::Clock => "Clock",
            Self::Stopwatch => "Stopwatch",
            Self::MoonPhase => "Moon",
            Self::External => "Sensor",
        }
    }
}

/// Value range mapped onto the dial's sweep. `min < max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    pub min: i64,
    pub max: i64,
}

impl Scale {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> i64 {
        self.max.saturating_sub(self.min)
    }
}

/// How a face's scale grows when a sample exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleGrowth {
    #[default]
    None,
    /// Raise `max` in fixed increments.
    Step(i64),
    /// Double the span.
    Double,
}

/// Per-face capability toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceFlags {
    pub show_max: bool,
    pub show_min: bool,
    pub hot_cold_arc: bool,
    pub reversed: bool,
    pub fixed_point: bool,
    /// Fetch on the next dispatch regardless of cadence.
    pub force_redraw: bool,
}

/// Everything configuration decides about a face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceSpec {
    pub kind: MetricKind,
    pub sub_kind: u32,
    pub title: String,
    pub flags: FaceFlags,
    pub scale: Scale,
    pub cadence: Cadence,
    pub buckets: usize,
    pub bucket_interval: Duration,
    pub growth: ScaleGrowth,
}

impl FaceSpec {
    /// Defaults for `kind`: its standard scale, cadence and growth law,
    /// extremes needles where they apply and a one-minute extremes window.
    pub fn new(kind: MetricKind) -> Self {
        let extremes = kind.tracks_extremes();
        Self {
            kind,
            sub_kind: 0,
            title: kind.label().to_string(),
            flags: FaceFlags {
                show_max: extremes,
                show_min: extremes,
                fixed_point: kind.fixed_point(),
                ..FaceFlags::default()
            },
            scale: kind.default_scale(),
            cadence: kind.default_cadence(),
            buckets: 12,
            bucket_interval: Duration::from_secs(5),
            growth: kind.default_growth(),
        }
    }
}

/// Display parameters whose change invalidates collected extremes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DisplayParams {
    scale: Scale,
    unit: String,
    fixed_point: bool,
}

/// One dial slot: latest samples, animated needles and extremes.
#[derive(Debug, Clone)]
pub struct Face {
    spec: FaceSpec,
    pub flags: FaceFlags,
    pub raw: Option<i64>,
    pub secondary_raw: Option<i64>,
    pub shown: Option<i64>,
    pub secondary_shown: Option<i64>,
    pub scale: Scale,
    pub countdown: u32,
    pub last_dispatched_tick: Option<u64>,
    pub extremes: RollingExtremes,
    pub title: String,
    pub value_text: String,
    pub unit: String,
    /// Primary and secondary needle visibility at the last advance.
    drawn: (bool, bool),
}

impl Face {
    pub fn new(spec: FaceSpec) -> Self {
        let mut flags = spec.flags;
        flags.force_redraw = true;
        Self {
            flags,
            raw: None,
            secondary_raw: None,
            shown: None,
            secondary_shown: None,
            scale: spec.scale,
            countdown: 0,
            last_dispatched_tick: None,
            extremes: RollingExtremes::new(spec.buckets, spec.bucket_interval),
            title: spec.title.clone(),
            value_text: String::new(),
            unit: spec.kind.unit().to_string(),
            drawn: (false, false),
            spec,
        }
    }

    /// Switch this slot to a new metric, fully re-initialising it in place.
    pub fn reconfigure(&mut self, spec: FaceSpec) {
        *self = Self::new(spec);
    }

    pub fn spec(&self) -> &FaceSpec {
        &self.spec
    }

    pub fn kind(&self) -> MetricKind {
        self.spec.kind
    }

    pub fn sub_kind(&self) -> u32 {
        self.spec.sub_kind
    }

    pub fn cadence(&self) -> Cadence {
        self.spec.cadence
    }

    pub fn track(&self) -> Track {
        Track {
            max: self.flags.show_max,
            min: self.flags.show_min,
        }
    }

    /// Ask for a fetch on the next dispatch (focus change, config edit).
    pub fn request_refresh(&mut self) {
        self.flags.force_redraw = true;
    }

    /// Move the needles one animation step and feed the extremes tracker.
    ///
    /// Called every tick whether or not a sample arrived. Returns `true` when
    /// anything the renderer shows has moved or appeared or disappeared.
    pub fn advance(&mut self, now: Instant) -> bool {
        let before = (self.shown, self.secondary_shown);
        self.shown = animator::advance(self.shown, self.raw);
        self.secondary_shown = animator::advance(self.secondary_shown, self.secondary_raw);
        let mut changed = before != (self.shown, self.secondary_shown);

        let drawn = (self.needle().is_some(), self.secondary_needle().is_some());
        changed |= drawn != self.drawn;
        self.drawn = drawn;

        // An absent sample must not keep the window alive with a stale value.
        let track = self.track();
        if let (Some(value), true) = (self.needle(), track.any()) {
            changed |= self.extremes.observe(now, value, track);
        }
        changed
    }

    /// Where the primary needle points, or `None` while the source reports
    /// no value.
    pub fn needle(&self) -> Option<i64> {
        self.raw.and(self.shown)
    }

    pub fn secondary_needle(&self) -> Option<i64> {
        self.secondary_raw.and(self.secondary_shown)
    }

    /// Max needle, when enabled and there is a value to bracket.
    pub fn max_needle(&self) -> Option<i64> {
        if self.flags.show_max {
            self.raw.and(self.extremes.shown_max())
        } else {
            None
        }
    }

    pub fn min_needle(&self) -> Option<i64> {
        if self.flags.show_min {
            self.raw.and(self.extremes.shown_min())
        } else {
            None
        }
    }

    /// Digits after the decimal point when formatting this face's values.
    pub fn decimals(&self) -> u32 {
        if self.flags.fixed_point {
            self.kind().decimals()
        } else {
            0
        }
    }

    /// Grow `scale.max` by the configured law until `value` fits.
    ///
    /// Returns `true` if the scale changed. The dispatcher notices the new
    /// scale after the sample and resets the extremes tracker.
    pub fn grow_scale_to_fit(&mut self, value: i64) -> bool {
        let mut max = self.scale.max;
        match self.spec.growth {
            ScaleGrowth::None => return false,
            ScaleGrowth::Step(step) if step > 0 => {
                while value > max {
                    match max.checked_add(step) {
                        Some(next) => max = next,
                        None => break,
                    }
                }
            }
            ScaleGrowth::Step(_) => return false,
            ScaleGrowth::Double => {
                let min = self.scale.min;
                while value > max {
                    match max
                        .checked_sub(min)
                        .and_then(|span| span.checked_mul(2))
                        .and_then(|span| min.checked_add(span))
                    {
                        Some(next) => max = next,
                        None => break,
                    }
                }
            }
        }

        if max == self.scale.max {
            return false;
        }
        tracing::debug!(
            face = %self.title,
            from = self.scale.max,
            to = max,
            "scale grown to fit sample"
        );
        self.scale.max = max;
        true
    }

    pub(crate) fn display_params(&self) -> DisplayParams {
        DisplayParams {
            scale: self.scale,
            unit: self.unit.clone(),
            fixed_point: self.flags.fixed_point,
        }
    }
}
