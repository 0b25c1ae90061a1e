use gauge_core::{
    Cadence, FaceSpec, GaugeError, MetricKind, Result, Scale, ScaleGrowth, MAX_BUCKETS, MAX_FACES,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Shortest tick period accepted, in milliseconds.
pub const MIN_TICK_MS: u64 = 10;

/// Largest magnitude accepted for either scale bound. Values stay exact as
/// `f64` and leave headroom for scale growth.
pub const SCALE_LIMIT: i64 = 1 << 53;

/// Root configuration structure parsed from `gauge.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GaugeConfig {
    /// Settings shared by every face.
    pub global: GlobalConfig,
    /// Dial faces, in slot order.
    pub faces: Vec<FaceConfig>,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            faces: vec![
                FaceConfig::new(MetricKind::Cpu),
                FaceConfig::new(MetricKind::Memory),
                FaceConfig::new(MetricKind::Clock),
            ],
        }
    }
}

impl GaugeConfig {
    /// Check every value the engine relies on being in range.
    pub fn validate(&self) -> Result<()> {
        if self.global.tick_ms < MIN_TICK_MS {
            return Err(GaugeError::Config(format!(
                "tick_ms must be at least {MIN_TICK_MS}, got {}",
                self.global.tick_ms
            )));
        }
        if self.faces.len() > MAX_FACES {
            return Err(GaugeError::Config(format!(
                "{} faces configured; at most {MAX_FACES} are supported",
                self.faces.len()
            )));
        }
        for (index, face) in self.faces.iter().enumerate() {
            face.validate().map_err(|e| match e {
                GaugeError::Config(msg) => {
                    GaugeError::Config(format!("face {index} ({:?}): {msg}", face.kind))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.global.tick_ms.max(MIN_TICK_MS))
    }
}

/// Global engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Tick Driver period in milliseconds.
    pub tick_ms: u64,
    /// Start with redraws suspended.
    pub start_hidden: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            start_hidden: false,
        }
    }
}

/// Scale growth law as written in the config file:
/// `"none"`, `"double"` or `{ step = 25 }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GrowthConfig {
    None,
    Double,
    Step(i64),
}

impl From<GrowthConfig> for ScaleGrowth {
    fn from(g: GrowthConfig) -> Self {
        match g {
            GrowthConfig::None => ScaleGrowth::None,
            GrowthConfig::Double => ScaleGrowth::Double,
            GrowthConfig::Step(n) => ScaleGrowth::Step(n),
        }
    }
}

/// Config block for a single face.
///
/// Unset optional fields fall back to the metric's defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaceConfig {
    /// Metric shown on this face, e.g. `"cpu"`, `"network"`, `"clock"`.
    pub kind: MetricKind,
    /// Which instance of the metric, counted from 1 (`n` is the `n`-th CPU
    /// core, mount point, interface, sensor or battery in sorted order).
    /// 0 picks the default: all cores, the root filesystem (every disk for
    /// I/O), all interfaces, the hottest sensor or the first battery.
    #[serde(default)]
    pub sub_kind: u32,
    #[serde(default)]
    pub title: Option<String>,
    /// Max needle; on by default for metrics where it makes sense.
    #[serde(default)]
    pub show_max: Option<bool>,
    #[serde(default)]
    pub show_min: Option<bool>,
    #[serde(default)]
    pub hot_cold_arc: bool,
    #[serde(default)]
    pub reversed: bool,
    #[serde(default)]
    pub scale_min: Option<i64>,
    #[serde(default)]
    pub scale_max: Option<i64>,
    /// Sampling period in ticks; keeps the metric's staggering discipline.
    #[serde(default)]
    pub period: Option<u32>,
    /// Active extremes buckets.
    #[serde(default = "default_buckets")]
    pub buckets: usize,
    /// Seconds covered by one extremes bucket.
    #[serde(default = "default_bucket_seconds")]
    pub bucket_seconds: u64,
    #[serde(default)]
    pub growth: Option<GrowthConfig>,
    /// IANA zone for clock faces; local time when unset.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Shell command printing a number (external faces).
    #[serde(default)]
    pub command: Option<String>,
    /// File holding a number (external faces).
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Raw external readings are divided by this.
    #[serde(default = "default_divisor")]
    pub divisor: i64,
    /// Upper bound on one external probe, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_buckets() -> usize {
    12
}

fn default_bucket_seconds() -> u64 {
    5
}

fn default_divisor() -> i64 {
    1
}

fn default_timeout_ms() -> u64 {
    2_000
}

impl FaceConfig {
    pub fn new(kind: MetricKind) -> Self {
        Self {
            kind,
            sub_kind: 0,
            title: None,
            show_max: None,
            show_min: None,
            hot_cold_arc: false,
            reversed: false,
            scale_min: None,
            scale_max: None,
            period: None,
            buckets: default_buckets(),
            bucket_seconds: default_bucket_seconds(),
            growth: None,
            timezone: None,
            command: None,
            path: None,
            divisor: default_divisor(),
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let scale = self.scale();
        let limit = SCALE_LIMIT.unsigned_abs();
        if scale.min.unsigned_abs() > limit || scale.max.unsigned_abs() > limit {
            return Err(GaugeError::Config(format!(
                "scale bounds must lie within ±{SCALE_LIMIT}, got {}..{}",
                scale.min, scale.max
            )));
        }
        if scale.min >= scale.max {
            return Err(GaugeError::Config(format!(
                "scale_min ({}) must be below scale_max ({})",
                scale.min, scale.max
            )));
        }
        if !(1..=MAX_BUCKETS).contains(&self.buckets) {
            return Err(GaugeError::Config(format!(
                "buckets must be between 1 and {MAX_BUCKETS}, got {}",
                self.buckets
            )));
        }
        if self.bucket_seconds == 0 {
            return Err(GaugeError::Config("bucket_seconds must be at least 1".into()));
        }
        if self.period == Some(0) {
            return Err(GaugeError::Config("period must be at least 1 tick".into()));
        }
        if let Some(GrowthConfig::Step(n)) = self.growth {
            if n <= 0 {
                return Err(GaugeError::Config(format!("growth step must be positive, got {n}")));
            }
        }
        if let Some(tz) = &self.timezone {
            tz.parse::<chrono_tz::Tz>()
                .map_err(|_| GaugeError::Config(format!("unknown time zone '{tz}'")))?;
        }
        if self.kind == MetricKind::External {
            if self.command.is_none() && self.path.is_none() {
                return Err(GaugeError::Config(
                    "external faces need a `command` or a `path`".into(),
                ));
            }
            if self.divisor == 0 {
                return Err(GaugeError::Config("divisor must not be zero".into()));
            }
        }
        Ok(())
    }

    pub fn scale(&self) -> Scale {
        let default = self.kind.default_scale();
        Scale::new(
            self.scale_min.unwrap_or(default.min),
            self.scale_max.unwrap_or(default.max),
        )
    }

    pub fn cadence(&self) -> Cadence {
        let default = self.kind.default_cadence();
        match self.period {
            Some(n) => default.with_period(n),
            None => default,
        }
    }

    /// The core's view of this face. Call [`FaceConfig::validate`] first.
    pub fn to_spec(&self) -> FaceSpec {
        let mut spec = FaceSpec::new(self.kind);
        spec.sub_kind = self.sub_kind;
        if let Some(title) = &self.title {
            spec.title = title.clone();
        }
        spec.flags.show_max = self.show_max.unwrap_or(spec.flags.show_max);
        spec.flags.show_min = self.show_min.unwrap_or(spec.flags.show_min);
        spec.flags.hot_cold_arc = self.hot_cold_arc;
        spec.flags.reversed = self.reversed;
        spec.scale = self.scale();
        spec.cadence = self.cadence();
        spec.buckets = self.buckets;
        spec.bucket_interval = Duration::from_secs(self.bucket_seconds);
        if let Some(growth) = self.growth {
            spec.growth = growth.into();
        }
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = GaugeConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.tick_period(), Duration::from_millis(100));
    }

    #[test]
    fn parses_full_face_table() {
        let cfg: GaugeConfig = toml::from_str(
            r#"
            [global]
            tick_ms = 50

            [[faces]]
            kind = "network"
            sub_kind = 1
            title = "eth0"
            show_min = false
            period = 30
            buckets = 24
            bucket_seconds = 10
            growth = { step = 256 }

            [[faces]]
            kind = "clock"
            timezone = "Asia/Tokyo"

            [[faces]]
            kind = "external"
            path = "/sys/class/thermal/thermal_zone0/temp"
            divisor = 100
            growth = "double"
            "#,
        )
        .unwrap();
        cfg.validate().unwrap();

        assert_eq!(cfg.global.tick_ms, 50);
        let net = cfg.faces[0].to_spec();
        assert_eq!(net.kind, MetricKind::Network);
        assert_eq!(net.sub_kind, 1);
        assert_eq!(net.title, "eth0");
        assert!(net.flags.show_max && !net.flags.show_min);
        assert_eq!(net.cadence, Cadence::EveryNthTick(30));
        assert_eq!(net.buckets, 24);
        assert_eq!(net.bucket_interval, Duration::from_secs(10));
        assert_eq!(net.growth, ScaleGrowth::Step(256));

        assert_eq!(cfg.faces[1].timezone.as_deref(), Some("Asia/Tokyo"));
        let clock = cfg.faces[1].to_spec();
        assert!(!clock.flags.show_max && !clock.flags.show_min);
        assert_eq!(cfg.faces[2].to_spec().growth, ScaleGrowth::Double);
        assert_eq!(cfg.faces[2].to_spec().cadence, Cadence::Countdown(50));
    }

    #[test]
    fn period_override_keeps_discipline() {
        let mut face = FaceConfig::new(MetricKind::MoonPhase);
        face.period = Some(7);
        assert_eq!(face.cadence(), Cadence::Countdown(7));
    }

    #[test]
    fn rejects_inverted_scale() {
        let mut face = FaceConfig::new(MetricKind::Cpu);
        face.scale_max = Some(0);
        assert!(matches!(face.validate(), Err(GaugeError::Config(_))));
    }

    #[test]
    fn rejects_extreme_scale_bounds() {
        let mut face = FaceConfig::new(MetricKind::Network);
        face.scale_min = Some(i64::MIN);
        assert!(face.validate().is_err());
        face.scale_min = Some(-SCALE_LIMIT);
        face.scale_max = Some(SCALE_LIMIT);
        face.validate().unwrap();
        face.scale_max = Some(SCALE_LIMIT + 1);
        assert!(face.validate().is_err());
    }

    #[test]
    fn rejects_bad_bucket_geometry() {
        let mut face = FaceConfig::new(MetricKind::Cpu);
        face.buckets = 0;
        assert!(face.validate().is_err());
        face.buckets = MAX_BUCKETS + 1;
        assert!(face.validate().is_err());
        face.buckets = MAX_BUCKETS;
        face.bucket_seconds = 0;
        assert!(face.validate().is_err());
    }

    #[test]
    fn rejects_unknown_timezone() {
        let mut face = FaceConfig::new(MetricKind::Clock);
        face.timezone = Some("Mars/Olympus_Mons".into());
        assert!(face.validate().is_err());
    }

    #[test]
    fn external_needs_a_probe() {
        let face = FaceConfig::new(MetricKind::External);
        assert!(face.validate().is_err());
    }

    #[test]
    fn too_many_faces() {
        let cfg = GaugeConfig {
            faces: vec![FaceConfig::new(MetricKind::Cpu); MAX_FACES + 1],
            ..GaugeConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn tick_too_short() {
        let mut cfg = GaugeConfig::default();
        cfg.global.tick_ms = 1;
        assert!(cfg.validate().is_err());
    }
}
