//! Sample sources for every metric a face can show.
//!
//! Local metrics read through one [`SharedSystem`] so a category is refreshed
//! once per tick. External faces poll on a background task.

pub mod battery;
pub mod clock;
pub mod cpu;
pub mod disk;
pub mod external;
pub mod load;
pub mod memory;
pub mod moon;
pub mod network;
pub mod shared;
pub mod stopwatch;
pub mod thermal;

pub use shared::SharedSystem;

use gauge_config::{FaceConfig, GaugeConfig};
use gauge_core::{GaugeError, MetricKind, Result, SampleSource, Slot};
use std::time::Duration;

/// Build the sample source for one configured face.
///
/// External faces spawn their poller and fail with [`GaugeError::Source`]
/// outside a Tokio runtime.
pub fn build(face: &FaceConfig, system: &SharedSystem, tick: Duration) -> Result<Box<dyn SampleSource>> {
    let sub_kind = face.sub_kind;
    let source: Box<dyn SampleSource> = match face.kind {
        MetricKind::Cpu => Box::new(cpu::CpuSource::new(system.clone(), sub_kind)),
        MetricKind::Memory => Box::new(memory::MemorySource::ram(system.clone())),
        MetricKind::Swap => Box::new(memory::MemorySource::swap(system.clone())),
        MetricKind::LoadAverage => Box::new(load::LoadSource::new()),
        MetricKind::Battery => Box::new(battery::BatterySource::new(sub_kind)),
        MetricKind::DiskUsage => Box::new(disk::DiskUsageSource::new(system.clone(), sub_kind)),
        MetricKind::DiskIo => Box::new(disk::DiskIoSource::new(system.clone(), sub_kind)),
        MetricKind::Network => Box::new(network::NetworkSource::new(system.clone(), sub_kind)),
        MetricKind::Temperature => {
            Box::new(thermal::TemperatureSource::new(system.clone(), sub_kind))
        }
        MetricKind::Clock => {
            let zone = match &face.timezone {
                Some(name) => Some(
                    name.parse::<chrono_tz::Tz>()
                        .map_err(|_| GaugeError::Config(format!("unknown time zone '{name}'")))?,
                ),
                None => None,
            };
            Box::new(clock::ClockSource::new(zone))
        }
        MetricKind::Stopwatch => Box::new(stopwatch::StopwatchSource::new()),
        MetricKind::MoonPhase => Box::new(moon::MoonSource::new()),
        MetricKind::External => {
            let probe = match (&face.command, &face.path) {
                (Some(cmd), _) => external::Probe::Command(cmd.clone()),
                (None, Some(path)) => external::Probe::File(path.clone()),
                (None, None) => {
                    return Err(GaugeError::Config(
                        "external faces need a `command` or a `path`".into(),
                    ))
                }
            };
            let every = tick.saturating_mul(face.cadence().period());
            Box::new(external::ExternalSource::spawn(
                probe,
                face.divisor,
                every,
                Duration::from_millis(face.timeout_ms),
            )?)
        }
    };
    Ok(source)
}

/// One slot per configured face, in order.
pub fn slots(config: &GaugeConfig, system: &SharedSystem) -> Result<Vec<Slot>> {
    let tick = config.tick_period();
    config
        .faces
        .iter()
        .map(|face| Ok(Slot::new(face.to_spec(), build(face, system, tick)?)))
        .collect()
}
