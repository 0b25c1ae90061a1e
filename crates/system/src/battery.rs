use gauge_core::{Face, MetricKind, SampleSource};
use std::path::{Path, PathBuf};

const POWER_SUPPLY: &str = "/sys/class/power_supply";

/// Charge level and whether the supply is charging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryState {
    pub percent: u8,
    pub charging: bool,
}

/// Read the `index`-th battery (by name) under a sysfs power-supply root.
///
/// Returns `None` if there is no such battery (desktop, VM) or its files
/// can't be parsed.
pub fn read_battery(root: &Path, index: usize) -> Option<BatteryState> {
    let mut batteries: Vec<PathBuf> = std::fs::read_dir(root)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            std::fs::read_to_string(path.join("type"))
                .map(|t| t.trim() == "Battery")
                .unwrap_or(false)
        })
        .collect();
    batteries.sort();

    let base = batteries.get(index)?;
    let capacity = std::fs::read_to_string(base.join("capacity")).ok()?;
    let status = std::fs::read_to_string(base.join("status")).unwrap_or_default();

    Some(BatteryState {
        percent: capacity.trim().parse::<u8>().ok()?.min(100),
        charging: matches!(status.trim(), "Charging" | "Full"),
    })
}

/// Battery charge in percent. `sub_kind` 0 and 1 both read the first
/// battery by name; `n` reads the `n`-th.
#[derive(Debug)]
pub struct BatterySource {
    root: PathBuf,
    index: usize,
}

impl BatterySource {
    pub fn new(sub_kind: u32) -> Self {
        Self::with_root(POWER_SUPPLY, sub_kind)
    }

    pub fn with_root(root: impl Into<PathBuf>, sub_kind: u32) -> Self {
        Self {
            root: root.into(),
            index: (sub_kind as usize).saturating_sub(1),
        }
    }
}

impl SampleSource for BatterySource {
    fn kind(&self) -> MetricKind {
        MetricKind::Battery
    }

    fn sample(&mut self, face: &mut Face, _tick: u64) {
        match read_battery(&self.root, self.index) {
            Some(state) => {
                face.raw = Some(i64::from(state.percent));
                face.value_text = if state.charging {
                    format!("{}% charging", state.percent)
                } else {
                    format!("{}%", state.percent)
                };
            }
            None => {
                face.raw = None;
                face.value_text = "no battery".to_string();
            }
        }
    }
}
