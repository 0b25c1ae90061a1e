use crate::shared::{percent, SharedSystem};
use gauge_core::{Face, MetricKind, SampleSource};

/// Format a byte count as a human-readable string (e.g. `"7.3 GiB"`).
pub fn format_bytes(bytes: u64) -> String {
    const GIB: u64 = 1 << 30;
    const MIB: u64 = 1 << 20;
    const KIB: u64 = 1 << 10;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// RAM or swap in use, as a percentage.
#[derive(Debug)]
pub struct MemorySource {
    system: SharedSystem,
    swap: bool,
}

impl MemorySource {
    pub fn ram(system: SharedSystem) -> Self {
        Self { system, swap: false }
    }

    pub fn swap(system: SharedSystem) -> Self {
        Self { system, swap: true }
    }
}

impl SampleSource for MemorySource {
    fn kind(&self) -> MetricKind {
        if self.swap {
            MetricKind::Swap
        } else {
            MetricKind::Memory
        }
    }

    fn sample(&mut self, face: &mut Face, tick: u64) {
        let mut cache = self.system.lock();
        let sys = cache.memory(tick);
        let (used, total) = if self.swap {
            (sys.used_swap(), sys.total_swap())
        } else {
            (sys.used_memory(), sys.total_memory())
        };

        // No swap configured: nothing to point at.
        face.raw = percent(used, total);
        face.value_text = if total == 0 {
            "none".to_string()
        } else {
            format!("{} / {}", format_bytes(used), format_bytes(total))
        };
    }
}
