use crate::shared::SharedSystem;
use gauge_core::{Face, MetricKind, SampleSource};

/// CPU load in percent. `sub_kind` 0 averages every core; `n` reads core `n - 1`.
#[derive(Debug)]
pub struct CpuSource {
    system: SharedSystem,
    core: Option<usize>,
}

impl CpuSource {
    pub fn new(system: SharedSystem, sub_kind: u32) -> Self {
        Self {
            system,
            core: (sub_kind as usize).checked_sub(1),
        }
    }
}

impl SampleSource for CpuSource {
    fn kind(&self) -> MetricKind {
        MetricKind::Cpu
    }

    fn sample(&mut self, face: &mut Face, tick: u64) {
        let mut cache = self.system.lock();
        let sys = cache.cpu(tick);
        let usage = match self.core {
            None => Some(sys.global_cpu_usage()),
            Some(i) => sys.cpus().get(i).map(|c| c.cpu_usage()),
        };

        face.raw = usage.map(|u| u.round().clamp(0.0, 100.0) as i64);
        face.value_text = match usage {
            Some(u) => format!("{u:.0}%"),
            None => "n/a".to_string(),
        };
    }
}
