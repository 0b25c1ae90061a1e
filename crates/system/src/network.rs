use crate::shared::{kib_per_second, SharedSystem};
use gauge_core::{Face, MetricKind, SampleSource};

/// Receive (primary) and transmit (secondary) rate in KiB/s. `sub_kind` 0
/// sums every interface; `n` is the `n`-th interface by name.
#[derive(Debug)]
pub struct NetworkSource {
    system: SharedSystem,
    sub_kind: u32,
}

impl NetworkSource {
    pub fn new(system: SharedSystem, sub_kind: u32) -> Self {
        Self { system, sub_kind }
    }
}

impl SampleSource for NetworkSource {
    fn kind(&self) -> MetricKind {
        MetricKind::Network
    }

    fn sample(&mut self, face: &mut Face, tick: u64) {
        let mut cache = self.system.lock();
        let window = cache.networks(tick);

        let (name, rx, tx) = if self.sub_kind == 0 {
            let rx = window.data.list().iter().map(|(_, d)| d.received()).sum::<u64>();
            let tx = window.data.list().iter().map(|(_, d)| d.transmitted()).sum::<u64>();
            ("all".to_string(), rx, tx)
        } else {
            let mut names: Vec<&String> = window.data.list().iter().map(|(name, _)| name).collect();
            names.sort();
            let Some(name) = names.get(self.sub_kind as usize - 1).map(|n| n.to_string()) else {
                face.raw = None;
                face.secondary_raw = None;
                face.value_text = "no interface".to_string();
                return;
            };
            let (rx, tx) = window
                .data
                .list()
                .get(&name)
                .map(|d| (d.received(), d.transmitted()))
                .unwrap_or((0, 0));
            (name, rx, tx)
        };

        // `received()`/`transmitted()` are deltas since the previous refresh;
        // there is nothing to divide before the second one.
        if window.elapsed.is_zero() {
            return;
        }
        let rx = kib_per_second(rx, window.elapsed);
        let tx = kib_per_second(tx, window.elapsed);

        face.grow_scale_to_fit(rx.max(tx));
        face.raw = Some(rx);
        face.secondary_raw = Some(tx);
        face.value_text = format!("{name} ↓{rx} ↑{tx} KiB/s");
    }
}
