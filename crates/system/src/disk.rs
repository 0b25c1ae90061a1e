use crate::memory::format_bytes;
use crate::shared::{kib_per_second, percent, SharedSystem};
use gauge_core::{Face, MetricKind, SampleSource};
use std::path::Path;
use sysinfo::{Disk, Disks};

/// Pick a disk: `sub_kind` 0 is the root filesystem, `n` the `n`-th disk
/// ordered by mount point.
fn select(disks: &Disks, sub_kind: u32) -> Option<&Disk> {
    if sub_kind == 0 {
        return disks.list().iter().find(|d| d.mount_point() == Path::new("/"));
    }
    let mut sorted: Vec<&Disk> = disks.list().iter().collect();
    sorted.sort_by(|a, b| a.mount_point().cmp(b.mount_point()));
    sorted.get(sub_kind as usize - 1).copied()
}

/// Space used on a filesystem, percent.
#[derive(Debug)]
pub struct DiskUsageSource {
    system: SharedSystem,
    sub_kind: u32,
}

impl DiskUsageSource {
    pub fn new(system: SharedSystem, sub_kind: u32) -> Self {
        Self { system, sub_kind }
    }
}

impl SampleSource for DiskUsageSource {
    fn kind(&self) -> MetricKind {
        MetricKind::DiskUsage
    }

    fn sample(&mut self, face: &mut Face, tick: u64) {
        let mut cache = self.system.lock();
        let disks = cache.disks(tick);
        let Some(disk) = select(disks.data, self.sub_kind) else {
            face.raw = None;
            face.value_text = "no disk".to_string();
            return;
        };

        let total = disk.total_space();
        let used = total.saturating_sub(disk.available_space());
        face.raw = percent(used, total);
        face.value_text = format!(
            "{} {} / {}",
            disk.mount_point().display(),
            format_bytes(used),
            format_bytes(total)
        );
    }
}

/// Read (primary) and write (secondary) throughput in KiB/s. `sub_kind` 0
/// sums every disk.
#[derive(Debug)]
pub struct DiskIoSource {
    system: SharedSystem,
    sub_kind: u32,
}

impl DiskIoSource {
    pub fn new(system: SharedSystem, sub_kind: u32) -> Self {
        Self { system, sub_kind }
    }
}

impl SampleSource for DiskIoSource {
    fn kind(&self) -> MetricKind {
        MetricKind::DiskIo
    }

    fn sample(&mut self, face: &mut Face, tick: u64) {
        let mut cache = self.system.lock();
        let window = cache.disks(tick);

        let (read, written) = if self.sub_kind == 0 {
            window.data.list().iter().fold((0u64, 0u64), |(r, w), d| {
                let usage = d.usage();
                (r + usage.read_bytes, w + usage.written_bytes)
            })
        } else {
            match select(window.data, self.sub_kind) {
                Some(d) => (d.usage().read_bytes, d.usage().written_bytes),
                None => {
                    face.raw = None;
                    face.secondary_raw = None;
                    face.value_text = "no disk".to_string();
                    return;
                }
            }
        };

        // The first refresh has no previous counters to diff against.
        if window.elapsed.is_zero() {
            return;
        }
        let read = kib_per_second(read, window.elapsed);
        let written = kib_per_second(written, window.elapsed);

        face.grow_scale_to_fit(read.max(written));
        face.raw = Some(read);
        face.secondary_raw = Some(written);
        face.value_text = format!("R {read} KiB/s  W {written} KiB/s");
    }
}
