//! One set of `sysinfo` handles shared by every local source.
//!
//! Faces of the same kind sample on the same tick, so each category is
//! refreshed at most once per tick id no matter how many faces read it.

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::{Duration, Instant};
use sysinfo::{Components, Disks, Networks, System};

#[derive(Clone)]
pub struct SharedSystem {
    inner: Arc<Mutex<SystemCache>>,
}

impl SharedSystem {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SystemCache::new())),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, SystemCache> {
        self.inner.lock()
    }
}

impl Default for SharedSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSystem").finish_non_exhaustive()
    }
}

/// Counter deltas plus the wall-clock time they accumulated over.
pub struct Window<'a, T> {
    pub data: &'a T,
    pub elapsed: Duration,
}

pub struct SystemCache {
    sys: System,
    networks: Networks,
    disks: Disks,
    components: Components,
    cpu_tick: Option<u64>,
    memory_tick: Option<u64>,
    network_tick: Option<u64>,
    disk_tick: Option<u64>,
    component_tick: Option<u64>,
    network_at: Instant,
    network_elapsed: Duration,
    disk_at: Instant,
    disk_elapsed: Duration,
}

/// Marks `slot` as refreshed on `tick`; returns whether it was stale.
fn claim(slot: &mut Option<u64>, tick: u64) -> bool {
    if *slot == Some(tick) {
        false
    } else {
        *slot = Some(tick);
        true
    }
}

impl SystemCache {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            sys: System::new(),
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
            cpu_tick: None,
            memory_tick: None,
            network_tick: None,
            disk_tick: None,
            component_tick: None,
            network_at: now,
            network_elapsed: Duration::ZERO,
            disk_at: now,
            disk_elapsed: Duration::ZERO,
        }
    }

    pub fn cpu(&mut self, tick: u64) -> &System {
        if claim(&mut self.cpu_tick, tick) {
            self.sys.refresh_cpu_usage();
        }
        &self.sys
    }

    pub fn memory(&mut self, tick: u64) -> &System {
        if claim(&mut self.memory_tick, tick) {
            self.sys.refresh_memory();
        }
        &self.sys
    }

    /// Interfaces with `received()`/`transmitted()` covering `elapsed`.
    pub fn networks(&mut self, tick: u64) -> Window<'_, Networks> {
        if claim(&mut self.network_tick, tick) {
            self.networks.refresh(true);
            let now = Instant::now();
            self.network_elapsed = now.duration_since(self.network_at);
            self.network_at = now;
        }
        Window {
            data: &self.networks,
            elapsed: self.network_elapsed,
        }
    }

    /// Disks with I/O counters covering `elapsed`.
    pub fn disks(&mut self, tick: u64) -> Window<'_, Disks> {
        if claim(&mut self.disk_tick, tick) {
            self.disks.refresh(true);
            let now = Instant::now();
            self.disk_elapsed = now.duration_since(self.disk_at);
            self.disk_at = now;
        }
        Window {
            data: &self.disks,
            elapsed: self.disk_elapsed,
        }
    }

    pub fn components(&mut self, tick: u64) -> &Components {
        if claim(&mut self.component_tick, tick) {
            self.components.refresh(true);
        }
        &self.components
    }
}

/// Bytes accumulated over `elapsed` as KiB/s.
pub fn kib_per_second(bytes: u64, elapsed: Duration) -> i64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0;
    }
    (bytes as f64 / 1024.0 / secs).round() as i64
}

/// `used` as a whole percentage of `total`; `None` when there is no total.
pub fn percent(used: u64, total: u64) -> Option<i64> {
    if total == 0 {
        return None;
    }
    Some(((used as f64 * 100.0) / total as f64).round().clamp(0.0, 100.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_refreshes_once_per_tick() {
        let mut slot = None;
        assert!(claim(&mut slot, 4));
        assert!(!claim(&mut slot, 4));
        assert!(claim(&mut slot, 5));
    }

    #[test]
    fn rate_conversion() {
        assert_eq!(kib_per_second(2048, Duration::from_secs(1)), 2);
        assert_eq!(kib_per_second(10 * 1024, Duration::from_millis(500)), 20);
        assert_eq!(kib_per_second(4096, Duration::ZERO), 0);
    }

    #[test]
    fn percentages() {
        assert_eq!(percent(1, 4), Some(25));
        assert_eq!(percent(2, 3), Some(67));
        assert_eq!(percent(5, 0), None);
        assert_eq!(percent(9, 4), Some(100));
    }
}
