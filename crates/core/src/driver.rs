//! The periodic loop body: sample, animate, coalesce a redraw.

use crate::dispatch::{self, Decision};
use crate::face::{Face, FaceSpec};
use crate::source::{Renderer, SampleSource};
use std::time::Instant;
use tracing::{info, warn};

/// Most faces one driver will run.
pub const MAX_FACES: usize = 50;

/// A face's configuration paired with the source that feeds it.
#[derive(Debug)]
pub struct Slot {
    pub spec: FaceSpec,
    pub source: Box<dyn SampleSource>,
}

impl Slot {
    pub fn new(spec: FaceSpec, source: Box<dyn SampleSource>) -> Self {
        Self { spec, source }
    }
}

/// Owns the faces, their sources and the tick id.
///
/// [`TickDriver::tick`] is meant to be called by a host timer with a period
/// well below the fastest cadence. It never blocks.
pub struct TickDriver<R> {
    next_tick: u64,
    faces: Vec<Face>,
    sources: Vec<Box<dyn SampleSource>>,
    visible: bool,
    just_shown: bool,
    renderer: R,
}

impl<R: Renderer> TickDriver<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            next_tick: 0,
            faces: Vec::new(),
            sources: Vec::new(),
            visible: true,
            just_shown: true,
            renderer,
        }
    }

    pub fn with_slots(renderer: R, slots: Vec<Slot>) -> Self {
        let mut driver = Self::new(renderer);
        driver.replace_slots(slots);
        driver
    }

    /// Replace every slot. Faces start blank and fetch on the next tick.
    pub fn replace_slots(&mut self, mut slots: Vec<Slot>) {
        if slots.len() > MAX_FACES {
            warn!("{} faces configured; only the first {MAX_FACES} are used", slots.len());
            slots.truncate(MAX_FACES);
        }
        self.faces.clear();
        self.sources.clear();
        for slot in slots {
            self.faces.push(Face::new(slot.spec));
            self.sources.push(slot.source);
        }
        self.just_shown = true;
        info!("{} faces configured", self.faces.len());
    }

    /// Switch slot `index` to a different metric. Returns `false` if there
    /// is no such slot.
    pub fn reconfigure(&mut self, index: usize, slot: Slot) -> bool {
        let (Some(face), Some(source)) = (self.faces.get_mut(index), self.sources.get_mut(index))
        else {
            warn!("no face in slot {index}");
            return false;
        };
        info!(slot = index, from = ?face.kind(), to = ?slot.spec.kind, "face reconfigured");
        face.reconfigure(slot.spec);
        *source = slot.source;
        true
    }

    /// Hidden drivers keep sampling but stop asking for redraws. Becoming
    /// visible refreshes every face and redraws on the next tick.
    pub fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            self.just_shown = true;
            self.refresh_all();
        }
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Force every face to fetch on the next tick.
    pub fn refresh_all(&mut self) {
        self.faces.iter_mut().for_each(Face::request_refresh);
    }

    /// Run one tick at wall-clock time `now`.
    ///
    /// Returns whether anything changed; when it did and the driver is
    /// visible, the renderer has been asked to redraw exactly once.
    pub fn tick(&mut self, now: Instant) -> bool {
        let tick = self.next_tick;
        self.next_tick = self.next_tick.wrapping_add(1);

        let mut changed = std::mem::take(&mut self.just_shown);
        for (face, source) in self.faces.iter_mut().zip(self.sources.iter_mut()) {
            let decision = dispatch::dispatch(face, source.as_mut(), tick);
            changed |= decision == Decision::Forced;
            changed |= face.advance(now);
        }

        if changed && self.visible {
            self.renderer.request_redraw(&self.faces);
        }
        changed
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Id the next call to [`TickDriver::tick`] will use.
    pub fn next_tick(&self) -> u64 {
        self.next_tick
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Cadence;
    use crate::face::{MetricKind, Scale};
    use std::collections::HashMap;
    use std::time::Duration;

    /// Hands out scripted samples keyed by tick id.
    #[derive(Debug, Default)]
    struct Scripted {
        samples: HashMap<u64, i64>,
        fetches: Vec<u64>,
    }

    impl Scripted {
        fn boxed(samples: &[(u64, i64)]) -> Box<dyn SampleSource> {
            Box::new(Self {
                samples: samples.iter().copied().collect(),
                fetches: Vec::new(),
            })
        }
    }

    impl SampleSource for Scripted {
        fn kind(&self) -> MetricKind {
            MetricKind::Cpu
        }

        fn sample(&mut self, face: &mut Face, tick: u64) {
            self.fetches.push(tick);
            if let Some(&v) = self.samples.get(&tick) {
                face.raw = Some(v);
            }
        }
    }

    #[derive(Debug, Default)]
    struct Recorder {
        redraws: usize,
        shown: Vec<Option<i64>>,
    }

    impl Renderer for Recorder {
        fn request_redraw(&mut self, faces: &[Face]) {
            self.redraws += 1;
            self.shown = faces.iter().map(|f| f.shown).collect();
        }
    }

    fn spec(period: u32) -> FaceSpec {
        let mut spec = FaceSpec::new(MetricKind::Cpu);
        spec.scale = Scale::new(0, 100);
        spec.cadence = Cadence::EveryNthTick(period);
        spec
    }

    #[test]
    fn end_to_end_needle_follows_samples() {
        let start = Instant::now();
        let slots = vec![Slot::new(spec(10), Scripted::boxed(&[(0, 87), (10, 20)]))];
        let mut driver = TickDriver::with_slots(Recorder::default(), slots);

        let mut shown = Vec::new();
        for t in 0..40u64 {
            driver.tick(start + Duration::from_millis(t * 100));
            shown.push(driver.faces()[0].shown);
        }

        assert_eq!(shown[0], Some(87), "first sample is shown without animation");
        assert!(shown[1..10].iter().all(|&s| s == Some(87)));
        assert_eq!(&shown[10..13], &[Some(53), Some(36), Some(20)]);
        assert!(shown[12..].iter().all(|&s| s == Some(20)));
    }

    #[test]
    fn redraw_is_coalesced_across_faces() {
        let start = Instant::now();
        let slots = (0..5)
            .map(|i| Slot::new(spec(10), Scripted::boxed(&[(0, 10 * i), (10, 90)])))
            .collect();
        let mut driver = TickDriver::with_slots(Recorder::default(), slots);

        assert!(driver.tick(start));
        assert_eq!(driver.renderer().redraws, 1);
        assert_eq!(driver.renderer().shown, vec![Some(0), Some(10), Some(20), Some(30), Some(40)]);

        // Nothing moves between samples, so nothing is redrawn.
        for t in 1..10u64 {
            assert!(!driver.tick(start + Duration::from_millis(t * 100)));
        }
        assert_eq!(driver.renderer().redraws, 1);

        assert!(driver.tick(start + Duration::from_secs(1)));
        assert_eq!(driver.renderer().redraws, 2);
    }

    #[test]
    fn hidden_driver_samples_but_does_not_redraw() {
        let start = Instant::now();
        let slots = vec![Slot::new(spec(2), Scripted::boxed(&[(0, 5), (4, 50)]))];
        let mut driver = TickDriver::with_slots(Recorder::default(), slots);
        driver.tick(start);
        assert_eq!(driver.renderer().redraws, 1);

        driver.set_visible(false);
        for t in 1..6u64 {
            driver.tick(start + Duration::from_millis(t * 100));
        }
        assert_eq!(driver.faces()[0].shown, Some(50));
        assert_eq!(driver.renderer().redraws, 1);

        // Coming back forces a fetch and a redraw even though nothing moved.
        driver.set_visible(true);
        assert!(driver.tick(start + Duration::from_secs(1)));
        assert_eq!(driver.faces()[0].last_dispatched_tick, Some(6));
        assert_eq!(driver.renderer().redraws, 2);
    }

    #[test]
    fn reconfigure_resets_slot_in_place() {
        let start = Instant::now();
        let slots = vec![Slot::new(spec(10), Scripted::boxed(&[(0, 70)]))];
        let mut driver = TickDriver::with_slots(Recorder::default(), slots);
        driver.tick(start);
        assert_eq!(driver.faces()[0].shown, Some(70));

        let mut temp = FaceSpec::new(MetricKind::Temperature);
        temp.cadence = Cadence::EveryNthTick(50);
        assert!(driver.reconfigure(0, Slot::new(temp, Scripted::boxed(&[(1, 455)]))));
        assert_eq!(driver.faces()[0].shown, None);

        // Forced fetch on the very next tick despite the 50-tick cadence.
        driver.tick(start + Duration::from_millis(100));
        assert_eq!(driver.faces()[0].shown, Some(455));
        assert!(!driver.reconfigure(3, Slot::new(spec(10), Scripted::boxed(&[]))));
    }

    #[test]
    fn slot_count_is_capped() {
        let slots = (0..MAX_FACES + 7)
            .map(|_| Slot::new(spec(10), Scripted::boxed(&[])))
            .collect();
        let driver = TickDriver::with_slots(Recorder::default(), slots);
        assert_eq!(driver.faces().len(), MAX_FACES);
    }

    #[test]
    fn tick_ids_start_at_zero_and_increase() {
        let mut driver = TickDriver::with_slots(
            Recorder::default(),
            vec![Slot::new(spec(1), Scripted::boxed(&[]))],
        );
        let now = Instant::now();
        for _ in 0..3 {
            driver.tick(now);
        }
        assert_eq!(driver.next_tick(), 3);
        assert_eq!(driver.faces()[0].last_dispatched_tick, Some(2));
    }
}
