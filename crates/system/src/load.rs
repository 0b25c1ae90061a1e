use gauge_core::{Face, MetricKind, SampleSource};
use sysinfo::System;

/// Load average in hundredths: 1-minute on the primary needle, 5-minute on
/// the secondary. The scale grows when the machine is busier than it shows.
#[derive(Debug, Default)]
pub struct LoadSource;

impl LoadSource {
    pub fn new() -> Self {
        Self
    }
}

fn hundredths(load: f64) -> i64 {
    (load * 100.0).round().max(0.0) as i64
}

impl SampleSource for LoadSource {
    fn kind(&self) -> MetricKind {
        MetricKind::LoadAverage
    }

    fn sample(&mut self, face: &mut Face, _tick: u64) {
        let load = System::load_average();
        let (one, five) = (hundredths(load.one), hundredths(load.five));

        face.grow_scale_to_fit(one.max(five));
        face.raw = Some(one);
        face.secondary_raw = Some(five);
        face.value_text = format!("{:.2} {:.2} {:.2}", load.one, load.five, load.fifteen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundredths_rounds_and_floors_at_zero() {
        assert_eq!(hundredths(0.526), 53);
        assert_eq!(hundredths(-1.0), 0);
    }
}
