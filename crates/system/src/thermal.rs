use crate::shared::SharedSystem;
use gauge_core::{Face, MetricKind, SampleSource};

/// Sensor temperature in tenths of a degree. `sub_kind` 0 shows the hottest
/// sensor; `n` the `n`-th by label.
#[derive(Debug)]
pub struct TemperatureSource {
    system: SharedSystem,
    sub_kind: u32,
}

impl TemperatureSource {
    pub fn new(system: SharedSystem, sub_kind: u32) -> Self {
        Self { system, sub_kind }
    }
}

/// Celsius to tenths of a degree.
pub fn tenths(celsius: f32) -> i64 {
    (f64::from(celsius) * 10.0).round() as i64
}

impl SampleSource for TemperatureSource {
    fn kind(&self) -> MetricKind {
        MetricKind::Temperature
    }

    fn sample(&mut self, face: &mut Face, tick: u64) {
        let mut cache = self.system.lock();
        let mut readings: Vec<(String, f32)> = cache
            .components(tick)
            .list()
            .iter()
            .filter_map(|c| c.temperature().map(|t| (c.label().to_string(), t)))
            .filter(|(_, t)| t.is_finite())
            .collect();

        let reading = if self.sub_kind == 0 {
            readings.into_iter().max_by(|a, b| a.1.total_cmp(&b.1))
        } else {
            readings.sort_by(|a, b| a.0.cmp(&b.0));
            readings.into_iter().nth(self.sub_kind as usize - 1)
        };

        match reading {
            Some((label, celsius)) => {
                face.raw = Some(tenths(celsius));
                face.value_text = format!("{celsius:.1}°C {label}");
            }
            None => {
                face.raw = None;
                face.value_text = "no sensor".to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenths_of_a_degree() {
        assert_eq!(tenths(45.6), 456);
        assert_eq!(tenths(-3.0), -30);
    }
}
