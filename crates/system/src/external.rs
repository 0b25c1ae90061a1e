//! Faces fed by a shell command or a file holding a number.
//!
//! Probing happens on a background task so a slow command never stalls a
//! tick; the face only ever reads the latest published value.

use gauge_core::{Face, GaugeError, MetricKind, Result, SampleSource};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    File(PathBuf),
    Command(String),
}

impl Probe {
    async fn read(&self) -> std::io::Result<String> {
        match self {
            Probe::File(path) => tokio::fs::read_to_string(path).await,
            Probe::Command(cmd) => {
                let out = tokio::process::Command::new("sh")
                    .arg("-c")
                    .arg(cmd)
                    .kill_on_drop(true)
                    .output()
                    .await?;
                if !out.status.success() {
                    return Err(std::io::Error::other(format!(
                        "`{cmd}` exited with {}",
                        out.status
                    )));
                }
                Ok(String::from_utf8_lossy(&out.stdout).into_owned())
            }
        }
    }
}

/// First whitespace-separated token of `text` as a number, divided by
/// `divisor` and rounded.
pub fn parse_reading(text: &str, divisor: i64) -> Option<i64> {
    let value: f64 = text.split_whitespace().next()?.parse().ok()?;
    if !value.is_finite() || divisor == 0 {
        return None;
    }
    Some((value / divisor as f64).round() as i64)
}

#[derive(Debug)]
pub struct ExternalSource {
    probe: Probe,
    reading: watch::Receiver<Option<i64>>,
    poller: JoinHandle<()>,
}

impl ExternalSource {
    /// Start polling `probe` every `every` on the current Tokio runtime.
    pub fn spawn(probe: Probe, divisor: i64, every: Duration, timeout: Duration) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| GaugeError::Source(format!("cannot start poller for {probe:?}: {e}")))?;
        let (tx, reading) = watch::channel(None);
        let poller = runtime.spawn(poll(probe.clone(), divisor, every, timeout, tx));
        Ok(Self {
            probe,
            reading,
            poller,
        })
    }

    fn describe(&self) -> String {
        match &self.probe {
            Probe::File(path) => path.display().to_string(),
            Probe::Command(cmd) => cmd.clone(),
        }
    }
}

impl Drop for ExternalSource {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

async fn poll(
    probe: Probe,
    divisor: i64,
    every: Duration,
    timeout: Duration,
    tx: watch::Sender<Option<i64>>,
) {
    let mut ticker = tokio::time::interval(every.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let value = match tokio::time::timeout(timeout, probe.read()).await {
            Ok(Ok(text)) => {
                let value = parse_reading(&text, divisor);
                if value.is_none() {
                    debug!(?probe, "probe output is not a number");
                }
                value
            }
            Ok(Err(e)) => {
                warn!(?probe, "probe failed: {e}");
                None
            }
            Err(_) => {
                warn!(?probe, ?timeout, "probe timed out");
                None
            }
        };
        tx.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
        if tx.is_closed() {
            break;
        }
    }
}

impl SampleSource for ExternalSource {
    fn kind(&self) -> MetricKind {
        MetricKind::External
    }

    fn sample(&mut self, face: &mut Face, _tick: u64) {
        if !matches!(self.reading.has_changed(), Ok(true)) && face.raw.is_some() {
            return;
        }
        let value = *self.reading.borrow_and_update();
        face.raw = value;
        match value {
            Some(v) => {
                face.grow_scale_to_fit(v);
                face.value_text = v.to_string();
            }
            None => face.value_text = format!("{} unavailable", self.describe()),
        }
    }
}
