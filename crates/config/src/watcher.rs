use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Quiet period after the last filesystem event before a reload fires.
const DEBOUNCE: Duration = Duration::from_millis(250);

/// Watches a config file and sends one notification per burst of writes.
///
/// The parent directory is watched rather than the file itself, so editors
/// that save by writing a temporary file and renaming it over the original
/// are still seen.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// let (_watcher, mut rx) = gauge_config::ConfigWatcher::spawn("/home/user/.config/gauge/gauge.toml");
/// while rx.recv().await.is_some() {
///     println!("config changed; rebuilding faces");
/// }
/// # }
/// ```
///
/// Watching stops when the handle is dropped.
pub struct ConfigWatcher {
    task: JoinHandle<()>,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver that fires after each change.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(watch_loop(path.as_ref().to_path_buf(), tx));
        (Self { task }, rx)
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Whether a filesystem event concerns the watched file.
fn touches(event: &notify::Event, path: &Path) -> bool {
    use notify::EventKind::{Create, Modify, Remove};
    matches!(event.kind, Modify(_) | Create(_) | Remove(_))
        && event.paths.iter().any(|p| p.file_name() == path.file_name())
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

    let (event_tx, mut event_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = event_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", dir.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    while let Some(event) = event_rx.recv().await {
        match event {
            Ok(e) if touches(&e, &path) => {
                // Swallow the rest of the burst.
                while let Ok(Some(_)) = tokio::time::timeout(DEBOUNCE, event_rx.recv()).await {}
                if tx.send(()).await.is_err() {
                    break; // receiver dropped
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Watcher error: {e}"),
        }
    }
}
