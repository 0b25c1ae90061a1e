//! gauge: animated dial faces for system metrics, drawn in the terminal.
//!
//! Run with:  `RUST_LOG=info gauge [path/to/gauge.toml]`
//!
//! On unix, `SIGUSR1` toggles whether the dials are drawn.

use anyhow::{Context, Result};
use gauge_config::{ConfigWatcher, GaugeConfig};
use gauge_core::{Message, TickDriver};
use gauge_renderer::TextRenderer;
use gauge_sources::SharedSystem;
use std::path::PathBuf;
use std::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

struct App {
    path: PathBuf,
    config: GaugeConfig,
    system: SharedSystem,
    driver: TickDriver<TextRenderer<std::io::Stdout>>,
}

enum Flow {
    Continue,
    Exit,
}

impl App {
    fn new(path: PathBuf) -> Result<Self> {
        let config = gauge_config::load(&path)
            .with_context(|| format!("loading '{}'", path.display()))?;
        let system = SharedSystem::new();
        let slots = gauge_sources::slots(&config, &system)?;
        let mut driver = TickDriver::with_slots(TextRenderer::stdout(), slots);
        driver.set_visible(!config.global.start_hidden);
        Ok(Self {
            path,
            config,
            system,
            driver,
        })
    }

    fn handle(&mut self, message: Message) -> Flow {
        match message {
            Message::Tick => {
                self.driver.tick(Instant::now());
            }
            Message::ConfigReloaded => match self.reload() {
                Ok(()) => tracing::info!(faces = self.driver.faces().len(), "config reloaded"),
                Err(e) => tracing::warn!("Keeping previous config: {e:#}"),
            },
            Message::VisibilityChanged(visible) => {
                tracing::info!(visible, "visibility changed");
                self.driver.set_visible(visible);
            }
            Message::Shutdown => return Flow::Exit,
        }
        Flow::Continue
    }

    fn reload(&mut self) -> Result<()> {
        let config = gauge_config::load(&self.path)?;
        let slots = gauge_sources::slots(&config, &self.system)?;
        self.driver.replace_slots(slots);
        self.config = config;
        Ok(())
    }
}

#[cfg(unix)]
async fn toggle_requested(
    signal: &mut Option<tokio::signal::unix::Signal>,
) -> Option<()> {
    match signal {
        Some(s) => s.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(not(unix))]
async fn toggle_requested(_: &mut Option<()>) -> Option<()> {
    std::future::pending().await
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (default: info). Frames go to stdout, logs to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("gauge v{} starting", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(gauge_config::default_path);

    let mut app = App::new(path.clone())?;
    let (_watcher, mut reloads) = ConfigWatcher::spawn(&path);

    let mut ticker = tokio::time::interval(app.config.tick_period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    #[cfg(unix)]
    let mut toggle = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::user_defined1()) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!("SIGUSR1 unavailable; visibility toggling disabled: {e}");
            None
        }
    };
    #[cfg(not(unix))]
    let mut toggle: Option<()> = None;

    loop {
        let message = tokio::select! {
            _ = ticker.tick() => Message::Tick,
            Some(()) = reloads.recv() => Message::ConfigReloaded,
            Some(()) = toggle_requested(&mut toggle) => {
                Message::VisibilityChanged(!app.driver.is_visible())
            }
            _ = tokio::signal::ctrl_c() => Message::Shutdown,
        };

        let period = app.config.tick_period();
        if let Flow::Exit = app.handle(message) {
            break;
        }
        if app.config.tick_period() != period {
            ticker = tokio::time::interval(app.config.tick_period());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        }
    }

    tracing::info!("gauge shutting down");
    Ok(())
}
