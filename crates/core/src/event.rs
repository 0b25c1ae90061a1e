/// Messages the host loop reacts to.
///
/// Sources:
/// - Host timer           → `Tick`
/// - Config watcher task  → `ConfigReloaded`
/// - Windowing system     → `VisibilityChanged`
/// - Signal handler       → `Shutdown`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Fixed-period timer fired; run one driver tick.
    Tick,
    /// Config file changed on disk; rebuild every face.
    ConfigReloaded,
    /// The dials were shown (`true`) or hidden (`false`).
    VisibilityChanged(bool),
    /// Graceful shutdown requested.
    Shutdown,
}
