use thiserror::Error;

/// Top-level error type used across the workspace.
///
/// The update engine itself never fails; these variants cover the edges
/// where configuration is read and sample sources are constructed.
#[derive(Debug, Error)]
pub enum GaugeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("source error: {0}")]
    Source(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = GaugeError> = std::result::Result<T, E>;
