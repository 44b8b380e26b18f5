//! ETA provider error types.

/// Errors from an ETA provider.
#[derive(Debug, thiserror::Error)]
pub enum EtaError {
    /// Reading provider data failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider data could not be parsed
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A stop name matched more than one stop
    #[error("ambiguous stop {stop:?}: {candidates} candidates")]
    AmbiguousStop { stop: String, candidates: usize },

    /// Provider is missing configuration (credentials, data files)
    #[error("not configured: {0}")]
    NotConfigured(String),
}
