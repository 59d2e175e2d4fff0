use thiserror::Error;

/// Setup- and storage-level failures.
///
/// Per-recipient delivery failures are deliberately NOT here: they are
/// handled inside the send loop (logged, skipped) and never escalate to the
/// batch. See `ports::transport::TransportError` for the transport side.
#[derive(Debug, Error)]
pub enum CourierError {
    /// The recipient source is missing or unreadable. Fatal to a run.
    #[error("recipient source {path}: {message}")]
    Source { path: String, message: String },

    /// A persisted log could not be read or appended to.
    #[error("storage {path}: {message}")]
    Storage { path: String, message: String },

    /// The transport rejected our credentials. Fatal to a run.
    #[error("transport authentication failed: {0}")]
    Auth(String),

    /// Bad run parameters (addresses, URLs, column names).
    #[error("configuration: {0}")]
    Config(String),
}

impl CourierError {
    pub fn source(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        Self::Source {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    pub fn storage(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        Self::Storage {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }
}
