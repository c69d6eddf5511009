/// Crate-level error type for block streaming.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid parameter value or combination, detected before any read.
    #[error("invalid configuration `{name}`: got {value}, {reason}")]
    Configuration {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The backing source failed while being read.
    #[error(transparent)]
    SourceRead(#[from] crate::source::SourceError),

    /// An operation that needs the whole signal was requested on a stream.
    #[error("`{operation}` is not supported while streaming: {reason}")]
    UnsupportedOperation {
        operation: &'static str,
        reason: String,
    },

    /// File I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::Configuration {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience Result type for blockstream operations.
pub type Result<T> = std::result::Result<T, Error>;
