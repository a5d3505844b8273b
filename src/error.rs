/// Errors produced while recovering JSX from a single source text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parse failed at {line}:{column}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("failed to print module: {0}")]
    Emit(#[from] std::io::Error),

    #[error("printer produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Failure of the formatting collaborator. Never crosses the pipeline
/// boundary; see [`crate::format::format_or_passthrough`].
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("formatter rejected input: {0}")]
    Rejected(String),

    #[error(transparent)]
    Pipeline(#[from] Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
