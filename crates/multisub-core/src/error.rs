use thiserror::Error;

/// Boxed error returned by dynamic replacement callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Canonical errors for multisub core
#[derive(Error, Debug)]
pub enum Error {
    // -------- Normalize / Combine --------
    #[error("invalid pattern `{pattern}`: {message}")]
    PatternSyntax { pattern: String, message: String },

    #[error("no replacement pairs supplied")]
    NoPairs,

    // -------- Replacement --------
    #[error("invalid replacement template `{template}` at byte {position}: {reason}")]
    InvalidTemplate {
        template: String,
        position: usize,
        reason: String,
    },

    #[error("replacement callback failed: {0}")]
    Callback(#[source] BoxError),

    #[error("combined pattern and pair table out of sync: {0}")]
    InternalInconsistency(String),

    // -------- Scan --------
    #[error("invalid range: [{0}, {1})")]
    InvalidRange(usize, usize),

    #[error("operation aborted")]
    Aborted,

    // -------- Wrapped sources --------
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
