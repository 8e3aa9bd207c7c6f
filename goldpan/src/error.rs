//! API-level error types

use goldpan_core::CoreError;
use thiserror::Error;

/// Errors surfaced by the goldpan API
#[derive(Error, Debug)]
pub enum Error {
    /// Core error (alignment, span codec, document containers)
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Annotation shape or value rejected during construction
    #[error("invalid annotation: {reason}")]
    InvalidAnnotation {
        /// The reason why the annotation was rejected
        reason: String,
    },

    /// A string input reached the normalizer without a tokenizer
    #[error("string input requires a tokenizer; provide one or enable keep_raw_text")]
    TokenizerRequired,
}

impl Error {
    /// Construction failure with the given reason
    pub fn invalid_annotation(reason: impl Into<String>) -> Self {
        Error::InvalidAnnotation {
            reason: reason.into(),
        }
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, Error>;
