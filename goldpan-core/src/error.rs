//! Core error types
//!
//! Alignment, span codec, and document container failures share one enum so
//! the API layer can wrap them uniformly.

use thiserror::Error;

/// Core-level errors (alignment, codec, containers)
#[derive(Error, Debug)]
pub enum CoreError {
    /// Token-text sequences whose concatenations diverge
    #[error("cannot align tokenizations: texts diverge at candidate token {cand_index}, reference token {gold_index}")]
    AlignmentFailed {
        /// Candidate token index where reconciliation stopped
        cand_index: usize,
        /// Reference token index where reconciliation stopped
        gold_index: usize,
    },

    /// Entity character span that does not land on token boundaries
    #[error("entity span [{start}, {end}) with label '{label}' does not align to token boundaries")]
    MisalignedSpan {
        /// Character offset where the entity starts
        start: usize,
        /// Character offset where the entity ends
        end: usize,
        /// Entity label
        label: String,
    },

    /// Entity character span claiming an already-tagged token
    #[error("entity span [{start}, {end}) overlaps a previously tagged token")]
    OverlappingSpan {
        /// Character offset where the entity starts
        start: usize,
        /// Character offset where the entity ends
        end: usize,
    },

    /// Tag sequence violating the BILUO grammar
    #[error("invalid tag sequence at position {index}: {reason}")]
    InvalidTagSequence {
        /// Index of the offending tag
        index: usize,
        /// What the grammar expected instead
        reason: String,
    },

    /// Document container misuse
    #[error("document error: {reason}")]
    Document {
        /// The reason why the document operation failed
        reason: String,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
