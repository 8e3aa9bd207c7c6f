//! Core machinery for reconciling tokenizations
//!
//! This crate provides the pieces the goldpan API is assembled from: a
//! string-interning vocabulary, a token container with bulk attribute
//! columns, the alignment between two tokenizations of one text, and the
//! strict BILUO span codec.

#![warn(missing_docs)]

pub mod align;
pub mod biluo;
pub mod doc;
pub mod error;
pub mod vocab;

// Re-export key types
pub use align::Alignment;
pub use doc::{Attr, Doc, Span};
pub use error::{CoreError, Result};
pub use vocab::{Sym, Vocab};
