//! Gold-annotation projection between predicted and reference tokenizations
//!
//! Training annotations carry their own tokenization, which rarely matches
//! the one a tokenizer produces. This crate pairs the two in an [`Example`]:
//! it materializes a reference document from annotation records, aligns the
//! two token sequences, projects reference fields onto predicted tokens even
//! across token splits and merges, and resegments document-scoped
//! annotations into per-sentence examples with re-based indices.
//!
//! # Quick start
//!
//! ```
//! use goldpan::{Doc, Example, Field, TokenAnnotation, Vocab};
//!
//! # fn main() -> Result<(), goldpan::Error> {
//! let mut vocab = Vocab::new();
//! let annotation = TokenAnnotation::builder()
//!     .words(vec!["NewYork", "sleeps"])
//!     .tags(vec!["NNP", "VBZ"])
//!     .build()?;
//! let predicted = Doc::new(vec!["New", "York", "sleeps"]);
//! let example = Example::with_annotations(&mut vocab, predicted, annotation, Default::default())?;
//!
//! // Both halves of the split token inherit the tag of "NewYork".
//! let tags = example.get_aligned(Field::Tags)?;
//! assert_eq!(tags[0].as_ref().and_then(|v| v.as_str()), Some("NNP"));
//! assert_eq!(tags[1].as_ref().and_then(|v| v.as_str()), Some("NNP"));
//! assert_eq!(tags[2].as_ref().and_then(|v| v.as_str()), Some("VBZ"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod annotation;
pub mod error;
pub mod example;
pub mod input;
pub mod materialize;

pub use annotation::{DocAnnotation, Field, FieldValue, TokenAnnotation, TokenAnnotationBuilder};
pub use error::{Error, Result};
pub use example::Example;
pub use input::{DocInput, ExampleInput, Normalizer};
pub use materialize::annotations_to_doc;

pub use goldpan_core::{biluo, Alignment, Attr, CoreError, Doc, Span, Sym, Vocab};
