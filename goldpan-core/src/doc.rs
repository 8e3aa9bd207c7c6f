//! Token containers
//!
//! A [`Doc`] holds one tokenization of a text: ordered token texts,
//! trailing-space flags, the derived text, and per-token attribute columns
//! written in bulk by the annotation materializer.

use crate::error::{CoreError, Result};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Attribute Columns
// ============================================================================

/// Named per-token attribute columns a document can carry
///
/// Columns hold interned symbols, except [`Attr::Head`] which holds the
/// relative offset from each token to its syntactic head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attr {
    /// Fine-grained tag
    Tag,
    /// Coarse part-of-speech
    Pos,
    /// Lemma
    Lemma,
    /// Dependency label
    Dep,
    /// Syntactic head, as a relative token offset
    Head,
}

impl Attr {
    /// Canonical column name
    pub fn name(&self) -> &'static str {
        match self {
            Attr::Tag => "TAG",
            Attr::Pos => "POS",
            Attr::Lemma => "LEMMA",
            Attr::Dep => "DEP",
            Attr::Head => "HEAD",
        }
    }
}

// ============================================================================
// Spans
// ============================================================================

/// Labeled token span `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Index of the first token in the span
    pub start: usize,
    /// Index one past the last token in the span
    pub end: usize,
    /// Span label
    pub label: String,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }
}

// ============================================================================
// Documents
// ============================================================================

/// One tokenization of a text, with room for per-token attribute columns,
/// entity spans, and category scores
///
/// Token char offsets are derived at construction and never change; code
/// that aligns two documents relies on their token texts staying fixed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Doc {
    words: Vec<String>,
    spaces: Vec<bool>,
    text: String,
    starts: Vec<usize>,
    attrs: BTreeMap<Attr, Vec<i64>>,
    ents: Vec<Span>,
    cats: HashMap<String, f64>,
}

impl Doc {
    /// Build a document from token texts, joined by single spaces
    pub fn new<S: Into<String>>(words: Vec<S>) -> Self {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        let n = words.len();
        let spaces = (0..n).map(|i| i + 1 < n).collect();
        Self::build(words, spaces)
    }

    /// Build a document from token texts and trailing-space flags
    pub fn with_spaces<S: Into<String>>(words: Vec<S>, spaces: Vec<bool>) -> Result<Self> {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.len() != spaces.len() {
            return Err(CoreError::Document {
                reason: format!(
                    "words/spaces length mismatch: {} vs {}",
                    words.len(),
                    spaces.len()
                ),
            });
        }
        Ok(Self::build(words, spaces))
    }

    /// Build a tokenless placeholder that retains only the raw text
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    fn build(words: Vec<String>, spaces: Vec<bool>) -> Self {
        let mut text = String::new();
        let mut starts = Vec::with_capacity(words.len());
        let mut offset = 0usize;
        for (word, &space) in words.iter().zip(&spaces) {
            starts.push(offset);
            text.push_str(word);
            offset += word.chars().count();
            if space {
                text.push(' ');
                offset += 1;
            }
        }
        Self {
            words,
            spaces,
            text,
            starts,
            attrs: BTreeMap::new(),
            ents: Vec::new(),
            cats: HashMap::new(),
        }
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the document has no tokens
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Ordered token texts
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Text of token `i`
    pub fn word(&self, i: usize) -> Option<&str> {
        self.words.get(i).map(String::as_str)
    }

    /// Trailing-space flags, one per token
    pub fn spaces(&self) -> &[bool] {
        &self.spaces
    }

    /// The document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Char offsets `(start, end)` of token `i` within the text
    pub fn char_span(&self, i: usize) -> Option<(usize, usize)> {
        let start = *self.starts.get(i)?;
        Some((start, start + self.words[i].chars().count()))
    }

    /// Set attribute columns in one operation
    ///
    /// Every column is validated against the token count before any column
    /// is stored, so a failed call leaves the document unchanged.
    pub fn apply_attrs(&mut self, attrs: &[Attr], columns: Vec<Vec<i64>>) -> Result<()> {
        if attrs.len() != columns.len() {
            return Err(CoreError::Document {
                reason: format!(
                    "{} attribute names for {} columns",
                    attrs.len(),
                    columns.len()
                ),
            });
        }
        for (attr, column) in attrs.iter().zip(&columns) {
            if column.len() != self.words.len() {
                return Err(CoreError::Document {
                    reason: format!(
                        "column {} has {} values for {} tokens",
                        attr.name(),
                        column.len(),
                        self.words.len()
                    ),
                });
            }
        }
        for (i, attr) in attrs.iter().enumerate() {
            if attrs[i + 1..].contains(attr) {
                return Err(CoreError::Document {
                    reason: format!("duplicate column {}", attr.name()),
                });
            }
        }
        for (attr, column) in attrs.iter().zip(columns) {
            self.attrs.insert(*attr, column);
        }
        Ok(())
    }

    /// Read an attribute column back
    pub fn attr(&self, attr: Attr) -> Option<&[i64]> {
        self.attrs.get(&attr).map(Vec::as_slice)
    }

    /// Number of attribute columns present
    pub fn attr_count(&self) -> usize {
        self.attrs.len()
    }

    /// Set the document's entity spans
    pub fn set_ents(&mut self, ents: Vec<Span>) -> Result<()> {
        for span in &ents {
            if span.start >= span.end || span.end > self.words.len() {
                return Err(CoreError::Document {
                    reason: format!(
                        "entity span [{}, {}) out of range for {} tokens",
                        span.start,
                        span.end,
                        self.words.len()
                    ),
                });
            }
        }
        self.ents = ents;
        Ok(())
    }

    /// The document's entity spans
    pub fn ents(&self) -> &[Span] {
        &self.ents
    }

    /// Replace the document's category scores
    pub fn set_cats(&mut self, cats: HashMap<String, f64>) {
        self.cats = cats;
    }

    /// The document's category scores
    pub fn cats(&self) -> &HashMap<String, f64> {
        &self.cats
    }

    /// Mutable access to the category scores
    pub fn cats_mut(&mut self) -> &mut HashMap<String, f64> {
        &mut self.cats
    }
}
