//! Annotation records carried by training examples
//!
//! [`TokenAnnotation`] is a columnar record of per-token fields over one
//! flat token sequence; [`DocAnnotation`] carries document-scoped fields
//! independent of any tokenization. Shape invariants are enforced once, at
//! construction, and relied on everywhere downstream.

use crate::error::{Error, Result};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Token-level annotation
// ============================================================================

/// Per-token annotation fields for one token sequence
///
/// `words` is authoritative for the length `n`; every other field is either
/// empty (unset) or has exactly `n` entries. Build instances through
/// [`TokenAnnotation::builder`], which rejects ragged shapes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenAnnotation {
    ids: Vec<usize>,
    words: Vec<String>,
    tags: Vec<String>,
    pos: Vec<String>,
    morphs: Vec<String>,
    lemmas: Vec<String>,
    heads: Vec<usize>,
    deps: Vec<String>,
    entities: Vec<String>,
    sent_starts: Vec<i32>,
    brackets_by_start: BTreeMap<usize, Vec<(usize, String)>>,
}

impl TokenAnnotation {
    /// Start building a token annotation
    pub fn builder() -> TokenAnnotationBuilder {
        TokenAnnotationBuilder::default()
    }

    /// Parse a token annotation from its canonical JSON object shape
    ///
    /// Entities must already be in tag form; converting offset triples
    /// requires a document and happens at the example boundary.
    pub fn from_value(value: &Value) -> Result<Self> {
        let fields = value.as_object().ok_or_else(|| {
            Error::invalid_annotation("token annotation must be an object")
        })?;
        Self::from_fields(fields)
    }

    pub(crate) fn from_fields(fields: &Map<String, Value>) -> Result<Self> {
        let mut builder = Self::builder();
        for (key, value) in fields {
            builder = match key.as_str() {
                "ids" => builder.ids(index_seq(key, value)?),
                "words" => builder.words(string_seq(key, value)?),
                "tags" => builder.tags(string_seq(key, value)?),
                "pos" => builder.pos(string_seq(key, value)?),
                "morphs" => builder.morphs(string_seq(key, value)?),
                "lemmas" => builder.lemmas(string_seq(key, value)?),
                "heads" => builder.heads(index_seq(key, value)?),
                "deps" => builder.deps(string_seq(key, value)?),
                "entities" => builder.entities(tag_seq(value)?),
                "sent_starts" => builder.sent_starts(flag_seq(key, value)?),
                "brackets" => builder.brackets(bracket_seq(value)?),
                _ => {
                    return Err(Error::invalid_annotation(format!(
                        "unknown token annotation field '{key}'"
                    )))
                }
            };
        }
        builder.build()
    }

    /// Export the canonical JSON object shape
    pub fn to_value(&self) -> Value {
        let brackets: Vec<Value> = self
            .brackets()
            .map(|(start, end, label)| json!([start, end, label]))
            .collect();
        json!({
            "ids": self.ids,
            "words": self.words,
            "tags": self.tags,
            "pos": self.pos,
            "morphs": self.morphs,
            "lemmas": self.lemmas,
            "heads": self.heads,
            "deps": self.deps,
            "entities": self.entities,
            "sent_starts": self.sent_starts,
            "brackets": brackets,
        })
    }

    /// Number of tokens covered
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the annotation covers no tokens
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// External token identifiers (position indices unless supplied)
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Reference token texts
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Fine-grained tags
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Coarse part-of-speech tags
    pub fn pos(&self) -> &[String] {
        &self.pos
    }

    /// Morphological features
    pub fn morphs(&self) -> &[String] {
        &self.morphs
    }

    /// Lemmas
    pub fn lemmas(&self) -> &[String] {
        &self.lemmas
    }

    /// Absolute head indices (a root points at itself)
    pub fn heads(&self) -> &[usize] {
        &self.heads
    }

    /// Dependency labels
    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    /// Per-token BILUO entity tags
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// Sentence-start flags (`1` opens a sentence; token 0 always does)
    pub fn sent_starts(&self) -> &[i32] {
        &self.sent_starts
    }

    /// Bracket spans grouped by their start token
    pub fn brackets_by_start(&self) -> &BTreeMap<usize, Vec<(usize, String)>> {
        &self.brackets_by_start
    }

    /// Bracket spans flattened to `(start, end, label)` triples
    pub fn brackets(&self) -> impl Iterator<Item = (usize, usize, &str)> + '_ {
        self.brackets_by_start.iter().flat_map(|(&start, ends)| {
            ends.iter().map(move |(end, label)| (start, *end, label.as_str()))
        })
    }

    /// Value of `field` at token `i`, or `None` when the field is unset
    pub fn field_value(&self, field: Field, i: usize) -> Option<FieldValue> {
        match field {
            Field::Ids => self.ids.get(i).map(|&v| FieldValue::Int(v as i64)),
            Field::Words => self.words.get(i).cloned().map(FieldValue::Str),
            Field::Tags => self.tags.get(i).cloned().map(FieldValue::Str),
            Field::Pos => self.pos.get(i).cloned().map(FieldValue::Str),
            Field::Morphs => self.morphs.get(i).cloned().map(FieldValue::Str),
            Field::Lemmas => self.lemmas.get(i).cloned().map(FieldValue::Str),
            Field::Heads => self.heads.get(i).map(|&v| FieldValue::Int(v as i64)),
            Field::Deps => self.deps.get(i).cloned().map(FieldValue::Str),
            Field::Entities => self.entities.get(i).cloned().map(FieldValue::Str),
            Field::SentStarts => self.sent_starts.get(i).map(|&v| FieldValue::Int(v.into())),
        }
    }

    /// Extract tokens `[origin, end)` as a standalone annotation
    ///
    /// Heads and bracket spans are re-based to the new origin; a head or
    /// bracket crossing the boundary is an error. Unset fields stay unset.
    /// `ids` are copied as-is.
    pub fn slice(&self, origin: usize, end: usize) -> Result<TokenAnnotation> {
        if origin >= end || end > self.len() {
            return Err(Error::invalid_annotation(format!(
                "slice [{origin}, {end}) out of range for {} tokens",
                self.len()
            )));
        }
        let heads = if self.heads.is_empty() {
            Vec::new()
        } else {
            let mut rebased = Vec::with_capacity(end - origin);
            for (offset, &head) in self.heads[origin..end].iter().enumerate() {
                if head < origin || head >= end {
                    return Err(Error::invalid_annotation(format!(
                        "head {head} of token {} crosses the sentence boundary [{origin}, {end})",
                        origin + offset
                    )));
                }
                rebased.push(head - origin);
            }
            rebased
        };
        let mut brackets = Vec::new();
        for (&start, ends) in self.brackets_by_start.range(origin..end) {
            for (bracket_end, label) in ends {
                if *bracket_end >= end {
                    return Err(Error::invalid_annotation(format!(
                        "bracket [{start}, {bracket_end}] crosses the sentence boundary [{origin}, {end})"
                    )));
                }
                brackets.push((start - origin, bracket_end - origin, label.clone()));
            }
        }
        Self::builder()
            .ids(sliced(&self.ids, origin, end))
            .words(sliced(&self.words, origin, end))
            .tags(sliced(&self.tags, origin, end))
            .pos(sliced(&self.pos, origin, end))
            .morphs(sliced(&self.morphs, origin, end))
            .lemmas(sliced(&self.lemmas, origin, end))
            .heads(heads)
            .deps(sliced(&self.deps, origin, end))
            .entities(sliced(&self.entities, origin, end))
            .sent_starts(sliced(&self.sent_starts, origin, end))
            .brackets(brackets)
            .build()
    }
}

fn sliced<T: Clone>(field: &[T], origin: usize, end: usize) -> Vec<T> {
    if field.is_empty() {
        Vec::new()
    } else {
        field[origin..end].to_vec()
    }
}

/// Builder validating [`TokenAnnotation`] shape invariants
#[derive(Debug, Clone, Default)]
pub struct TokenAnnotationBuilder {
    ids: Vec<usize>,
    words: Vec<String>,
    tags: Vec<String>,
    pos: Vec<String>,
    morphs: Vec<String>,
    lemmas: Vec<String>,
    heads: Vec<usize>,
    deps: Vec<String>,
    entities: Vec<String>,
    sent_starts: Vec<i32>,
    brackets: Vec<(usize, usize, String)>,
}

impl TokenAnnotationBuilder {
    /// Set the reference token texts
    pub fn words<S: Into<String>>(mut self, words: Vec<S>) -> Self {
        self.words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Set external token identifiers (defaults to positions)
    pub fn ids(mut self, ids: Vec<usize>) -> Self {
        self.ids = ids;
        self
    }

    /// Set fine-grained tags
    pub fn tags<S: Into<String>>(mut self, tags: Vec<S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set coarse part-of-speech tags
    pub fn pos<S: Into<String>>(mut self, pos: Vec<S>) -> Self {
        self.pos = pos.into_iter().map(Into::into).collect();
        self
    }

    /// Set morphological features
    pub fn morphs<S: Into<String>>(mut self, morphs: Vec<S>) -> Self {
        self.morphs = morphs.into_iter().map(Into::into).collect();
        self
    }

    /// Set lemmas
    pub fn lemmas<S: Into<String>>(mut self, lemmas: Vec<S>) -> Self {
        self.lemmas = lemmas.into_iter().map(Into::into).collect();
        self
    }

    /// Set absolute head indices
    pub fn heads(mut self, heads: Vec<usize>) -> Self {
        self.heads = heads;
        self
    }

    /// Set dependency labels
    pub fn deps<S: Into<String>>(mut self, deps: Vec<S>) -> Self {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set per-token BILUO entity tags
    pub fn entities<S: Into<String>>(mut self, entities: Vec<S>) -> Self {
        self.entities = entities.into_iter().map(Into::into).collect();
        self
    }

    /// Set sentence-start flags
    pub fn sent_starts(mut self, sent_starts: Vec<i32>) -> Self {
        self.sent_starts = sent_starts;
        self
    }

    /// Set bracket spans as `(start, end, label)` triples with inclusive ends
    pub fn brackets(mut self, brackets: Vec<(usize, usize, String)>) -> Self {
        self.brackets = brackets;
        self
    }

    /// Validate the shape invariants and build the annotation
    pub fn build(self) -> Result<TokenAnnotation> {
        let n = self.words.len();
        let ids = if self.ids.is_empty() {
            (0..n).collect()
        } else {
            check_len("ids", self.ids.len(), n)?;
            self.ids
        };
        for (name, len) in [
            ("tags", self.tags.len()),
            ("pos", self.pos.len()),
            ("morphs", self.morphs.len()),
            ("lemmas", self.lemmas.len()),
            ("deps", self.deps.len()),
            ("entities", self.entities.len()),
        ] {
            if len != 0 {
                check_len(name, len, n)?;
            }
        }
        if !self.heads.is_empty() {
            check_len("heads", self.heads.len(), n)?;
            for (i, &head) in self.heads.iter().enumerate() {
                if head >= n {
                    return Err(Error::invalid_annotation(format!(
                        "head {head} of token {i} is out of range for {n} tokens"
                    )));
                }
            }
        }
        if !self.sent_starts.is_empty() {
            check_len("sent_starts", self.sent_starts.len(), n)?;
            for (i, &flag) in self.sent_starts.iter().enumerate() {
                if flag != 0 && flag != 1 {
                    return Err(Error::invalid_annotation(format!(
                        "sent_start {flag} of token {i} is not 0 or 1"
                    )));
                }
            }
        }
        let mut brackets_by_start: BTreeMap<usize, Vec<(usize, String)>> = BTreeMap::new();
        for (start, end, label) in self.brackets {
            if start > end || end >= n {
                return Err(Error::invalid_annotation(format!(
                    "bracket [{start}, {end}] out of range for {n} tokens"
                )));
            }
            brackets_by_start.entry(start).or_default().push((end, label));
        }
        Ok(TokenAnnotation {
            ids,
            words: self.words,
            tags: self.tags,
            pos: self.pos,
            morphs: self.morphs,
            lemmas: self.lemmas,
            heads: self.heads,
            deps: self.deps,
            entities: self.entities,
            sent_starts: self.sent_starts,
            brackets_by_start,
        })
    }
}

fn check_len(name: &str, len: usize, n: usize) -> Result<()> {
    if len != n {
        return Err(Error::invalid_annotation(format!(
            "field '{name}' has {len} values for {n} words"
        )));
    }
    Ok(())
}

// ============================================================================
// Field dispatch
// ============================================================================

/// Identifier of a [`TokenAnnotation`] column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// External token identifiers
    Ids,
    /// Token texts
    Words,
    /// Fine-grained tags
    Tags,
    /// Coarse part-of-speech tags
    Pos,
    /// Morphological features
    Morphs,
    /// Lemmas
    Lemmas,
    /// Absolute head indices
    Heads,
    /// Dependency labels
    Deps,
    /// Per-token BILUO entity tags
    Entities,
    /// Sentence-start flags
    SentStarts,
}

impl Field {
    /// Canonical field name, as used in the JSON boundary shape
    pub fn name(&self) -> &'static str {
        match self {
            Field::Ids => "ids",
            Field::Words => "words",
            Field::Tags => "tags",
            Field::Pos => "pos",
            Field::Morphs => "morphs",
            Field::Lemmas => "lemmas",
            Field::Heads => "heads",
            Field::Deps => "deps",
            Field::Entities => "entities",
            Field::SentStarts => "sent_starts",
        }
    }
}

/// A single per-token annotation value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Integer-valued fields: ids, heads, sentence-start flags
    Int(i64),
    /// String-valued fields: words, tags, pos, morphs, lemmas, deps, entities
    Str(String),
}

impl FieldValue {
    /// The integer value, if this is an integer field
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Str(_) => None,
        }
    }

    /// The string value, if this is a string field
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Int(_) => None,
            FieldValue::Str(v) => Some(v),
        }
    }
}

// ============================================================================
// Document-level annotation
// ============================================================================

/// Document-scoped annotation fields, independent of tokenization
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocAnnotation {
    /// Category name to score
    pub cats: HashMap<String, f64>,
    /// Mention identifier to knowledge-base identifier to confidence
    pub links: HashMap<String, HashMap<String, f64>>,
}

impl DocAnnotation {
    /// Parse a document annotation from its canonical JSON object shape
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| Error::invalid_annotation(format!("doc annotation: {e}")))
    }

    /// Export the canonical JSON object shape
    pub fn to_value(&self) -> Value {
        json!({ "cats": self.cats, "links": self.links })
    }
}

// ============================================================================
// Value parsing helpers
// ============================================================================

fn string_seq(key: &str, value: &Value) -> Result<Vec<String>> {
    let array = seq(key, value)?;
    array
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                Error::invalid_annotation(format!("field '{key}' must contain strings"))
            })
        })
        .collect()
}

fn tag_seq(value: &Value) -> Result<Vec<String>> {
    string_seq("entities", value).map_err(|_| {
        Error::invalid_annotation(
            "field 'entities' must contain tag strings; offset triples are only accepted \
             at the example boundary",
        )
    })
}

fn index_seq(key: &str, value: &Value) -> Result<Vec<usize>> {
    let array = seq(key, value)?;
    array
        .iter()
        .map(|v| {
            v.as_u64().and_then(|v| usize::try_from(v).ok()).ok_or_else(|| {
                Error::invalid_annotation(format!(
                    "field '{key}' must contain non-negative integers"
                ))
            })
        })
        .collect()
}

fn flag_seq(key: &str, value: &Value) -> Result<Vec<i32>> {
    let array = seq(key, value)?;
    array
        .iter()
        .map(|v| {
            v.as_i64().and_then(|v| i32::try_from(v).ok()).ok_or_else(|| {
                Error::invalid_annotation(format!("field '{key}' must contain integers"))
            })
        })
        .collect()
}

fn bracket_seq(value: &Value) -> Result<Vec<(usize, usize, String)>> {
    let array = seq("brackets", value)?;
    let mut brackets = Vec::with_capacity(array.len());
    for entry in array {
        let triple = entry.as_array().filter(|t| t.len() == 3).ok_or_else(|| {
            Error::invalid_annotation("field 'brackets' must contain [start, end, label] triples")
        })?;
        let start = triple[0].as_u64().and_then(|v| usize::try_from(v).ok());
        let end = triple[1].as_u64().and_then(|v| usize::try_from(v).ok());
        let label = triple[2].as_str();
        match (start, end, label) {
            (Some(start), Some(end), Some(label)) => {
                brackets.push((start, end, label.to_string()));
            }
            _ => {
                return Err(Error::invalid_annotation(
                    "field 'brackets' must contain [start, end, label] triples",
                ))
            }
        }
    }
    Ok(brackets)
}

fn seq<'a>(key: &str, value: &'a Value) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::invalid_annotation(format!("field '{key}' must be an array")))
}
