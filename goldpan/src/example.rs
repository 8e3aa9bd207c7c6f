//! Paired predicted and reference documents
//!
//! An [`Example`] owns one predicted tokenization and one reference document
//! materialized from annotation records, reconciles the two tokenizations on
//! demand, and projects reference fields onto predicted tokens.

use crate::annotation::{DocAnnotation, Field, FieldValue, TokenAnnotation};
use crate::error::{Error, Result};
use crate::materialize::annotations_to_doc;
use goldpan_core::{biluo, Alignment, Doc, Vocab};
use once_cell::unsync::OnceCell;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// One training example: a predicted document paired with gold annotations
/// and the reference document built from them
///
/// The reference document is materialized at construction; the token
/// alignment between the two tokenizations is computed on first use and
/// cached. Document-level annotations are shared by reference count so that
/// sentence fragments produced by [`Example::split_sents`] do not copy them.
#[derive(Debug, Clone)]
pub struct Example {
    predicted: Doc,
    reference: Doc,
    token_annotation: TokenAnnotation,
    doc_annotation: Arc<DocAnnotation>,
    alignment: OnceCell<Alignment>,
}

impl Example {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Pair a predicted document with empty annotations
    pub fn new(vocab: &mut Vocab, predicted: Doc) -> Result<Self> {
        Self::with_annotations(
            vocab,
            predicted,
            TokenAnnotation::default(),
            DocAnnotation::default(),
        )
    }

    /// Pair a predicted document with the given annotation records
    pub fn with_annotations(
        vocab: &mut Vocab,
        predicted: Doc,
        token_annotation: TokenAnnotation,
        doc_annotation: DocAnnotation,
    ) -> Result<Self> {
        Self::from_parts(vocab, predicted, token_annotation, Arc::new(doc_annotation))
    }

    fn from_parts(
        vocab: &mut Vocab,
        predicted: Doc,
        token_annotation: TokenAnnotation,
        doc_annotation: Arc<DocAnnotation>,
    ) -> Result<Self> {
        let reference = annotations_to_doc(vocab, &predicted, &doc_annotation, &token_annotation)?;
        Ok(Self {
            predicted,
            reference,
            token_annotation,
            doc_annotation,
            alignment: OnceCell::new(),
        })
    }

    /// Pair a predicted document with annotations given as a JSON object
    ///
    /// Token-level fields may appear nested under `token_annotation` or
    /// flattened at the top level, and likewise `cats` and `links` nested
    /// under `doc_annotation` or flattened; a field given both ways is
    /// rejected. When token-level fields are given without `words`, the
    /// predicted document's words stand in as the reference tokenization.
    /// Entities may be given as per-token tags or as `[start, end, label]`
    /// character-offset triples, which are converted against the predicted
    /// document.
    pub fn from_value(vocab: &mut Vocab, value: &Value, predicted: Doc) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::invalid_annotation("example annotations must be an object")
        })?;
        let mut token_fields = Map::new();
        let mut doc_fields = Map::new();
        for (key, val) in object {
            match key.as_str() {
                "token_annotation" => merge_nested(&mut token_fields, key, val)?,
                "doc_annotation" => merge_nested(&mut doc_fields, key, val)?,
                "cats" | "links" => insert_once(&mut doc_fields, key, val)?,
                _ => insert_once(&mut token_fields, key, val)?,
            }
        }
        if !token_fields.is_empty() && !token_fields.contains_key("words") {
            token_fields.insert("words".to_string(), json!(predicted.words()));
        }
        if let Some(entities) = token_fields.get("entities") {
            let offset_form = entities
                .as_array()
                .and_then(|a| a.first())
                .map(Value::is_array)
                .unwrap_or(false);
            if offset_form {
                let offsets = entity_offsets(entities)?;
                let tags = biluo::tags_from_offsets(&predicted, &offsets)?;
                token_fields.insert("entities".to_string(), json!(tags));
            }
        }
        let token_annotation = TokenAnnotation::from_fields(&token_fields)?;
        let doc_annotation = DocAnnotation::from_value(&Value::Object(doc_fields))?;
        Self::with_annotations(vocab, predicted, token_annotation, doc_annotation)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The predicted document
    pub fn predicted(&self) -> &Doc {
        &self.predicted
    }

    /// The reference document materialized from the annotations
    pub fn reference(&self) -> &Doc {
        &self.reference
    }

    /// The predicted document's text
    pub fn text(&self) -> &str {
        self.predicted.text()
    }

    /// The token-level annotation record
    pub fn token_annotation(&self) -> &TokenAnnotation {
        &self.token_annotation
    }

    /// The shared document-level annotation record
    pub fn doc_annotation(&self) -> &Arc<DocAnnotation> {
        &self.doc_annotation
    }

    /// Replace document-level fields, leaving fields passed as `None` alone
    ///
    /// The record is copy-on-write: sentence fragments sharing it keep the
    /// values they were split with. The already materialized reference
    /// document is not rebuilt.
    pub fn set_doc_annotation(
        &mut self,
        cats: Option<HashMap<String, f64>>,
        links: Option<HashMap<String, HashMap<String, f64>>>,
    ) {
        let annot = Arc::make_mut(&mut self.doc_annotation);
        if let Some(cats) = cats {
            annot.cats = cats;
        }
        if let Some(links) = links {
            annot.links = links;
        }
    }

    /// Export the annotation records as a JSON object
    pub fn to_value(&self) -> Value {
        json!({
            "token_annotation": self.token_annotation.to_value(),
            "doc_annotation": self.doc_annotation.to_value(),
        })
    }

    // ========================================================================
    // Alignment and projection
    // ========================================================================

    /// The token alignment between the predicted and reference tokenizations
    ///
    /// Computed on first use and cached. A reference without words aligns
    /// the predicted tokens against themselves.
    pub fn alignment(&self) -> Result<&Alignment> {
        self.alignment.get_or_try_init(|| {
            let cand = self.predicted.words();
            let gold = self.reference.words();
            if gold.is_empty() {
                Ok(Alignment::new(cand, cand)?)
            } else {
                Ok(Alignment::new(cand, gold)?)
            }
        })
    }

    /// Project a reference field onto the predicted tokens
    ///
    /// Returns one entry per predicted token: the reference value where the
    /// token aligns one-to-one or participates in a many-to-one group, and
    /// `None` for whitespace-only tokens, unaligned tokens, and unset
    /// fields. [`Field::Words`] returns the predicted texts themselves.
    /// [`Field::Heads`] values are reference-space token indices.
    pub fn get_aligned(&self, field: Field) -> Result<Vec<Option<FieldValue>>> {
        if field == Field::Words {
            return Ok(self
                .predicted
                .words()
                .iter()
                .map(|w| Some(FieldValue::Str(w.clone())))
                .collect());
        }
        let alignment = self.alignment()?;
        let cand_to_gold = alignment.cand_to_gold();
        let i2j_multi = alignment.i2j_multi();
        let mut values = Vec::with_capacity(self.predicted.len());
        for (i, word) in self.predicted.words().iter().enumerate() {
            if !word.is_empty() && word.chars().all(char::is_whitespace) {
                values.push(None);
            } else if let Some(j) = cand_to_gold[i] {
                values.push(self.token_annotation.field_value(field, j));
            } else if let Some(&j) = i2j_multi.get(&i) {
                values.push(self.token_annotation.field_value(field, j));
            } else {
                values.push(None);
            }
        }
        Ok(values)
    }

    // ========================================================================
    // Resegmentation
    // ========================================================================

    /// Split the example into one example per annotated sentence
    ///
    /// Sentence boundaries come from the `sent_starts` field; token 0 always
    /// opens a sentence. Each fragment gets its own predicted document built
    /// from the sentence's reference words, a re-based token annotation, and
    /// a handle to the shared document-level record; a lone sentence still
    /// yields a rebuilt example. Only an example without annotated words is
    /// returned unchanged. A head or bracket reaching across a boundary is
    /// an error.
    pub fn split_sents(self, vocab: &mut Vocab) -> Result<Vec<Example>> {
        if self.token_annotation.is_empty() {
            return Ok(vec![self]);
        }
        let mut boundaries = vec![0];
        for (i, &flag) in self.token_annotation.sent_starts().iter().enumerate() {
            if i > 0 && flag == 1 {
                boundaries.push(i);
            }
        }
        boundaries.push(self.token_annotation.len());
        let mut examples = Vec::with_capacity(boundaries.len() - 1);
        for window in boundaries.windows(2) {
            let piece = self.token_annotation.slice(window[0], window[1])?;
            let predicted = Doc::new(piece.words().to_vec());
            examples.push(Self::from_parts(
                vocab,
                predicted,
                piece,
                Arc::clone(&self.doc_annotation),
            )?);
        }
        log::debug!("split example into {} sentence fragments", examples.len());
        Ok(examples)
    }
}

fn merge_nested(target: &mut Map<String, Value>, key: &str, value: &Value) -> Result<()> {
    let nested = value.as_object().ok_or_else(|| {
        Error::invalid_annotation(format!("field '{key}' must be an object"))
    })?;
    for (k, v) in nested {
        insert_once(target, k, v)?;
    }
    Ok(())
}

fn insert_once(target: &mut Map<String, Value>, key: &str, value: &Value) -> Result<()> {
    if target.contains_key(key) {
        return Err(Error::invalid_annotation(format!(
            "field '{key}' appears both nested and flattened"
        )));
    }
    target.insert(key.to_string(), value.clone());
    Ok(())
}

fn entity_offsets(value: &Value) -> Result<Vec<(usize, usize, String)>> {
    let entries = value.as_array().ok_or_else(|| {
        Error::invalid_annotation("field 'entities' must be an array")
    })?;
    let mut offsets = Vec::with_capacity(entries.len());
    for entry in entries {
        let triple = entry.as_array().filter(|t| t.len() == 3).ok_or_else(|| {
            Error::invalid_annotation(
                "field 'entities' must contain [start, end, label] triples",
            )
        })?;
        let start = triple[0].as_u64().and_then(|v| usize::try_from(v).ok());
        let end = triple[1].as_u64().and_then(|v| usize::try_from(v).ok());
        let label = triple[2].as_str();
        match (start, end, label) {
            (Some(start), Some(end), Some(label)) => {
                offsets.push((start, end, label.to_string()));
            }
            _ => {
                return Err(Error::invalid_annotation(
                    "field 'entities' must contain [start, end, label] triples",
                ))
            }
        }
    }
    Ok(offsets)
}
