//! Input normalization for example construction
//!
//! Training data arrives in mixed shapes: ready-made examples, tokenized
//! documents, raw strings, and documents paired with annotation values. The
//! [`Normalizer`] turns any mix of them into a uniform list of examples.

use crate::error::{Error, Result};
use crate::example::Example;
use goldpan_core::{Doc, Vocab};
use serde_json::Value;

/// A document given either tokenized or as raw text
pub enum DocInput {
    /// An already tokenized document
    Doc(Doc),
    /// Raw text, to be tokenized or kept as a placeholder
    Text(String),
}

impl std::fmt::Debug for DocInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocInput::Doc(doc) => f
                .debug_tuple("Doc")
                .field(&format!("<{} tokens>", doc.len()))
                .finish(),
            DocInput::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

/// One unit of training input, in any accepted shape
pub enum ExampleInput {
    /// A ready-made example, passed through unchanged
    Example(Example),
    /// A tokenized document without annotations
    Doc(Doc),
    /// Raw text without annotations
    Text(String),
    /// A document paired with an annotation value
    Annotated(DocInput, Value),
}

impl ExampleInput {
    /// Pair a document input with an annotation value
    pub fn annotated(input: impl Into<DocInput>, annotations: Value) -> Self {
        ExampleInput::Annotated(input.into(), annotations)
    }
}

impl std::fmt::Debug for ExampleInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExampleInput::Example(example) => f
                .debug_tuple("Example")
                .field(&format!("<{} tokens>", example.predicted().len()))
                .finish(),
            ExampleInput::Doc(doc) => f
                .debug_tuple("Doc")
                .field(&format!("<{} tokens>", doc.len()))
                .finish(),
            ExampleInput::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ExampleInput::Annotated(input, _) => f
                .debug_tuple("Annotated")
                .field(input)
                .field(&"<annotations>")
                .finish(),
        }
    }
}

/// Converter from mixed inputs to a uniform list of [`Example`]s
///
/// Raw text needs a tokenizer to become a document; alternatively the
/// normalizer can keep raw text as tokenless placeholder documents.
pub struct Normalizer<'a> {
    make_doc: Option<Box<dyn FnMut(&str) -> Result<Doc> + 'a>>,
    keep_raw_text: bool,
}

impl std::fmt::Debug for Normalizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("make_doc", &self.make_doc.as_ref().map(|_| "<tokenizer>"))
            .field("keep_raw_text", &self.keep_raw_text)
            .finish()
    }
}

impl Default for Normalizer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Normalizer<'a> {
    /// Create a normalizer without a tokenizer
    pub fn new() -> Self {
        Self {
            make_doc: None,
            keep_raw_text: false,
        }
    }

    /// Set the tokenizer used to turn raw text into documents
    pub fn tokenizer<F>(mut self, make_doc: F) -> Self
    where
        F: FnMut(&str) -> Result<Doc> + 'a,
    {
        self.make_doc = Some(Box::new(make_doc));
        self
    }

    /// Keep raw text as tokenless placeholder documents
    ///
    /// When enabled, raw text bypasses the tokenizer even if one is set.
    pub fn keep_raw_text(mut self, keep: bool) -> Self {
        self.keep_raw_text = keep;
        self
    }

    /// Convert one input into an example
    pub fn to_example(&mut self, vocab: &mut Vocab, input: ExampleInput) -> Result<Example> {
        match input {
            ExampleInput::Example(example) => Ok(example),
            ExampleInput::Doc(doc) => Example::new(vocab, doc),
            ExampleInput::Text(text) => {
                let doc = self.doc_from_text(&text)?;
                Example::new(vocab, doc)
            }
            ExampleInput::Annotated(input, annotations) => {
                let doc = match input {
                    DocInput::Doc(doc) => doc,
                    DocInput::Text(text) => self.doc_from_text(&text)?,
                };
                Example::from_value(vocab, &annotations, doc)
            }
        }
    }

    /// Convert a batch of inputs into examples, preserving their order
    pub fn to_examples<I>(&mut self, vocab: &mut Vocab, inputs: I) -> Result<Vec<Example>>
    where
        I: IntoIterator<Item = ExampleInput>,
    {
        inputs
            .into_iter()
            .map(|input| self.to_example(vocab, input))
            .collect()
    }

    fn doc_from_text(&mut self, text: &str) -> Result<Doc> {
        if self.keep_raw_text {
            Ok(Doc::raw(text))
        } else if let Some(make_doc) = self.make_doc.as_mut() {
            make_doc(text)
        } else {
            Err(Error::TokenizerRequired)
        }
    }
}

impl From<Doc> for DocInput {
    fn from(doc: Doc) -> Self {
        DocInput::Doc(doc)
    }
}

impl From<String> for DocInput {
    fn from(text: String) -> Self {
        DocInput::Text(text)
    }
}

impl From<&str> for DocInput {
    fn from(text: &str) -> Self {
        DocInput::Text(text.to_string())
    }
}

impl From<Example> for ExampleInput {
    fn from(example: Example) -> Self {
        ExampleInput::Example(example)
    }
}

impl From<Doc> for ExampleInput {
    fn from(doc: Doc) -> Self {
        ExampleInput::Doc(doc)
    }
}

impl From<String> for ExampleInput {
    fn from(text: String) -> Self {
        ExampleInput::Text(text)
    }
}

impl From<&str> for ExampleInput {
    fn from(text: &str) -> Self {
        ExampleInput::Text(text.to_string())
    }
}

impl From<(Doc, Value)> for ExampleInput {
    fn from((doc, annotations): (Doc, Value)) -> Self {
        ExampleInput::Annotated(DocInput::Doc(doc), annotations)
    }
}

impl From<(String, Value)> for ExampleInput {
    fn from((text, annotations): (String, Value)) -> Self {
        ExampleInput::Annotated(DocInput::Text(text), annotations)
    }
}

impl From<(&str, Value)> for ExampleInput {
    fn from((text, annotations): (&str, Value)) -> Self {
        ExampleInput::Annotated(DocInput::Text(text.to_string()), annotations)
    }
}

impl From<(DocInput, Value)> for ExampleInput {
    fn from((input, annotations): (DocInput, Value)) -> Self {
        ExampleInput::Annotated(input, annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn whitespace_docs() -> impl FnMut(&str) -> Result<Doc> {
        |text: &str| Ok(Doc::new(text.split_whitespace().collect::<Vec<_>>()))
    }

    #[test]
    fn test_to_examples_preserves_input_order() {
        let mut vocab = Vocab::new();
        let ready = Example::new(&mut vocab, Doc::new(vec!["third", "one"])).unwrap();
        let mut normalizer = Normalizer::new().tokenizer(whitespace_docs());
        let examples = normalizer
            .to_examples(
                &mut vocab,
                vec![
                    ExampleInput::from("first one"),
                    ExampleInput::from(Doc::new(vec!["second", "one"])),
                    ExampleInput::from(ready),
                ],
            )
            .unwrap();
        let texts: Vec<&str> = examples.iter().map(Example::text).collect();
        assert_eq!(texts, vec!["first one", "second one", "third one"]);
    }

    #[test]
    fn test_text_without_tokenizer_is_rejected() {
        let mut vocab = Vocab::new();
        let err = Normalizer::new()
            .to_examples(&mut vocab, vec![ExampleInput::from("some text")])
            .unwrap_err();
        assert!(matches!(err, Error::TokenizerRequired));
    }

    #[test]
    fn test_keep_raw_text_builds_placeholder() {
        let mut vocab = Vocab::new();
        let examples = Normalizer::new()
            .keep_raw_text(true)
            .to_examples(&mut vocab, vec![ExampleInput::from("untokenized text")])
            .unwrap();
        assert!(examples[0].predicted().is_empty());
        assert_eq!(examples[0].text(), "untokenized text");
    }

    #[test]
    fn test_keep_raw_text_bypasses_tokenizer() {
        let mut vocab = Vocab::new();
        let calls = Cell::new(0usize);
        let mut normalizer = Normalizer::new()
            .tokenizer(|text: &str| {
                calls.set(calls.get() + 1);
                Ok(Doc::new(text.split_whitespace().collect::<Vec<_>>()))
            })
            .keep_raw_text(true);
        let examples = normalizer
            .to_examples(&mut vocab, vec![ExampleInput::from("raw text")])
            .unwrap();
        assert!(examples[0].predicted().is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_annotated_text_is_tokenized_then_annotated() {
        let mut vocab = Vocab::new();
        let mut normalizer = Normalizer::new().tokenizer(whitespace_docs());
        let input = ExampleInput::from(("London calls", json!({"tags": ["NNP", "VBZ"]})));
        let examples = normalizer.to_examples(&mut vocab, vec![input]).unwrap();
        assert_eq!(examples[0].predicted().words(), &["London", "calls"]);
        assert_eq!(examples[0].token_annotation().tags(), &["NNP", "VBZ"]);
    }

    #[test]
    fn test_annotated_doc_carries_doc_annotation() {
        let mut vocab = Vocab::new();
        let input = ExampleInput::annotated(
            Doc::new(vec!["a", "b"]),
            json!({"cats": {"news": 0.4}}),
        );
        let examples = Normalizer::new().to_examples(&mut vocab, vec![input]).unwrap();
        assert_eq!(examples[0].doc_annotation().cats["news"], 0.4);
    }

    #[test]
    fn test_debug_summarizes_payloads() {
        let input = ExampleInput::from(Doc::new(vec!["a", "b"]));
        assert_eq!(format!("{input:?}"), "Doc(\"<2 tokens>\")");
    }
}
