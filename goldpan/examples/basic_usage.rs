//! Basic usage example for the goldpan pipeline

use goldpan::{Doc, Example, ExampleInput, Field, FieldValue, Normalizer, Vocab};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut vocab = Vocab::new();

    // Method 1: Project tags across diverging tokenizations
    println!("=== Method 1: Cross-Tokenization Projection ===");
    let predicted = Doc::new(vec!["New", "York", "never", "sleeps"]);
    let annotations = json!({
        "words": ["NewYork", "never", "sleeps"],
        "tags": ["NNP", "RB", "VBZ"],
    });
    let example = Example::from_value(&mut vocab, &annotations, predicted)?;

    println!("Predicted: {}", example.text());
    println!("Reference: {}", example.reference().text());
    let field = Field::Tags;
    let tags = example.get_aligned(field)?;
    println!("Aligned {} per predicted token:", field.name());
    for (word, tag) in example.predicted().words().iter().zip(&tags) {
        let tag = tag.as_ref().and_then(FieldValue::as_str).unwrap_or("-");
        println!("  {word:<8} {tag}");
    }

    // Method 2: Entity character offsets against the predicted tokenization
    println!("\n=== Method 2: Entity Offsets ===");
    let predicted = Doc::new(vec!["I", "flew", "to", "New", "York"]);
    let annotations = json!({
        "entities": [[10, 18, "GPE"]],
    });
    let example = Example::from_value(&mut vocab, &annotations, predicted)?;

    println!("Tags: {:?}", example.token_annotation().entities());
    for span in example.reference().ents() {
        println!("  [{}, {}) {}", span.start, span.end, span.label);
    }

    // Method 3: Normalize a mixed batch of inputs
    println!("\n=== Method 3: Mixed Inputs ===");
    let mut normalizer = Normalizer::new()
        .tokenizer(|text: &str| Ok(Doc::new(text.split_whitespace().collect::<Vec<_>>())));
    let examples = normalizer.to_examples(
        &mut vocab,
        vec![
            ExampleInput::from("plain text input"),
            ExampleInput::from(Doc::new(vec!["already", "tokenized"])),
            ExampleInput::from(("tagged text", json!({"tags": ["JJ", "NN"]}))),
        ],
    )?;
    for example in &examples {
        println!("  {} tokens: {}", example.predicted().len(), example.text());
    }

    // Method 4: Split a document-scoped annotation into sentences
    println!("\n=== Method 4: Sentence Splitting ===");
    let annotations = json!({
        "words": ["Dogs", "bark", ".", "Cats", "nap", "."],
        "heads": [1, 1, 1, 4, 4, 4],
        "sent_starts": [1, 0, 0, 1, 0, 0],
    });
    let example = Example::from_value(
        &mut vocab,
        &annotations,
        Doc::new(vec!["Dogs", "bark", ".", "Cats", "nap", "."]),
    )?;
    let sentences = example.split_sents(&mut vocab)?;

    println!("Split into {} sentences:", sentences.len());
    for sentence in &sentences {
        println!(
            "  \"{}\" heads={:?}",
            sentence.text(),
            sentence.token_annotation().heads()
        );
    }

    Ok(())
}
