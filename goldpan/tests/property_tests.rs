//! Property-based tests for projection and resegmentation

use goldpan::*;
use proptest::prelude::*;

const ALL_FIELDS: [Field; 10] = [
    Field::Ids,
    Field::Words,
    Field::Tags,
    Field::Pos,
    Field::Morphs,
    Field::Lemmas,
    Field::Heads,
    Field::Deps,
    Field::Entities,
    Field::SentStarts,
];

fn annotated_words() -> impl Strategy<Value = (Vec<String>, Vec<String>, Vec<usize>, Vec<i32>)> {
    proptest::collection::vec("[a-z]{1,6}", 1..12).prop_flat_map(|words| {
        let n = words.len();
        (
            Just(words),
            proptest::collection::vec("[A-Z]{1,3}", n),
            proptest::collection::vec(0..n, n),
            proptest::collection::vec(0..2i32, n),
        )
    })
}

proptest! {
    #[test]
    fn identity_projection_reproduces_gold(
        (words, tags, heads, flags) in annotated_words(),
    ) {
        let n = words.len();
        let mut vocab = Vocab::new();
        let annotation = TokenAnnotation::builder()
            .words(words.clone())
            .tags(tags)
            .pos((0..n).map(|i| format!("P{i}")).collect())
            .morphs((0..n).map(|i| format!("Feat=V{i}")).collect())
            .lemmas(words.iter().map(|w| w.to_uppercase()).collect())
            .heads(heads)
            .deps((0..n).map(|i| format!("dep{i}")).collect())
            .entities(vec!["O"; n])
            .sent_starts(flags)
            .build()
            .unwrap();
        let example = Example::with_annotations(
            &mut vocab,
            Doc::new(words),
            annotation,
            DocAnnotation::default(),
        )
        .unwrap();

        // Identical tokenizations project every column back verbatim.
        for field in ALL_FIELDS {
            let projected = example.get_aligned(field).unwrap();
            prop_assert_eq!(projected.len(), n);
            for (i, value) in projected.into_iter().enumerate() {
                let gold = example.token_annotation().field_value(field, i);
                prop_assert_eq!(value, gold, "field '{}' at token {}", field.name(), i);
            }
        }
    }

    #[test]
    fn split_sents_partitions_tokens(flags in proptest::collection::vec(0..2i32, 1..24)) {
        let n = flags.len();
        let words: Vec<String> = (0..n).map(|i| format!("w{i}")).collect();
        let mut vocab = Vocab::new();
        let annotation = TokenAnnotation::builder()
            .words(words.clone())
            .sent_starts(flags.clone())
            .build()
            .unwrap();
        let example = Example::with_annotations(
            &mut vocab,
            Doc::new(words.clone()),
            annotation,
            DocAnnotation::default(),
        )
        .unwrap();

        let sents = example.split_sents(&mut vocab).unwrap();
        let expected = 1 + flags.iter().skip(1).filter(|&&f| f == 1).count();
        prop_assert_eq!(sents.len(), expected);

        // Every token lands in exactly one sentence, in the original order.
        let mut joined: Vec<String> = Vec::new();
        for sent in &sents {
            prop_assert!(!sent.token_annotation().is_empty());
            joined.extend(sent.token_annotation().words().iter().cloned());
        }
        prop_assert_eq!(joined, words);
    }

    #[test]
    fn split_sents_keeps_heads_local(flags in proptest::collection::vec(0..2i32, 2..24)) {
        let n = flags.len();
        let words: Vec<String> = (0..n).map(|i| format!("w{i}")).collect();
        // Chain each token to the previous one within its sentence.
        let mut heads = Vec::with_capacity(n);
        for (i, &flag) in flags.iter().enumerate() {
            if i == 0 || flag == 1 {
                heads.push(i);
            } else {
                heads.push(i - 1);
            }
        }
        let mut vocab = Vocab::new();
        let annotation = TokenAnnotation::builder()
            .words(words.clone())
            .heads(heads)
            .sent_starts(flags)
            .build()
            .unwrap();
        let example = Example::with_annotations(
            &mut vocab,
            Doc::new(words),
            annotation,
            DocAnnotation::default(),
        )
        .unwrap();

        for sent in example.split_sents(&mut vocab).unwrap() {
            let len = sent.token_annotation().len();
            for &head in sent.token_annotation().heads() {
                prop_assert!(head < len);
            }
        }
    }
}
