//! Construction of reference documents from annotation records

use crate::annotation::{DocAnnotation, TokenAnnotation};
use crate::error::Result;
use goldpan_core::{biluo, Attr, Doc, Vocab};

/// Build a reference [`Doc`] carrying the given annotations
///
/// Reference words come from the token annotation when set, and fall back to
/// the predicted document's words otherwise. String-valued columns are
/// interned through `vocab`; heads are stored as offsets relative to each
/// token. Entity tags are decoded into spans on the new document, and
/// categories are copied over. Entity links stay on the [`DocAnnotation`]
/// record and are not materialized.
pub fn annotations_to_doc(
    vocab: &mut Vocab,
    predicted: &Doc,
    doc_annot: &DocAnnotation,
    tok_annot: &TokenAnnotation,
) -> Result<Doc> {
    let words: Vec<String> = if tok_annot.words().is_empty() {
        predicted.words().to_vec()
    } else {
        tok_annot.words().to_vec()
    };
    let mut output = Doc::new(words);

    let mut attrs = Vec::new();
    let mut columns = Vec::new();
    for (attr, values) in [
        (Attr::Tag, tok_annot.tags()),
        (Attr::Pos, tok_annot.pos()),
        (Attr::Lemma, tok_annot.lemmas()),
        (Attr::Dep, tok_annot.deps()),
    ] {
        if values.is_empty() {
            continue;
        }
        attrs.push(attr);
        columns.push(values.iter().map(|v| i64::from(vocab.add(v))).collect());
    }
    if !tok_annot.heads().is_empty() {
        attrs.push(Attr::Head);
        columns.push(
            tok_annot
                .heads()
                .iter()
                .enumerate()
                .map(|(i, &head)| head as i64 - i as i64)
                .collect(),
        );
    }
    output.apply_attrs(&attrs, columns)?;

    if !tok_annot.entities().is_empty() {
        let spans = biluo::spans_from_tags(&output, tok_annot.entities())?;
        output.set_ents(spans)?;
    }
    output.set_cats(doc_annot.cats.clone());
    if !doc_annot.links.is_empty() {
        log::debug!("{} entity links are not materialized", doc_annot.links.len());
    }
    Ok(output)
}
