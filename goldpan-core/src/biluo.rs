//! BILUO span codec
//!
//! Converts between labeled character-offset entity spans and per-token
//! B/I/L/U/O tag sequences. All conversions are strict: offsets that miss
//! token boundaries, overlapping spans, and malformed tag sequences are
//! errors rather than silently dropped annotations.

use crate::doc::{Doc, Span};
use crate::error::{CoreError, Result};
use std::collections::HashMap;

const OUTSIDE: &str = "O";

enum Tag<'a> {
    Outside,
    Begin(&'a str),
    In(&'a str),
    Last(&'a str),
    Unit(&'a str),
}

fn parse_tag(tag: &str, index: usize) -> Result<Tag<'_>> {
    if tag == OUTSIDE {
        return Ok(Tag::Outside);
    }
    let (prefix, label) = match tag.split_once('-') {
        Some((prefix, label)) if !label.is_empty() => (prefix, label),
        _ => {
            return Err(CoreError::InvalidTagSequence {
                index,
                reason: format!("tag '{tag}' is not of the form PREFIX-LABEL"),
            })
        }
    };
    match prefix {
        "B" => Ok(Tag::Begin(label)),
        "I" => Ok(Tag::In(label)),
        "L" => Ok(Tag::Last(label)),
        "U" => Ok(Tag::Unit(label)),
        _ => Err(CoreError::InvalidTagSequence {
            index,
            reason: format!("unknown prefix '{prefix}' in tag '{tag}'"),
        }),
    }
}

/// Encode labeled character-offset spans as one BILUO tag per token
///
/// Offsets are char offsets into `doc.text()`. Every span must start and
/// end exactly on token boundaries and no two spans may claim the same
/// token; tokens covered by no span are tagged `O`.
pub fn tags_from_offsets(doc: &Doc, offsets: &[(usize, usize, String)]) -> Result<Vec<String>> {
    let mut starts: HashMap<usize, usize> = HashMap::new();
    let mut ends: HashMap<usize, usize> = HashMap::new();
    for i in 0..doc.len() {
        if let Some((start, end)) = doc.char_span(i) {
            starts.insert(start, i);
            ends.insert(end, i);
        }
    }
    let mut tags: Vec<Option<String>> = vec![None; doc.len()];
    for (start_char, end_char, label) in offsets {
        let (start_token, end_token) = match (starts.get(start_char), ends.get(end_char)) {
            (Some(&start_token), Some(&end_token)) if start_token <= end_token => {
                (start_token, end_token)
            }
            _ => {
                return Err(CoreError::MisalignedSpan {
                    start: *start_char,
                    end: *end_char,
                    label: label.clone(),
                })
            }
        };
        if tags[start_token..=end_token].iter().any(Option::is_some) {
            return Err(CoreError::OverlappingSpan {
                start: *start_char,
                end: *end_char,
            });
        }
        if start_token == end_token {
            tags[start_token] = Some(format!("U-{label}"));
        } else {
            tags[start_token] = Some(format!("B-{label}"));
            for slot in &mut tags[start_token + 1..end_token] {
                *slot = Some(format!("I-{label}"));
            }
            tags[end_token] = Some(format!("L-{label}"));
        }
    }
    Ok(tags
        .into_iter()
        .map(|tag| tag.unwrap_or_else(|| OUTSIDE.to_string()))
        .collect())
}

/// Decode a BILUO tag sequence into labeled token spans
///
/// Requires one tag per document token and a well-formed sequence: every
/// entity is either a single `U` or a `B..L` run of `I`s carrying one
/// consistent label.
pub fn spans_from_tags<S: AsRef<str>>(doc: &Doc, tags: &[S]) -> Result<Vec<Span>> {
    if tags.len() != doc.len() {
        return Err(CoreError::InvalidTagSequence {
            index: tags.len(),
            reason: format!("got {} tags for {} tokens", tags.len(), doc.len()),
        });
    }
    let mut spans = Vec::new();
    let mut open: Option<(usize, String)> = None;
    for (i, tag) in tags.iter().enumerate() {
        match parse_tag(tag.as_ref(), i)? {
            Tag::Outside => {
                if let Some((start, label)) = open {
                    return Err(CoreError::InvalidTagSequence {
                        index: i,
                        reason: format!("entity B-{label} opened at {start} is never closed"),
                    });
                }
            }
            Tag::Unit(label) => {
                if let Some((start, open_label)) = open {
                    return Err(CoreError::InvalidTagSequence {
                        index: i,
                        reason: format!("U-{label} inside open entity B-{open_label} at {start}"),
                    });
                }
                spans.push(Span::new(i, i + 1, label));
            }
            Tag::Begin(label) => {
                if let Some((start, open_label)) = open {
                    return Err(CoreError::InvalidTagSequence {
                        index: i,
                        reason: format!("B-{label} inside open entity B-{open_label} at {start}"),
                    });
                }
                open = Some((i, label.to_string()));
            }
            Tag::In(label) => match &open {
                Some((_, open_label)) if open_label == label => {}
                Some((start, open_label)) => {
                    return Err(CoreError::InvalidTagSequence {
                        index: i,
                        reason: format!(
                            "I-{label} does not match entity B-{open_label} opened at {start}"
                        ),
                    })
                }
                None => {
                    return Err(CoreError::InvalidTagSequence {
                        index: i,
                        reason: format!("I-{label} without a preceding B"),
                    })
                }
            },
            Tag::Last(label) => match open.take() {
                Some((start, open_label)) if open_label == label => {
                    spans.push(Span::new(start, i + 1, label));
                }
                Some((start, open_label)) => {
                    return Err(CoreError::InvalidTagSequence {
                        index: i,
                        reason: format!(
                            "L-{label} does not match entity B-{open_label} opened at {start}"
                        ),
                    })
                }
                None => {
                    return Err(CoreError::InvalidTagSequence {
                        index: i,
                        reason: format!("L-{label} without a preceding B"),
                    })
                }
            },
        }
    }
    if let Some((start, label)) = open {
        return Err(CoreError::InvalidTagSequence {
            index: tags.len(),
            reason: format!("entity B-{label} opened at {start} is never closed"),
        });
    }
    Ok(spans)
}

/// Decode a BILUO tag sequence into labeled character-offset spans
pub fn offsets_from_tags<S: AsRef<str>>(
    doc: &Doc,
    tags: &[S],
) -> Result<Vec<(usize, usize, String)>> {
    let spans = spans_from_tags(doc, tags)?;
    let mut offsets = Vec::with_capacity(spans.len());
    for span in spans {
        let (start_char, _) = doc.char_span(span.start).ok_or_else(|| CoreError::Document {
            reason: format!("span start {} out of range", span.start),
        })?;
        let (_, end_char) = doc
            .char_span(span.end - 1)
            .ok_or_else(|| CoreError::Document {
                reason: format!("span end {} out of range", span.end),
            })?;
        offsets.push((start_char, end_char, span.label));
    }
    Ok(offsets)
}

/// Convert an IOB tag sequence to BILUO
///
/// Maximal same-label runs become `U` (length one) or `B..L` otherwise.
/// Accepts sequences that are already partially BILUO.
pub fn iob_to_biluo<S: AsRef<str>>(tags: &[S]) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(tags.len());
    let mut i = 0;
    while i < tags.len() {
        let label = match parse_tag(tags[i].as_ref(), i)? {
            Tag::Outside => {
                out.push(OUTSIDE.to_string());
                i += 1;
                continue;
            }
            Tag::Begin(label) | Tag::In(label) | Tag::Last(label) | Tag::Unit(label) => {
                label.to_string()
            }
        };
        let start = i;
        i += 1;
        while i < tags.len() {
            match parse_tag(tags[i].as_ref(), i)? {
                Tag::In(l) | Tag::Last(l) if l == label => i += 1,
                _ => break,
            }
        }
        let length = i - start;
        if length == 1 {
            out.push(format!("U-{label}"));
        } else {
            out.push(format!("B-{label}"));
            for _ in 1..length - 1 {
                out.push(format!("I-{label}"));
            }
            out.push(format!("L-{label}"));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Doc {
        // "I like New York City ."
        Doc::new(vec!["I", "like", "New", "York", "City", "."])
    }

    #[test]
    fn test_tags_from_offsets_single_token() {
        // "New" covers chars [7, 10).
        let tags = tags_from_offsets(&doc(), &[(7, 10, "GPE".to_string())]).unwrap();
        assert_eq!(tags, vec!["O", "O", "U-GPE", "O", "O", "O"]);
    }

    #[test]
    fn test_tags_from_offsets_multi_token() {
        // "New York City" covers chars [7, 20).
        let tags = tags_from_offsets(&doc(), &[(7, 20, "GPE".to_string())]).unwrap();
        assert_eq!(tags, vec!["O", "O", "B-GPE", "I-GPE", "L-GPE", "O"]);
    }

    #[test]
    fn test_tags_from_offsets_rejects_mid_token_boundary() {
        let err = tags_from_offsets(&doc(), &[(7, 12, "GPE".to_string())]).unwrap_err();
        assert!(matches!(err, CoreError::MisalignedSpan { start: 7, end: 12, .. }));
    }

    #[test]
    fn test_tags_from_offsets_rejects_overlap() {
        let err = tags_from_offsets(
            &doc(),
            &[(7, 20, "GPE".to_string()), (11, 20, "ORG".to_string())],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::OverlappingSpan { start: 11, end: 20 }));
    }

    #[test]
    fn test_spans_from_tags() {
        let spans =
            spans_from_tags(&doc(), &["O", "O", "B-GPE", "I-GPE", "L-GPE", "O"]).unwrap();
        assert_eq!(spans, vec![Span::new(2, 5, "GPE")]);
    }

    #[test]
    fn test_spans_from_tags_unit_and_adjacent() {
        let spans =
            spans_from_tags(&doc(), &["U-PER", "O", "B-GPE", "L-GPE", "U-GPE", "O"]).unwrap();
        assert_eq!(
            spans,
            vec![
                Span::new(0, 1, "PER"),
                Span::new(2, 4, "GPE"),
                Span::new(4, 5, "GPE"),
            ]
        );
    }

    #[test]
    fn test_spans_from_tags_rejects_stray_in() {
        let err = spans_from_tags(&doc(), &["O", "I-GPE", "O", "O", "O", "O"]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTagSequence { index: 1, .. }));
    }

    #[test]
    fn test_spans_from_tags_rejects_label_switch() {
        let err =
            spans_from_tags(&doc(), &["B-GPE", "L-ORG", "O", "O", "O", "O"]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTagSequence { index: 1, .. }));
    }

    #[test]
    fn test_spans_from_tags_rejects_unclosed_entity() {
        let err =
            spans_from_tags(&doc(), &["O", "O", "O", "O", "B-GPE", "I-GPE"]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTagSequence { index: 6, .. }));
    }

    #[test]
    fn test_spans_from_tags_rejects_count_mismatch() {
        let err = spans_from_tags(&doc(), &["O", "O"]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTagSequence { index: 2, .. }));
    }

    #[test]
    fn test_spans_from_tags_rejects_unknown_prefix() {
        let err =
            spans_from_tags(&doc(), &["X-GPE", "O", "O", "O", "O", "O"]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTagSequence { index: 0, .. }));
    }

    #[test]
    fn test_offsets_round_trip() {
        let offsets = vec![(0, 1, "PER".to_string()), (7, 20, "GPE".to_string())];
        let tags = tags_from_offsets(&doc(), &offsets).unwrap();
        assert_eq!(offsets_from_tags(&doc(), &tags).unwrap(), offsets);
    }

    #[test]
    fn test_iob_to_biluo_runs() {
        let biluo = iob_to_biluo(&["O", "B-PER", "I-PER", "I-PER", "O", "I-ORG"]).unwrap();
        assert_eq!(biluo, vec!["O", "B-PER", "I-PER", "L-PER", "O", "U-ORG"]);
    }

    #[test]
    fn test_iob_to_biluo_pair_and_restart() {
        let biluo = iob_to_biluo(&["B-PER", "I-PER", "B-PER"]).unwrap();
        assert_eq!(biluo, vec!["B-PER", "L-PER", "U-PER"]);
    }

    #[test]
    fn test_iob_to_biluo_rejects_malformed() {
        assert!(iob_to_biluo(&["B-PER", "bogus"]).is_err());
        assert!(iob_to_biluo(&["B-"]).is_err());
    }
}
