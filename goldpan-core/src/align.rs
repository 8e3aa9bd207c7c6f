//! Alignment between two tokenizations of the same text
//!
//! Walks both token sequences left to right, matching normalized token
//! texts. Tokens that correspond one-to-one land in the positional maps;
//! tokens belonging to a split or merge group land in the multi maps, keyed
//! by their own index and valued by the single opposite-side index the whole
//! group corresponds to.

use crate::error::{CoreError, Result};
use std::collections::HashMap;

/// Correspondence maps between a candidate and a reference tokenization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    cost: usize,
    cand_to_gold: Vec<Option<usize>>,
    gold_to_cand: Vec<Option<usize>>,
    i2j_multi: HashMap<usize, usize>,
    j2i_multi: HashMap<usize, usize>,
}

impl Alignment {
    /// Align two token-text sequences over the same underlying text
    ///
    /// Comparison is case-insensitive and ignores space characters, so
    /// tokenizers that disagree about spacing still align. Fails when the
    /// two concatenations genuinely diverge.
    pub fn new<C, G>(cand: &[C], gold: &[G]) -> Result<Self>
    where
        C: AsRef<str>,
        G: AsRef<str>,
    {
        let cand_norm: Vec<String> = cand.iter().map(|w| normalize(w.as_ref())).collect();
        let gold_norm: Vec<String> = gold.iter().map(|w| normalize(w.as_ref())).collect();

        let mut cost = 0usize;
        let mut cand_to_gold: Vec<Option<usize>> = vec![None; cand_norm.len()];
        let mut gold_to_cand: Vec<Option<usize>> = vec![None; gold_norm.len()];
        let mut i2j_multi: HashMap<usize, usize> = HashMap::new();
        let mut j2i_multi: HashMap<usize, usize> = HashMap::new();

        let mut i = 0;
        let mut j = 0;
        // Byte offsets into the current normalized tokens, marking how much
        // of each has been consumed by the opposite side. Offsets are always
        // lengths of previously matched prefixes, hence char boundaries.
        let mut offset_i = 0;
        let mut offset_j = 0;
        while i < cand_norm.len() && j < gold_norm.len() {
            let a = &cand_norm[i][offset_i..];
            let b = &gold_norm[j][offset_j..];
            if a == b {
                if offset_i == 0 && offset_j == 0 {
                    cand_to_gold[i] = Some(j);
                    gold_to_cand[j] = Some(i);
                } else if offset_i == 0 {
                    // Token i completes a reference token split over
                    // several candidate tokens.
                    cost += 2;
                    i2j_multi.insert(i, j);
                } else if offset_j == 0 {
                    cost += 2;
                    j2i_multi.insert(j, i);
                }
                offset_i = 0;
                offset_j = 0;
                i += 1;
                j += 1;
            } else if a.is_empty() {
                // Whitespace-only token on the candidate side.
                debug_assert_eq!(offset_i, 0);
                cost += 1;
                i += 1;
            } else if b.is_empty() {
                debug_assert_eq!(offset_j, 0);
                cost += 1;
                j += 1;
            } else if b.starts_with(a) {
                cost += 1;
                if offset_i == 0 {
                    i2j_multi.insert(i, j);
                }
                offset_j += a.len();
                offset_i = 0;
                i += 1;
            } else if a.starts_with(b) {
                cost += 1;
                if offset_j == 0 {
                    j2i_multi.insert(j, i);
                }
                offset_i += b.len();
                offset_j = 0;
                j += 1;
            } else {
                return Err(CoreError::AlignmentFailed {
                    cand_index: i,
                    gold_index: j,
                });
            }
        }

        if cost > 0 {
            log::debug!(
                "aligned {} candidate tokens to {} reference tokens with cost {}",
                cand_norm.len(),
                gold_norm.len(),
                cost
            );
        }
        Ok(Self {
            cost,
            cand_to_gold,
            gold_to_cand,
            i2j_multi,
            j2i_multi,
        })
    }

    /// Total mismatch cost accumulated while reconciling the sequences
    ///
    /// Zero means the tokenizations were identical up to case and spaces.
    pub fn cost(&self) -> usize {
        self.cost
    }

    /// For each candidate token, its 1:1 reference correspondent
    pub fn cand_to_gold(&self) -> &[Option<usize>] {
        &self.cand_to_gold
    }

    /// For each reference token, its 1:1 candidate correspondent
    pub fn gold_to_cand(&self) -> &[Option<usize>] {
        &self.gold_to_cand
    }

    /// Candidate tokens that are members of a split/merge group, mapped to
    /// the reference token the group corresponds to
    pub fn i2j_multi(&self) -> &HashMap<usize, usize> {
        &self.i2j_multi
    }

    /// Reference tokens that are members of a split/merge group, mapped to
    /// the candidate token the group corresponds to
    pub fn j2i_multi(&self) -> &HashMap<usize, usize> {
        &self.j2i_multi
    }
}

fn normalize(token: &str) -> String {
    token.replace(' ', "").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align(cand: &[&str], gold: &[&str]) -> Alignment {
        Alignment::new(cand, gold).unwrap()
    }

    #[test]
    fn test_identical_tokenizations() {
        let alignment = align(&["The", "cat", "sat"], &["The", "cat", "sat"]);
        assert_eq!(alignment.cost(), 0);
        assert_eq!(alignment.cand_to_gold(), &[Some(0), Some(1), Some(2)]);
        assert_eq!(alignment.gold_to_cand(), &[Some(0), Some(1), Some(2)]);
        assert!(alignment.i2j_multi().is_empty());
        assert!(alignment.j2i_multi().is_empty());
    }

    #[test]
    fn test_case_and_space_insensitive() {
        let alignment = align(&["HELLO", "wo rld"], &["hello", "world"]);
        assert_eq!(alignment.cost(), 0);
        assert_eq!(alignment.cand_to_gold(), &[Some(0), Some(1)]);
    }

    #[test]
    fn test_candidate_splits_reference_token() {
        // One reference token "NewYork" appears as two candidate tokens.
        let alignment = align(&["New", "York", "is", "big"], &["NewYork", "is", "big"]);
        assert_eq!(alignment.cand_to_gold(), &[None, None, Some(1), Some(2)]);
        assert_eq!(alignment.gold_to_cand(), &[None, Some(2), Some(3)]);
        assert_eq!(alignment.i2j_multi().get(&0), Some(&0));
        assert_eq!(alignment.i2j_multi().get(&1), Some(&0));
        assert!(alignment.cost() > 0);
    }

    #[test]
    fn test_candidate_merges_reference_tokens() {
        let alignment = align(&["NewYork"], &["New", "York"]);
        assert_eq!(alignment.cand_to_gold(), &[None]);
        assert_eq!(alignment.gold_to_cand(), &[None, None]);
        assert!(alignment.i2j_multi().is_empty());
        assert_eq!(alignment.j2i_multi().get(&0), Some(&0));
        assert_eq!(alignment.j2i_multi().get(&1), Some(&0));
    }

    #[test]
    fn test_whitespace_tokens_are_skipped() {
        let alignment = align(&["Hello", " ", "world"], &["Hello", "world"]);
        assert_eq!(alignment.cand_to_gold(), &[Some(0), None, Some(1)]);
        assert_eq!(alignment.gold_to_cand(), &[Some(0), Some(2)]);
        assert_eq!(alignment.cost(), 1);
    }

    #[test]
    fn test_crossing_boundaries_fill_neither_positional_map() {
        // "ab|cd" vs "a|bcd": no token on either side is whole on the other.
        let alignment = align(&["ab", "cd"], &["a", "bcd"]);
        assert_eq!(alignment.cand_to_gold(), &[None, None]);
        assert_eq!(alignment.gold_to_cand(), &[None, None]);
        assert_eq!(alignment.i2j_multi().get(&1), Some(&1));
        assert_eq!(alignment.j2i_multi().get(&0), Some(&0));
    }

    #[test]
    fn test_divergent_texts_fail() {
        let err = Alignment::new(&["abc"], &["xyz"]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::AlignmentFailed {
                cand_index: 0,
                gold_index: 0
            }
        ));
    }

    #[test]
    fn test_trailing_unmatched_tokens_stay_unaligned() {
        let alignment = align(&["a"], &["a", "b", "c"]);
        assert_eq!(alignment.cand_to_gold(), &[Some(0)]);
        assert_eq!(alignment.gold_to_cand(), &[Some(0), None, None]);
    }

    #[test]
    fn test_empty_sequences() {
        let alignment = Alignment::new::<&str, &str>(&[], &[]).unwrap();
        assert_eq!(alignment.cost(), 0);
        assert!(alignment.cand_to_gold().is_empty());
        assert!(alignment.gold_to_cand().is_empty());
    }

    #[test]
    fn test_multibyte_tokens_align() {
        let alignment = align(&["Café", "au", "lait"], &["café", "aulait"]);
        assert_eq!(alignment.cand_to_gold(), &[Some(0), None, None]);
        assert_eq!(alignment.i2j_multi().get(&1), Some(&1));
        assert_eq!(alignment.i2j_multi().get(&2), Some(&1));
    }
}
