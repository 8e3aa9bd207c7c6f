//! String interning service
//!
//! Annotation strings are stored on documents as integer symbols; the
//! vocabulary maps between the two. It is passed explicitly to every
//! operation that interns, so documents built against the same vocabulary
//! stay comparable.

use std::collections::HashMap;

/// Interned string symbol
pub type Sym = u32;

/// Bidirectional string-to-symbol table
#[derive(Debug, Clone, Default)]
pub struct Vocab {
    strings: Vec<String>,
    index: HashMap<String, Sym>,
}

impl Vocab {
    /// Create an empty vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its symbol
    ///
    /// Returns the existing symbol when the string was interned before.
    pub fn add(&mut self, string: &str) -> Sym {
        if let Some(&sym) = self.index.get(string) {
            return sym;
        }
        let sym = self.strings.len() as Sym;
        self.strings.push(string.to_string());
        self.index.insert(string.to_string(), sym);
        sym
    }

    /// Look up a string's symbol without interning it
    pub fn get(&self, string: &str) -> Option<Sym> {
        self.index.get(string).copied()
    }

    /// Resolve a symbol back to its string
    pub fn resolve(&self, sym: Sym) -> Option<&str> {
        self.strings.get(sym as usize).map(String::as_str)
    }

    /// Number of interned strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether no strings have been interned
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut vocab = Vocab::new();
        let a = vocab.add("NOUN");
        let b = vocab.add("NOUN");
        assert_eq!(a, b);
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn test_distinct_strings_get_distinct_symbols() {
        let mut vocab = Vocab::new();
        let a = vocab.add("NOUN");
        let b = vocab.add("VERB");
        assert_ne!(a, b);
        assert_eq!(vocab.resolve(a), Some("NOUN"));
        assert_eq!(vocab.resolve(b), Some("VERB"));
    }

    #[test]
    fn test_get_does_not_intern() {
        let vocab = Vocab::new();
        assert_eq!(vocab.get("NOUN"), None);
        assert!(vocab.is_empty());
    }

    #[test]
    fn test_resolve_unknown_symbol() {
        let vocab = Vocab::new();
        assert_eq!(vocab.resolve(7), None);
    }
}
