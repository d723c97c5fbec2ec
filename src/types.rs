//! Fundamental types used by this crate.

use serde::{Deserialize, Serialize};

/// One word or punctuation unit of a dependency-annotated sentence.
///
/// Fields mirror the CoNLL-U columns. `index` is the token's 1-based position within its
/// sentence; `head` is the `index` of the governing token, with `0` denoting the sentence
/// root. Columns after `deprel` are not interpreted and pass through serialization
/// untouched in `rest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub form: String,
    pub lemma: String,
    pub pos: String,
    pub tag: String,
    /// Morphological feature string, kept opaque (`_` when absent).
    pub feats: String,
    pub head: usize,
    pub deprel: String,
    pub rest: Vec<String>,
}

/// An ordered sequence of tokens plus the sentence's position within its source file.
///
/// `id` is 0-based and dense within a file; it doubles as the re-serialization key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: usize,
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(id: usize, tokens: Vec<Token>) -> Self {
        Sentence { id, tokens }
    }

    /// The governing token of `token`, or `None` for the sentence root.
    pub fn head_of(&self, token: &Token) -> Option<&Token> {
        if token.head == 0 {
            None
        } else {
            self.tokens.get(token.head - 1)
        }
    }
}
