//! Mapping from fine-grained tags to coarse part-of-speech categories.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// The closed set of tags producible by dependency rules, keyed to the coarse
    /// category each falls under. Used to keep `pos` consistent after a tag mutation.
    static ref TAG_TO_POS: HashMap<&'static str, &'static str> = vec![
        ("JJ", "ADJ"),
        ("JJR", "ADJ"),
        ("JJS", "ADJ"),
        ("RB", "ADV"),
        ("RBR", "ADV"),
        ("RBS", "ADV"),
        ("WRB", "ADV"),
        ("IN", "ADP"),
        ("RP", "ADP"),
        ("VB", "VERB"),
        ("VBD", "VERB"),
        ("VBG", "VERB"),
        ("VBN", "VERB"),
        ("VBP", "VERB"),
        ("VBZ", "VERB"),
        ("MD", "VERB"),
        ("CC", "CCONJ"),
        ("DT", "DET"),
        ("PDT", "DET"),
        ("PRP$", "DET"),
        ("WDT", "DET"),
        ("WP$", "DET"),
        ("UH", "INTJ"),
        ("NN", "NOUN"),
        ("NNS", "NOUN"),
        ("POS", "PART"),
        ("TO", "PART"),
        ("NNP", "PROPN"),
        ("NNPS", "PROPN"),
    ]
    .into_iter()
    .collect();
}

/// The coarse part-of-speech category of a fine-grained tag, if the taxonomy defines one.
///
/// Rule sets are validated against this mapping at construction, so a lookup failing
/// during rule application indicates a malformed rule table.
pub fn coarse_of(tag: &str) -> Option<&'static str> {
    TAG_TO_POS.get(tag).copied()
}
