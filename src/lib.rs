//! Rule-based grammatical error injection for dependency-annotated corpora.
//! # Overview
//!
//! augrule has the following core abstractions:
//! - A [Sentence][types::Sentence] parsed from the CoNLL-U annotation format by the [conllu] codec.
//! - A [Rules][rules::Rules] structure containing a set of error-injection rules, either exact
//!   lexical substitutions or substitutions conditioned on the dependency tree.
//! - An [Augmentor][rules::Augmentor] which applies one randomly chosen applicable rule per
//!   sentence, producing training data for grammar-error-correction models.
//! - A [batch] orchestrator which runs the engine over many files held in an object
//!   [Storage][batch::Storage] with bounded concurrency.
//!
//! # Examples
//!
//! Inject an error into a sentence:
//!
//! ```no_run
//! use augrule::inflect::{DictMorph, Inflecter};
//! use augrule::rules::{Augmentor, Rules};
//! use augrule::conllu;
//! use rand::SeedableRng;
//!
//! let rules = Rules::new("rules.json")?;
//! let morph = DictMorph::from_dump("en.dict")?;
//! let augmentor = Augmentor::new(rules, Inflecter::with_default_tables(Box::new(morph)))?;
//!
//! let text = std::fs::read_to_string("corpus.conllu")?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//!
//! for sentence in conllu::parse(&text)? {
//!     if let Some(augmented) = augmentor.augment(&sentence, &mut rng) {
//!         print!("{}", conllu::serialize(&augmented));
//!     }
//! }
//! # Ok::<(), augrule::Error>(())
//! ```

use std::io;

use thiserror::Error;

pub mod batch;
pub mod conllu;
pub mod inflect;
pub mod rule;
pub mod rules;
pub mod tag;
pub mod types;

#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// (De)serialization error. Can have occured during deserialization or during serialization.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    /// The annotation text violates the format the codec expects.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// An augmentor was constructed without any rules.
    #[error("no rules specified for augmentation")]
    EmptyRules,
    /// A rule produces a tag the taxonomy has no part-of-speech category for.
    #[error("tag {0:?} has no part-of-speech category")]
    UnknownTag(String),
}
