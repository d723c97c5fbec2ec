//! Sets of error-injection rules and the sentence-level augmentation engine.

use std::io::{BufReader, Read};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::inflect::Inflecter;
use crate::rule::Rule;
use crate::tag;
use crate::types::Sentence;
use crate::Error;

/// An immutable set of error-injection rules.
///
/// Iteration order carries no meaning; the engine shuffles the set anew for every
/// augmentation attempt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    /// Creates a new rule set from a path to a JSON rule table.
    ///
    /// # Errors
    /// - If the file can not be opened.
    /// - If the file content can not be deserialized to a rule set.
    pub fn new<P: AsRef<Path>>(p: P) -> Result<Self, Error> {
        let reader = BufReader::new(std::fs::File::open(p.as_ref())?);
        Self::from_reader(reader)
    }

    /// Creates a new rule set from a reader over a JSON rule table.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl From<Vec<Rule>> for Rules {
    fn from(rules: Vec<Rule>) -> Self {
        Rules { rules }
    }
}

/// Applies one randomly chosen applicable rule per sentence.
pub struct Augmentor {
    rules: Rules,
    inflecter: Inflecter,
}

impl Augmentor {
    /// # Errors
    /// - If the rule set is empty.
    /// - If a dependency rule produces a tag the taxonomy does not know.
    pub fn new(rules: Rules, inflecter: Inflecter) -> Result<Self, Error> {
        if rules.rules.is_empty() {
            return Err(Error::EmptyRules);
        }
        for rule in rules.rules() {
            if let Rule::Dependency(rule) = rule {
                if tag::coarse_of(&rule.tag).is_none() {
                    return Err(Error::UnknownTag(rule.tag.clone()));
                }
            }
        }

        Ok(Augmentor { rules, inflecter })
    }

    /// Augments a single sentence.
    ///
    /// Tries every rule once, in uniformly random order, and returns a copy of the
    /// sentence with the first successful rule's edit applied, or `None` when no
    /// rule fires. The input itself is never modified; dependency rules consult it
    /// for head and tag lookups while their edit is written into the copy.
    pub fn augment<R: Rng>(&self, sentence: &Sentence, rng: &mut R) -> Option<Sentence> {
        let mut order: Vec<usize> = (0..self.rules.rules.len()).collect();
        order.shuffle(rng);

        // a failed attempt leaves the copy untouched, so one copy serves all rules
        let mut augmented = sentence.clone();

        for index in order {
            let fired = match &self.rules.rules[index] {
                Rule::Exact(rule) => rule.apply(&mut augmented, rng),
                Rule::Dependency(rule) => {
                    rule.apply(sentence, &mut augmented, &self.inflecter, rng)
                }
            };

            if fired {
                return Some(augmented);
            }
        }

        None
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }
}
