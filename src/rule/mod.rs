//! Error-injection rules and their application to a single sentence.

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::inflect::Inflecter;
use crate::tag;
use crate::types::Sentence;

/// Unconditional lexical substitution keyed by surface form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactRule {
    pub source: String,
    pub target: String,
    pub pos: String,
    pub tag: String,
    #[serde(default)]
    pub feats: Option<String>,
    pub probability: f64,
}

/// Substitution conditioned on a token's role in the dependency tree relative to
/// its head. `child` selects which end of the edge is rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRule {
    pub deprel: String,
    pub child_pos: Vec<String>,
    pub head_pos: Vec<String>,
    pub old_tags: Vec<String>,
    pub tag: String,
    pub child: bool,
    #[serde(default)]
    pub feats: Option<String>,
    pub probability: f64,
}

/// One error-injection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    Exact(ExactRule),
    Dependency(DependencyRule),
}

impl ExactRule {
    /// Rewrites the first token whose form equals `source` and which passes its own
    /// probability draw. Returns whether the rule fired. A matching token that fails
    /// its draw is skipped for good; later occurrences draw independently.
    pub(crate) fn apply<R: Rng>(&self, target: &mut Sentence, rng: &mut R) -> bool {
        for token in target.tokens.iter_mut() {
            if token.form == self.source && rng.gen::<f64>() < self.probability {
                info!("changing {} to {}", self.source, self.target);
                token.form = self.target.clone();
                token.pos = self.pos.clone();
                token.tag = self.tag.clone();
                if let Some(feats) = &self.feats {
                    token.feats = feats.clone();
                }
                return true;
            }
        }
        false
    }
}

impl DependencyRule {
    /// Rewrites the child or head of the first eligible dependency edge.
    ///
    /// Eligibility is read from `source` only; the edit is written into `target`.
    /// Returns whether the rule fired. Once a token match is committed, a missing
    /// inflected form aborts the whole attempt instead of scanning on.
    pub(crate) fn apply<R: Rng>(
        &self,
        source: &Sentence,
        target: &mut Sentence,
        inflecter: &Inflecter,
        rng: &mut R,
    ) -> bool {
        for (i, token) in source.tokens.iter().enumerate() {
            // a rootless token has no head pos to satisfy the head predicate
            let head = match source.head_of(token) {
                Some(head) => head,
                None => continue,
            };

            if token.deprel != self.deprel
                || !self.child_pos.contains(&token.pos)
                || !self.head_pos.contains(&head.pos)
                || rng.gen::<f64>() >= self.probability
            {
                continue;
            }

            let (index, form) = if self.child {
                if !self.old_tags.contains(&token.tag) {
                    continue;
                }
                (i, token.form.as_str())
            } else {
                if !self.old_tags.contains(&head.tag) {
                    continue;
                }
                (token.head - 1, head.form.as_str())
            };

            let new_form = match inflecter.form_for(form, &self.tag) {
                Some(new_form) => new_form,
                None => return false,
            };
            let pos = tag::coarse_of(&self.tag)
                .unwrap_or_else(|| panic!("tag {:?} must have a part-of-speech category", self.tag));

            info!("changing {} to {}", form, new_form);

            let rewritten = &mut target.tokens[index];
            rewritten.tag = self.tag.clone();
            rewritten.form = new_form;
            rewritten.pos = pos.to_string();
            if let Some(feats) = &self.feats {
                rewritten.feats = feats.clone();
            }
            return true;
        }

        false
    }
}
