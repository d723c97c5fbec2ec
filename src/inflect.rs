//! Inflected-form generation on top of an external morphological analyzer.

use lazy_static::lazy_static;
use log::info;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

const ADVERB_TAGS: &[&str] = &["RB", "RBR", "RBS"];
const ADJECTIVE_TAGS: &[&str] = &["JJ", "JJR", "JJS"];

/// External morphological analysis service.
///
/// Implementations must be deterministic per call.
pub trait Morph: Send + Sync {
    /// The dictionary form of a surface form.
    fn lemma_of(&self, form: &str) -> String;
    /// The inflected form of a lemma for a target tag, if the analyzer knows one.
    fn inflect(&self, lemma: &str, tag: &str) -> Option<String>;
}

/// A [Morph] backed by a tab-separated dictionary dump with one
/// `form<TAB>lemma<TAB>tag` entry per line. Lines starting with `#` are skipped.
pub struct DictMorph {
    lemmas: HashMap<String, String>,
    forms: HashMap<(String, String), String>,
}

impl DictMorph {
    pub fn from_dump<P: AsRef<Path>>(path: P) -> Result<Self, crate::Error> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, crate::Error> {
        let mut lemmas = HashMap::new();
        let mut forms = HashMap::new();

        for line in reader.lines() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let parts: Vec<_> = line.split('\t').collect();
            if parts.len() != 3 {
                return Err(crate::Error::MalformedInput(format!(
                    "dictionary line {:?}",
                    line
                )));
            }

            lemmas.insert(parts[0].to_string(), parts[1].to_string());
            forms.insert(
                (parts[1].to_string(), parts[2].to_string()),
                parts[0].to_string(),
            );
        }

        Ok(DictMorph { lemmas, forms })
    }
}

impl Morph for DictMorph {
    fn lemma_of(&self, form: &str) -> String {
        self.lemmas
            .get(form)
            .or_else(|| self.lemmas.get(&form.to_lowercase()))
            .cloned()
            .unwrap_or_else(|| form.to_lowercase())
    }

    fn inflect(&self, lemma: &str, tag: &str) -> Option<String> {
        self.forms.get(&(lemma.to_string(), tag.to_string())).cloned()
    }
}

lazy_static! {
    /// Adjective/adverb pairs whose adverb is not derived by regular inflection.
    /// Identity pairs (fast, hard, ...) are listed so that requesting the "other"
    /// form of such a word correctly yields nothing.
    static ref ADJECTIVE_ADVERB_PAIRS: Vec<(&'static str, &'static str)> = vec![
        ("good", "well"),
        ("whole", "wholly"),
        ("true", "truly"),
        ("due", "duly"),
        ("full", "fully"),
        ("public", "publicly"),
        ("wrong", "wrongly"),
        ("fast", "fast"),
        ("hard", "hard"),
        ("late", "late"),
        ("early", "early"),
        ("straight", "straight"),
    ];
}

/// Inflected-form lookup combining two hand-curated irregular-form tables with a
/// generic [Morph] analyzer.
///
/// Table keys and values are expected lowercased; absence of a key is a normal
/// "no form available" outcome, never an error.
pub struct Inflecter {
    morph: Box<dyn Morph>,
    adjective_to_adverb: HashMap<String, String>,
    adverb_to_adjective: HashMap<String, String>,
}

impl Inflecter {
    pub fn new(
        morph: Box<dyn Morph>,
        adjective_to_adverb: HashMap<String, String>,
        adverb_to_adjective: HashMap<String, String>,
    ) -> Self {
        Inflecter {
            morph,
            adjective_to_adverb,
            adverb_to_adjective,
        }
    }

    /// An [Inflecter] with both irregular tables seeded from the built-in
    /// adjective/adverb pairs.
    pub fn with_default_tables(morph: Box<dyn Morph>) -> Self {
        Inflecter::new(
            morph,
            ADJECTIVE_ADVERB_PAIRS
                .iter()
                .map(|(adj, adv)| (adj.to_string(), adv.to_string()))
                .collect(),
            ADJECTIVE_ADVERB_PAIRS
                .iter()
                .map(|(adj, adv)| (adv.to_string(), adj.to_string()))
                .collect(),
        )
    }

    /// The inflected form of `word` for `tag`, lowercased, or `None` when no usable
    /// form exists.
    ///
    /// Adverb tags are served from the adjective→adverb table only. Adjective tags
    /// are served from the adverb→adjective table when the word has an entry and
    /// fall through to the analyzer when it has none. A form identical to the
    /// lowercased input never counts as usable. The lemma fed to the analyzer is
    /// re-derived from `word`, not taken from the annotation.
    pub fn form_for(&self, word: &str, tag: &str) -> Option<String> {
        let lower = word.to_lowercase();

        if ADVERB_TAGS.contains(&tag) {
            if let Some(entry) = self.adjective_to_adverb.get(&lower) {
                let form = entry.to_lowercase();
                if form != lower {
                    info!("found {} form for {}: {}", tag, lower, form);
                    return Some(form);
                }
            }
            info!("could not find {} form for {}", tag, lower);
            return None;
        }

        if ADJECTIVE_TAGS.contains(&tag) {
            if let Some(entry) = self.adverb_to_adjective.get(&lower) {
                let form = entry.to_lowercase();
                if form != lower {
                    info!("found {} form for {}: {}", tag, lower, form);
                    return Some(form);
                }
                info!("could not find {} form for {}", tag, lower);
                return None;
            }
        }

        let lemma = self.morph.lemma_of(word);
        let form = self
            .morph
            .inflect(&lemma, tag)
            .map(|form| form.to_lowercase())
            .filter(|form| *form != lower);

        match form {
            Some(form) => {
                info!("found {} form for {}: {}", tag, lower, form);
                Some(form)
            }
            None => {
                info!("could not find {} form for {}", tag, lower);
                None
            }
        }
    }
}
