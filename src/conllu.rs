//! Parsing and serialization of the CoNLL-U annotation format.
//!
//! A document is a sequence of sentence blocks, each introduced by a
//! `# sent_id = N` marker line and separated by blank lines. Sentence ids are
//! 0-based and dense within a document; the parser places each sentence at its
//! declared id, so a gap, duplicate or out-of-range id is malformed input.

use itertools::Itertools;

use crate::types::{Sentence, Token};
use crate::Error;

const SENT_ID_MARKER: &str = "# sent_id =";

/// Parses a document into sentences, ordered by their declared ids.
pub fn parse(text: &str) -> Result<Vec<Sentence>, Error> {
    let blocks: Vec<&str> = text.split(SENT_ID_MARKER).skip(1).collect();
    let mut sentences: Vec<Option<Sentence>> = (0..blocks.len()).map(|_| None).collect();

    for block in blocks {
        let mut parts = block.splitn(2, '\n');
        let id_line = parts.next().unwrap_or("").trim();
        let id: usize = id_line
            .parse()
            .map_err(|_| Error::MalformedInput(format!("sentence id {:?}", id_line)))?;

        let mut tokens = Vec::new();
        for line in parts.next().unwrap_or("").lines() {
            if line.trim().is_empty() {
                continue;
            }
            tokens.push(parse_token(line)?);
        }
        if tokens.is_empty() {
            return Err(Error::MalformedInput(format!(
                "sentence {} has no tokens",
                id
            )));
        }

        if id >= sentences.len() {
            return Err(Error::MalformedInput(format!(
                "sentence id {} out of range for a document of {} sentences",
                id,
                sentences.len()
            )));
        }
        if sentences[id].is_some() {
            return Err(Error::MalformedInput(format!("duplicate sentence id {}", id)));
        }
        sentences[id] = Some(Sentence::new(id, tokens));
    }

    sentences
        .into_iter()
        .enumerate()
        .map(|(id, sentence)| {
            sentence.ok_or_else(|| Error::MalformedInput(format!("missing sentence id {}", id)))
        })
        .collect()
}

fn parse_token(line: &str) -> Result<Token, Error> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 8 {
        return Err(Error::MalformedInput(format!(
            "token line with {} columns: {:?}",
            fields.len(),
            line
        )));
    }

    let index = fields[0]
        .parse()
        .map_err(|_| Error::MalformedInput(format!("token index {:?}", fields[0])))?;
    let head = fields[6]
        .parse()
        .map_err(|_| Error::MalformedInput(format!("token head {:?}", fields[6])))?;

    Ok(Token {
        index,
        form: fields[1].to_string(),
        lemma: fields[2].to_string(),
        pos: fields[3].to_string(),
        tag: fields[4].to_string(),
        feats: fields[5].to_string(),
        head,
        deprel: fields[7].to_string(),
        rest: fields[8..].iter().map(|x| x.to_string()).collect(),
    })
}

/// Serializes one sentence back to its textual block, trailing blank line included.
pub fn serialize(sentence: &Sentence) -> String {
    let lines = sentence.tokens.iter().map(token_line).join("\n");
    format!("{} {}\n{}\n\n", SENT_ID_MARKER, sentence.id, lines)
}

fn token_line(token: &Token) -> String {
    let mut fields = vec![
        token.index.to_string(),
        token.form.clone(),
        token.lemma.clone(),
        token.pos.clone(),
        token.tag.clone(),
        token.feats.clone(),
        token.head.to_string(),
        token.deprel.clone(),
    ];
    fields.extend(token.rest.iter().cloned());
    fields.join("\t")
}
