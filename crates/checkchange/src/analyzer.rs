use std::collections::HashMap;
use std::fmt;

use checkchange_types::{Doc, NlpAnnotationService, Pos};
use thiserror::Error;
use tracing::debug;

use crate::numbers::{NumberError, parse_number};

/// Upper bound on descriptive words kept per sentence.
pub const MAX_MODIFIERS: usize = 10;

const MODIFIER_TAGS: &[Pos] = &[Pos::Adj, Pos::Noun];
const QUALIFIER_TAGS: &[Pos] = &[Pos::Adp];

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("no noun phrase found in {sentence:?}")]
    EmptyNounPhrase { sentence: String },
    #[error(transparent)]
    Number(#[from] NumberError),
    #[error("order has no items to change")]
    EmptyOrder,
}

/// Structured reading of one order line or change request.
///
/// Renders as `"{quantity} {modifiers} {main_noun}"`; an empty modifier list
/// leaves two spaces between quantity and noun.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzedSentence {
    raw_text: String,
    noun_phrases: Vec<String>,
    main_noun: String,
    modifiers: String,
    qualifier: String,
    quantity: u64,
    all_nouns_plural: bool,
}

impl AnalyzedSentence {
    /// Annotate `text` and extract nouns, modifiers, qualifier and quantity.
    pub fn analyze(text: &str, nlp: &dyn NlpAnnotationService) -> Result<Self, CheckError> {
        let doc = nlp.annotate(text);

        let noun_phrases = doc
            .noun_chunks()
            .iter()
            .map(|chunk| doc.chunk_root(chunk).map(|root| root.text.clone()))
            .collect::<Option<Vec<String>>>()
            .ok_or_else(|| CheckError::EmptyNounPhrase {
                sentence: text.to_string(),
            })?;
        // The last chunk is taken as the referent.
        let Some(main_noun) = noun_phrases.last().cloned() else {
            return Err(CheckError::EmptyNounPhrase {
                sentence: text.to_string(),
            });
        };

        let modifiers = most_common(
            &referenced_words(&doc, &main_noun, MODIFIER_TAGS),
            MAX_MODIFIERS,
        )
        .into_iter()
        .filter(|word| !noun_phrases.contains(word))
        .collect::<Vec<_>>()
        .join(" ");
        let qualifier =
            most_common(&referenced_words(&doc, &main_noun, QUALIFIER_TAGS), 1).join(" ");

        let numbers = doc
            .tokens()
            .iter()
            .filter(|tok| tok.pos == Pos::Num)
            .map(|tok| parse_number(&tok.lemma))
            .collect::<Result<Vec<_>, _>>()?;
        let quantity = match numbers.first() {
            Some(&n) => n,
            None if is_plural(&main_noun, nlp) => 0,
            None => 1,
        };
        let all_nouns_plural = noun_phrases.iter().all(|noun| is_plural(noun, nlp));

        let analyzed = Self {
            raw_text: text.to_string(),
            noun_phrases,
            main_noun,
            modifiers,
            qualifier,
            quantity,
            all_nouns_plural,
        };
        debug!(
            text,
            nouns = ?analyzed.noun_phrases,
            modifiers = %analyzed.modifiers,
            qualifier = %analyzed.qualifier,
            quantity = analyzed.quantity,
            "analyzed sentence"
        );
        Ok(analyzed)
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn noun_phrases(&self) -> &[String] {
        &self.noun_phrases
    }

    pub fn main_noun(&self) -> &str {
        &self.main_noun
    }

    pub fn modifiers(&self) -> &str {
        &self.modifiers
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Same reading with a different quantity.
    pub fn with_quantity(mut self, quantity: u64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Highest similarity between the main noun and any of `words`.
    pub fn similarity(&self, words: &[String], nlp: &dyn NlpAnnotationService) -> f32 {
        words
            .iter()
            .map(|word| nlp.similarity(&self.main_noun, word))
            .fold(None, |best: Option<f32>, score| match best {
                Some(top) if top >= score => Some(top),
                _ => Some(score),
            })
            .unwrap_or(0.0)
    }

    /// Every noun is plural and no count was given ("change the sodas for wine").
    pub fn is_total_replace(&self) -> bool {
        self.all_nouns_plural && self.quantity == 0
    }
}

impl fmt::Display for AnalyzedSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.quantity, self.modifiers, self.main_noun)
    }
}

fn is_plural(word: &str, nlp: &dyn NlpAnnotationService) -> bool {
    nlp.lemma(word, Pos::Noun).to_lowercase() != word.to_lowercase()
}

/// Texts of children tagged with one of `wanted`, gathered across every
/// sentence that mentions `main_noun`.
fn referenced_words(doc: &Doc, main_noun: &str, wanted: &[Pos]) -> Vec<String> {
    let mut words = Vec::new();
    for sentence in doc.sentences().filter(|s| s.text.contains(main_noun)) {
        for idx in sentence.tokens {
            words.extend(
                doc.children(idx)
                    .filter(|child| wanted.contains(&child.pos))
                    .map(|child| child.text.trim().to_string()),
            );
        }
    }
    words
}

/// Up to `limit` distinct words, most frequent first; ties keep first-seen order.
fn most_common(words: &[String], limit: usize) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, word) in words.iter().enumerate() {
        counts.entry(word.as_str()).or_insert((0, idx)).0 += 1;
    }
    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _, _)| word.to_string())
        .collect()
}
