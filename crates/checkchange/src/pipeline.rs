use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use checkchange_lexicon::{Lexicon, LoadMode};
use checkchange_morphy::Morphy;
use checkchange_types::{Doc, NlpAnnotationService, NounChunk, Pos, Token};
use tracing::{debug, info};

use crate::numbers::is_number_word;

/// Tags that may appear inside a noun chunk.
const CHUNK_TAGS: &[Pos] = &[Pos::Det, Pos::Num, Pos::Adj, Pos::Noun, Pos::Propn];

/// Open classes tried, in order, when a word is missing from the lexicon.
const GUESS_ORDER: [Pos; 4] = [Pos::Noun, Pos::Verb, Pos::Adj, Pos::Adv];

/// Rule-based annotator over a tag lexicon, morphy lemmatization and word
/// vectors.
///
/// Chunks are runs of determiners, numerals, adjectives and nouns ending at
/// the last noun. Heads are attached with a few positional rules: chunk
/// members hang off the chunk root, a chunk right after a preposition hangs
/// off that preposition, everything else hangs off the sentence's first verb.
pub struct LexiconPipeline {
    lexicon: Lexicon,
    morphy: Morphy,
}

struct RawToken<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

impl LexiconPipeline {
    pub fn new(lexicon: Lexicon, morphy: Morphy) -> Self {
        Self { lexicon, morphy }
    }

    /// Load `lexicon.tsv`, `vectors.txt` and any `*.exc` files from `dir`.
    pub fn load(dir: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let dir = dir.as_ref();
        let start = Instant::now();
        let lexicon = Lexicon::load_with_mode(dir, mode)
            .with_context(|| format!("loading lexicon from {}", dir.display()))?;
        let morphy = Morphy::load(dir)
            .with_context(|| format!("loading exceptions from {}", dir.display()))?;
        info!(
            "lexicon loaded in {} ms: {} words, {} vectors ({} dims), {} exceptions",
            start.elapsed().as_millis(),
            lexicon.word_count(),
            lexicon.vector_count(),
            lexicon.dimensions(),
            morphy.exception_count()
        );
        Ok(Self::new(lexicon, morphy))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    fn exists(&self) -> impl Fn(Pos, &str) -> bool + '_ {
        |pos, lemma| self.lexicon.lemma_exists(pos, lemma)
    }

    fn tag(&self, word: &str) -> Pos {
        let lower = word.to_lowercase();
        if !lower.chars().any(char::is_alphanumeric) {
            return Pos::Punct;
        }
        if lower.bytes().all(|b| b.is_ascii_digit()) || is_number_word(&lower) {
            return Pos::Num;
        }
        if let Some(pos) = self.lexicon.primary_tag(&lower) {
            return pos;
        }
        GUESS_ORDER
            .into_iter()
            .find(|&pos| !self.morphy.lemmas_for(pos, &lower, self.exists()).is_empty())
            .unwrap_or(Pos::Noun)
    }

    fn lemma_for(&self, word: &str, pos: Pos) -> String {
        match pos {
            Pos::Num | Pos::Punct => word.to_lowercase(),
            _ => self.morphy.lemma(pos, word, self.exists()),
        }
    }

    /// Lexicon key holding a vector for `word`: the word itself, else its
    /// noun lemma.
    fn vector_key(&self, word: &str) -> Option<String> {
        if self.lexicon.vector(word).is_some() {
            return Some(word.to_string());
        }
        let lemma = self.lemma_for(word, Pos::Noun);
        self.lexicon.vector(&lemma).map(|_| lemma)
    }
}

impl NlpAnnotationService for LexiconPipeline {
    fn annotate(&self, text: &str) -> Doc {
        let raw = tokenize(text);
        let mut tokens: Vec<Token> = raw
            .iter()
            .map(|tok| {
                let pos = self.tag(tok.text);
                Token::new(
                    tok.text,
                    self.lemma_for(tok.text, pos),
                    pos,
                    tok.start..tok.end,
                )
            })
            .collect();

        let tags: Vec<Pos> = tokens.iter().map(|t| t.pos).collect();
        let sentences = split_sentences(&tokens);
        let chunks = noun_chunks(&tags);
        attach_heads(&mut tokens, &sentences, &chunks);

        debug!(
            text,
            tokens = tokens.len(),
            sentences = sentences.len(),
            chunks = chunks.len(),
            "annotated"
        );
        Doc::new(text, tokens, sentences, chunks)
    }

    fn lemma(&self, word: &str, pos: Pos) -> String {
        self.lemma_for(word, pos)
    }

    fn similarity(&self, a: &str, b: &str) -> f32 {
        let (Some(ka), Some(kb)) = (self.vector_key(a), self.vector_key(b)) else {
            return 0.0;
        };
        self.lexicon
            .similarity(&ka, &kb)
            .map(|score| score.clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }
}

/// Words (letters and digits, with inner apostrophes or hyphens) and single
/// punctuation marks.
fn tokenize(text: &str) -> Vec<RawToken<'_>> {
    let mut out = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        let mut end = start + c.len_utf8();
        if c.is_alphanumeric() {
            while let Some(&(idx, ch)) = chars.peek() {
                let joins = matches!(ch, '\'' | '-')
                    && text[idx + ch.len_utf8()..]
                        .chars()
                        .next()
                        .is_some_and(char::is_alphanumeric);
                if !(ch.is_alphanumeric() || joins) {
                    break;
                }
                end = idx + ch.len_utf8();
                chars.next();
            }
        }
        out.push(RawToken {
            text: &text[start..end],
            start,
            end,
        });
    }
    out
}

fn split_sentences(tokens: &[Token]) -> Vec<std::ops::Range<usize>> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for (idx, tok) in tokens.iter().enumerate() {
        if matches!(tok.text.as_str(), "." | "!" | "?") {
            sentences.push(start..idx + 1);
            start = idx + 1;
        }
    }
    if start < tokens.len() {
        sentences.push(start..tokens.len());
    }
    sentences
}

fn noun_chunks(tags: &[Pos]) -> Vec<NounChunk> {
    let mut chunks = Vec::new();
    let mut idx = 0;
    while idx < tags.len() {
        if tags[idx] == Pos::Pron {
            chunks.push(NounChunk {
                start: idx,
                end: idx + 1,
                root: idx,
            });
            idx += 1;
            continue;
        }
        if !CHUNK_TAGS.contains(&tags[idx]) {
            idx += 1;
            continue;
        }
        let start = idx;
        while idx < tags.len() && CHUNK_TAGS.contains(&tags[idx]) {
            idx += 1;
        }
        if let Some(root) = (start..idx).rev().find(|&j| tags[j].is_noun()) {
            chunks.push(NounChunk {
                start,
                end: root + 1,
                root,
            });
        }
    }
    chunks
}

fn attach_heads(tokens: &mut [Token], sentences: &[std::ops::Range<usize>], chunks: &[NounChunk]) {
    let mut chunk_of: Vec<Option<usize>> = vec![None; tokens.len()];
    for (c, chunk) in chunks.iter().enumerate() {
        for slot in &mut chunk_of[chunk.start..chunk.end] {
            *slot = Some(c);
        }
    }

    for range in sentences {
        let root = range
            .clone()
            .find(|&j| matches!(tokens[j].pos, Pos::Verb | Pos::Aux))
            .or_else(|| {
                chunks
                    .iter()
                    .rev()
                    .find(|c| range.contains(&c.root))
                    .map(|c| c.root)
            })
            .unwrap_or(range.start);

        // Preceding token within the sentence.
        let prev = |j: usize| j.checked_sub(1).filter(|p| *p >= range.start);

        for j in range.clone() {
            let head = if j == root {
                None
            } else if let Some(chunk) = chunk_of[j].map(|c| &chunks[c]) {
                if chunk.root != j {
                    Some(chunk.root)
                } else {
                    match prev(chunk.start) {
                        Some(p) if tokens[p].pos == Pos::Adp => Some(p),
                        _ => Some(root),
                    }
                }
            } else if tokens[j].pos == Pos::Adp {
                match prev(j) {
                    Some(p) if tokens[p].pos == Pos::Num && chunk_of[p].is_none() => Some(p),
                    _ => Some(root),
                }
            } else {
                Some(root)
            };
            tokens[j].head = head;
        }
    }
}
