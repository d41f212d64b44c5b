//! Shared annotation types for the check-change workspace.
//!
//! An annotation backend turns raw text into a [`Doc`]: tokens with
//! universal part-of-speech tags ([`Pos`]), lemmas and dependency heads,
//! sentence boundaries, and noun chunks. The [`NlpAnnotationService`] trait is
//! the seam between the order logic and whichever backend is loaded; the
//! crate itself has no dependencies and performs no analysis.
//!
//! ```rust
//! use checkchange_types::{Doc, NounChunk, Pos, Token};
//!
//! let tokens = vec![
//!     Token::new("the", "the", Pos::Det, 0..3).with_head(1),
//!     Token::new("sodas", "soda", Pos::Noun, 4..9),
//! ];
//! let chunk = NounChunk { start: 0, end: 2, root: 1 };
//! let doc = Doc::new("the sodas", tokens, vec![0..2], vec![chunk]);
//!
//! assert_eq!(doc.chunk_root(&doc.noun_chunks()[0]).map(|t| t.text.as_str()), Some("sodas"));
//! assert_eq!(doc.children(1).map(|t| t.text.as_str()).collect::<Vec<_>>(), ["the"]);
//! assert_eq!(Pos::from_tag("ADP"), Some(Pos::Adp));
//! ```

use std::fmt;
use std::ops::Range;

/// Universal part-of-speech tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl Pos {
    /// Parse an upper-case universal tag (`NOUN`, `ADP`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let pos = match tag {
            "ADJ" => Pos::Adj,
            "ADP" => Pos::Adp,
            "ADV" => Pos::Adv,
            "AUX" => Pos::Aux,
            "CCONJ" => Pos::Cconj,
            "DET" => Pos::Det,
            "INTJ" => Pos::Intj,
            "NOUN" => Pos::Noun,
            "NUM" => Pos::Num,
            "PART" => Pos::Part,
            "PRON" => Pos::Pron,
            "PROPN" => Pos::Propn,
            "PUNCT" => Pos::Punct,
            "SCONJ" => Pos::Sconj,
            "SYM" => Pos::Sym,
            "VERB" => Pos::Verb,
            "X" => Pos::X,
            _ => return None,
        };
        Some(pos)
    }

    /// Emit the tag as it appears in lexicon files.
    pub fn as_tag(self) -> &'static str {
        match self {
            Pos::Adj => "ADJ",
            Pos::Adp => "ADP",
            Pos::Adv => "ADV",
            Pos::Aux => "AUX",
            Pos::Cconj => "CCONJ",
            Pos::Det => "DET",
            Pos::Intj => "INTJ",
            Pos::Noun => "NOUN",
            Pos::Num => "NUM",
            Pos::Part => "PART",
            Pos::Pron => "PRON",
            Pos::Propn => "PROPN",
            Pos::Punct => "PUNCT",
            Pos::Sconj => "SCONJ",
            Pos::Sym => "SYM",
            Pos::Verb => "VERB",
            Pos::X => "X",
        }
    }

    /// Common or proper noun.
    pub fn is_noun(self) -> bool {
        matches!(self, Pos::Noun | Pos::Propn)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// One token of an annotated text.
///
/// `span` is a byte range into [`Doc::text`]. `head` is the index of the
/// syntactic parent within the same doc, `None` for a sentence root.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: Pos,
    pub head: Option<usize>,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(
        text: impl Into<String>,
        lemma: impl Into<String>,
        pos: Pos,
        span: Range<usize>,
    ) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            pos,
            head: None,
            span,
        }
    }

    pub fn with_head(mut self, head: usize) -> Self {
        self.head = Some(head);
        self
    }

}

/// A noun phrase as a half-open token range plus the index of its head token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NounChunk {
    pub start: usize,
    pub end: usize,
    pub root: usize,
}

/// A sentence as seen through [`Doc::sentences`].
#[derive(Clone, Debug)]
pub struct Sentence<'a> {
    pub tokens: Range<usize>,
    pub text: &'a str,
}

/// Full annotation of one input text.
#[derive(Clone, Debug, Default)]
pub struct Doc {
    text: String,
    tokens: Vec<Token>,
    sentences: Vec<Range<usize>>,
    noun_chunks: Vec<NounChunk>,
}

impl Doc {
    pub fn new(
        text: impl Into<String>,
        tokens: Vec<Token>,
        sentences: Vec<Range<usize>>,
        noun_chunks: Vec<NounChunk>,
    ) -> Self {
        Self {
            text: text.into(),
            tokens,
            sentences,
            noun_chunks,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn noun_chunks(&self) -> &[NounChunk] {
        &self.noun_chunks
    }

    /// Head token of a chunk, `None` when `root` points outside the doc.
    pub fn chunk_root(&self, chunk: &NounChunk) -> Option<&Token> {
        self.tokens.get(chunk.root)
    }

    /// Iterate sentences with the text they cover, from the first token's
    /// start to the last token's end.
    pub fn sentences(&self) -> impl Iterator<Item = Sentence<'_>> + '_ {
        self.sentences.iter().filter_map(|range| {
            let first = self.tokens.get(range.start)?;
            let last = self.tokens.get(range.end.checked_sub(1)?)?;
            let text = self.text.get(first.span.start..last.span.end)?;
            Some(Sentence {
                tokens: range.clone(),
                text,
            })
        })
    }

    /// Syntactic children of the token at `idx`, in document order.
    pub fn children(&self, idx: usize) -> impl Iterator<Item = &Token> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(i, tok)| *i != idx && tok.head == Some(idx))
            .map(|(_, tok)| tok)
    }
}

/// Capability interface of an NLP backend.
///
/// Implementations are loaded once and shared read-only, hence `Send + Sync`.
pub trait NlpAnnotationService: Send + Sync {
    /// Tokenize, tag, parse, and chunk `text`.
    fn annotate(&self, text: &str) -> Doc;

    /// Base form of `word` read as part of speech `pos`.
    fn lemma(&self, word: &str, pos: Pos) -> String;

    /// Semantic similarity of two words, nominally in `[0, 1]`.
    fn similarity(&self, a: &str, b: &str) -> f32;
}
