//! Load the lexicon directory that backs the rule-based annotation pipeline.
//!
//! A lexicon directory holds two required files:
//!
//! - `lexicon.tsv`: one `word<TAB>TAG` pair per line, where `TAG` is a
//!   universal part-of-speech name (`NOUN`, `ADJ`, `ADP`, ...). A word may be
//!   listed under several tags; the first listing is its primary tag.
//! - `vectors.txt`: word vectors in GloVe text format (`word f1 f2 ... fn`),
//!   every row with the same dimension.
//!
//! Morphy exception lists (`*.exc`) may sit in the same directory; they are
//! read by `checkchange-morphy`, not here.
//!
//! Callers choose between memory-mapped files or owned buffers at runtime via
//! [`LoadMode`]. Parsed data is held in owned maps; the source buffers are
//! released once loading finishes.
//!
//! # Example
//! ```no_run
//! use checkchange_lexicon::{Lexicon, LoadMode};
//! use checkchange_types::Pos;
//!
//! # fn main() -> anyhow::Result<()> {
//! let lex = Lexicon::load_with_mode("/path/to/lexicon", LoadMode::Mmap)?;
//! assert!(lex.lemma_exists(Pos::Noun, "pizza"));
//! println!("pizza ~ soda: {:?}", lex.similarity("pizza", "soda"));
//! # Ok(()) }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use checkchange_types::Pos;
use memmap2::Mmap;

pub const TAGS_FILE: &str = "lexicon.tsv";
pub const VECTORS_FILE: &str = "vectors.txt";

/// Strategy for loading lexicon files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each file (fast, no intermediate copy).
    Mmap,
    /// Read each file into an owned buffer (portable fallback).
    Owned,
}

impl LoadMode {
    /// Parse `mmap` / `owned`, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

impl FromStr for LoadMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
            .ok_or_else(|| format!("unknown load mode {raw:?} (expected mmap or owned)"))
    }
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Part-of-speech lexicon plus a dense word-vector table.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    tags: HashMap<String, Vec<Pos>>,
    vector_rows: HashMap<String, usize>,
    vector_data: Vec<f32>,
    dimensions: usize,
}

impl Lexicon {
    /// Load a lexicon directory, memory-mapping its files.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(dir, LoadMode::Mmap)
    }

    /// Load a lexicon directory choosing between mmap and owned buffers.
    pub fn load_with_mode(dir: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let dir = dir.as_ref();
        for name in [TAGS_FILE, VECTORS_FILE] {
            let path = dir.join(name);
            if !path.exists() {
                anyhow::bail!("missing required lexicon file: {}", path.display());
            }
        }

        let mut lexicon = Self::default();
        let tags = load_file(dir.join(TAGS_FILE), mode)?;
        parse_tags(tags.as_slice(), &mut lexicon)?;
        let vectors = load_file(dir.join(VECTORS_FILE), mode)?;
        parse_vectors(vectors.as_slice(), &mut lexicon)?;
        Ok(lexicon)
    }

    /// Record `word` under `pos`. Repeated pairs are ignored.
    pub fn insert_tag(&mut self, word: &str, pos: Pos) {
        let entry = self.tags.entry(normalize_word(word)).or_default();
        if !entry.contains(&pos) {
            entry.push(pos);
        }
    }

    /// Store a vector for `word`, replacing any previous one.
    ///
    /// The first vector fixes the table's dimension.
    pub fn insert_vector(&mut self, word: &str, vector: &[f32]) -> Result<()> {
        if vector.is_empty() {
            anyhow::bail!("empty vector for {word:?}");
        }
        if self.dimensions == 0 {
            self.dimensions = vector.len();
        } else if vector.len() != self.dimensions {
            anyhow::bail!(
                "vector for {word:?} has {} dimensions, expected {}",
                vector.len(),
                self.dimensions
            );
        }
        let key = normalize_word(word);
        match self.vector_rows.get(&key) {
            Some(&row) => {
                let start = row * self.dimensions;
                self.vector_data[start..start + self.dimensions].copy_from_slice(vector);
            }
            None => {
                let row = self.vector_data.len() / self.dimensions;
                self.vector_data.extend_from_slice(vector);
                self.vector_rows.insert(key, row);
            }
        }
        Ok(())
    }

    /// Check whether `lemma` is listed under `pos`.
    pub fn lemma_exists(&self, pos: Pos, lemma: &str) -> bool {
        self.tags
            .get(&normalize_word(lemma))
            .is_some_and(|tags| tags.contains(&pos))
    }

    /// All tags listed for `word`, primary first.
    pub fn tags(&self, word: &str) -> &[Pos] {
        self.tags
            .get(&normalize_word(word))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First tag listed for `word`.
    pub fn primary_tag(&self, word: &str) -> Option<Pos> {
        self.tags(word).first().copied()
    }

    /// Vector row for `word`, if present.
    pub fn vector(&self, word: &str) -> Option<&[f32]> {
        let row = *self.vector_rows.get(&normalize_word(word))?;
        let start = row * self.dimensions;
        self.vector_data.get(start..start + self.dimensions)
    }

    /// Cosine similarity of two words, `None` when either lacks a usable vector.
    pub fn similarity(&self, a: &str, b: &str) -> Option<f32> {
        cosine(self.vector(a)?, self.vector(b)?)
    }

    /// Number of distinct words with at least one tag.
    pub fn word_count(&self) -> usize {
        self.tags.len()
    }

    /// Number of stored vectors.
    pub fn vector_count(&self) -> usize {
        self.vector_rows.len()
    }

    /// Vector dimension, 0 for an empty table.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn load_file(path: PathBuf, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
            // Zero-length files cannot be mapped on every platform.
            if file.metadata().map(|m| m.len() == 0).unwrap_or(false) {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn parse_tags(bytes: &[u8], lexicon: &mut Lexicon) -> Result<()> {
    for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = std::str::from_utf8(strip_cr(raw_line))
            .with_context(|| format!("{}:{} invalid utf8", TAGS_FILE, lineno + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((word, tag)) = line.split_once('\t') else {
            anyhow::bail!("{}:{} expected word<TAB>TAG", TAGS_FILE, lineno + 1);
        };
        let tag = tag.trim();
        let pos = Pos::from_tag(tag).ok_or_else(|| {
            anyhow::anyhow!("{}:{} unknown tag {}", TAGS_FILE, lineno + 1, tag)
        })?;
        lexicon.insert_tag(word, pos);
    }
    Ok(())
}

fn parse_vectors(bytes: &[u8], lexicon: &mut Lexicon) -> Result<()> {
    let mut row = Vec::new();
    for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = std::str::from_utf8(strip_cr(raw_line))
            .with_context(|| format!("{}:{} invalid utf8", VECTORS_FILE, lineno + 1))?;
        let mut tokens = line.split_ascii_whitespace();
        let Some(word) = tokens.next() else {
            continue;
        };
        row.clear();
        for token in tokens {
            let value: f32 = token.parse().with_context(|| {
                format!("{}:{} component {:?}", VECTORS_FILE, lineno + 1, token)
            })?;
            row.push(value);
        }
        lexicon
            .insert_vector(word, &row)
            .with_context(|| format!("{}:{}", VECTORS_FILE, lineno + 1))?;
    }
    Ok(())
}

fn cosine(a: &[f32], b: &[f32]) -> Option<f32> {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

fn strip_cr(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r") {
        &line[..line.len() - 1]
    } else {
        line
    }
}

fn normalize_word(text: &str) -> String {
    text.trim().to_lowercase()
}
