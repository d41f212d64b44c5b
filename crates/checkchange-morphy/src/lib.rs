//! Morphy-style lemmatization for order text.
//!
//! Follows the classic WordNet morphy recipe: check exceptions, apply suffix
//! rules, and keep only candidates that a caller-provided predicate accepts.
//! The crate knows nothing about where lemmas live; the lexicon loader or a
//! test closure decides what exists.
//!
//! # How it works
//! 1. Emit the surface form if it exists.
//! 2. Check exceptions (`*.exc` files, e.g. `children child`).
//! 3. Apply POS-specific suffix rules (`pizzas` -> `pizza`, `glasses` -> `glass`).
//! 4. Deduplicate while preserving provenance (`Surface`, `Exception`, `Rule`).
//!
//! # Example
//! ```
//! use checkchange_morphy::Morphy;
//! use checkchange_types::Pos;
//!
//! let morph = Morphy::empty();
//! let exists = |pos: Pos, lemma: &str| pos == Pos::Noun && lemma == "pizza";
//! assert_eq!(morph.lemma(Pos::Noun, "pizzas", exists), "pizza");
//! assert_eq!(morph.lemma(Pos::Noun, "wine", exists), "wine");
//! ```

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use checkchange_types::Pos;

/// Where a candidate lemma originated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CandidateSource {
    Surface,
    Exception,
    Rule {
        suffix: &'static str,
        replacement: &'static str,
    },
}

/// A lemma candidate paired with its POS and provenance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LemmaCandidate<'a> {
    pub pos: Pos,
    pub lemma: Cow<'a, str>,
    pub source: CandidateSource,
}

/// Exception lists keyed by the open word classes morphy understands.
#[derive(Clone, Debug, Default)]
pub struct Morphy {
    exceptions: HashMap<Pos, HashMap<String, Vec<String>>>,
}

impl Morphy {
    /// A lemmatizer with suffix rules only.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load exception lists (`noun.exc`, `verb.exc`, `adj.exc`, `adv.exc`)
    /// from a lexicon directory.
    ///
    /// Files are optional; missing ones are treated as empty.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            exceptions: HashMap::from([
                (Pos::Noun, load_exc(dir.join("noun.exc"))?),
                (Pos::Verb, load_exc(dir.join("verb.exc"))?),
                (Pos::Adj, load_exc(dir.join("adj.exc"))?),
                (Pos::Adv, load_exc(dir.join("adv.exc"))?),
            ]),
        })
    }

    /// Register an exception (`surface` inflects `lemma`) for `pos`.
    pub fn with_exception(mut self, pos: Pos, surface: &str, lemma: &str) -> Self {
        self.exceptions
            .entry(exception_class(pos))
            .or_default()
            .entry(normalize(surface))
            .or_default()
            .push(normalize(lemma));
        self
    }

    /// Number of exception entries across all classes.
    pub fn exception_count(&self) -> usize {
        self.exceptions.values().map(HashMap::len).sum()
    }

    /// Generate lemmas for a surface form, returning enriched provenance.
    pub fn lemmas_for<'a, F>(
        &'a self,
        pos: Pos,
        surface: &str,
        lemma_exists: F,
    ) -> Vec<LemmaCandidate<'a>>
    where
        F: Fn(Pos, &str) -> bool,
    {
        let mut seen: HashSet<Cow<'a, str>> = HashSet::new();
        let mut out: Vec<LemmaCandidate<'a>> = Vec::new();
        let norm_surface = normalize(surface);

        if lemma_exists(pos, &norm_surface) {
            push_unique(
                &mut out,
                &mut seen,
                LemmaCandidate {
                    pos,
                    lemma: Cow::Owned(norm_surface.clone()),
                    source: CandidateSource::Surface,
                },
            );
        }

        if let Some(exc_map) = self.exceptions.get(&exception_class(pos))
            && let Some(entries) = exc_map.get(&norm_surface)
        {
            for lemma in entries {
                if lemma_exists(pos, lemma) {
                    push_unique(
                        &mut out,
                        &mut seen,
                        LemmaCandidate {
                            pos,
                            lemma: Cow::Borrowed(lemma.as_str()),
                            source: CandidateSource::Exception,
                        },
                    );
                }
            }
        }

        for &(suffix, replacement) in rules_for(pos) {
            for candidate in apply_rule(&norm_surface, suffix, replacement) {
                if lemma_exists(pos, &candidate) {
                    push_unique(
                        &mut out,
                        &mut seen,
                        LemmaCandidate {
                            pos,
                            lemma: Cow::Owned(candidate),
                            source: CandidateSource::Rule {
                                suffix,
                                replacement,
                            },
                        },
                    );
                }
            }
        }

        out
    }

    /// Best lemma for `surface`: the first candidate, or the normalized surface
    /// form when nothing is known.
    pub fn lemma<F>(&self, pos: Pos, surface: &str, lemma_exists: F) -> String
    where
        F: Fn(Pos, &str) -> bool,
    {
        self.lemmas_for(pos, surface, lemma_exists)
            .into_iter()
            .next()
            .map(|cand| cand.lemma.into_owned())
            .unwrap_or_else(|| normalize(surface))
    }
}

fn exception_class(pos: Pos) -> Pos {
    match pos {
        Pos::Propn => Pos::Noun,
        Pos::Aux => Pos::Verb,
        other => other,
    }
}

fn load_exc(path: PathBuf) -> Result<HashMap<String, Vec<String>>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let file =
        File::open(&path).with_context(|| format!("open exception file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut map = HashMap::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        if line.trim_start().starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let surface = match parts.next() {
            Some(s) => normalize(s),
            None => continue,
        };
        let lemmas: Vec<String> = parts.map(normalize).collect();
        if !lemmas.is_empty() {
            map.insert(surface, lemmas);
        }
    }
    Ok(map)
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn push_unique<'a>(
    out: &mut Vec<LemmaCandidate<'a>>,
    seen: &mut HashSet<Cow<'a, str>>,
    candidate: LemmaCandidate<'a>,
) {
    if seen.insert(candidate.lemma.clone()) {
        out.push(candidate);
    }
}

/// Strip `suffix` and append `replacement`. Vowel-initial inflections also
/// yield an undoubled stem ("running" -> "runn", "run").
fn apply_rule(surface: &str, suffix: &str, replacement: &str) -> Vec<String> {
    let Some(stem) = surface.strip_suffix(suffix) else {
        return Vec::new();
    };
    if stem.is_empty() {
        return Vec::new();
    }
    let mut out = vec![format!("{stem}{replacement}")];

    if replacement.is_empty() && matches!(suffix, "ing" | "ed" | "er" | "est") {
        let mut chars = stem.chars();
        let last = chars.next_back();
        let prev = chars.next_back();
        if let (Some(a), Some(b)) = (last, prev)
            && a == b
        {
            out.push(chars.as_str().to_string() + &a.to_string());
        }
    }

    out
}

fn rules_for(pos: Pos) -> &'static [(&'static str, &'static str)] {
    match pos {
        Pos::Noun | Pos::Propn => &[
            ("s", ""),
            ("ses", "s"),
            ("xes", "x"),
            ("zes", "z"),
            ("ches", "ch"),
            ("shes", "sh"),
            ("men", "man"),
            ("ies", "y"),
        ],
        Pos::Verb | Pos::Aux => &[
            ("s", ""),
            ("ies", "y"),
            ("es", "e"),
            ("es", ""),
            ("ed", "e"),
            ("ed", ""),
            ("ing", "e"),
            ("ing", ""),
        ],
        Pos::Adj | Pos::Adv => &[("er", ""), ("er", "e"), ("est", ""), ("est", "e")],
        _ => &[],
    }
}
