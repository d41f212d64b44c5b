use std::path::PathBuf;

use checkchange_lexicon::{Lexicon, LoadMode, TAGS_FILE, VECTORS_FILE};
use checkchange_types::Pos;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("basic")
}

#[test]
fn loads_tags_and_vectors_in_both_modes() {
    for mode in [LoadMode::Mmap, LoadMode::Owned] {
        let lex = Lexicon::load_with_mode(fixture_dir(), mode).expect("load fixtures");
        assert_eq!(lex.word_count(), 4, "{mode:?}");
        assert_eq!(lex.vector_count(), 4, "{mode:?}");
        assert_eq!(lex.dimensions(), 3, "{mode:?}");
        assert_eq!(lex.tags("slice"), &[Pos::Noun, Pos::Verb]);
        assert_eq!(lex.primary_tag("With"), Some(Pos::Adp));
        assert!(lex.lemma_exists(Pos::Verb, "slice"));
        assert!(!lex.lemma_exists(Pos::Adj, "pizza"));
    }
}

#[test]
fn cosine_similarity_over_loaded_vectors() {
    let lex = Lexicon::load(fixture_dir()).expect("load fixtures");
    let sim = lex.similarity("pizza", "slice").expect("both have vectors");
    assert!((sim - 0.8).abs() < 1e-6);
    assert_eq!(lex.similarity("pizza", "large"), Some(0.0));
    assert_eq!(lex.similarity("pizza", "zero"), None);
    assert_eq!(lex.similarity("pizza", "calzone"), None);
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(TAGS_FILE), "pizza\tNOUN\n").unwrap();
    let err = Lexicon::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("missing required lexicon file"));
    assert!(err.to_string().contains(VECTORS_FILE));
}

#[test]
fn malformed_lines_report_file_and_line() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(TAGS_FILE), "pizza\tNOUN\nsoda NOUN\n").unwrap();
    std::fs::write(dir.path().join(VECTORS_FILE), "pizza 1 0\n").unwrap();
    let err = Lexicon::load_with_mode(dir.path(), LoadMode::Owned).unwrap_err();
    assert!(format!("{err:#}").contains("lexicon.tsv:2"));

    std::fs::write(dir.path().join(TAGS_FILE), "pizza\tNOUN\n").unwrap();
    std::fs::write(dir.path().join(VECTORS_FILE), "pizza 1 0\nsoda 0 1 0\n").unwrap();
    let err = Lexicon::load_with_mode(dir.path(), LoadMode::Owned).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("vectors.txt:2"), "{msg}");
    assert!(msg.contains("expected 2"), "{msg}");
}

#[test]
fn empty_files_load_as_empty_lexicon() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(TAGS_FILE), "").unwrap();
    std::fs::write(dir.path().join(VECTORS_FILE), "").unwrap();
    let lex = Lexicon::load_with_mode(dir.path(), LoadMode::Mmap).unwrap();
    assert_eq!(lex.word_count(), 0);
    assert_eq!(lex.dimensions(), 0);
}
