use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use checkchange::{AnalyzedSentence, LexiconPipeline};
use checkchange_lexicon::LoadMode;
use checkchange_types::NlpAnnotationService;

const USAGE: &str =
    "usage: cargo run -p checkchange --example annotate -- <lexicon-dir> [--demo | <sentence>]";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let lexicon_dir = args.next().map(PathBuf::from).context(USAGE)?;
    let next = args.next();
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let sentences: Vec<String> = match next {
        Some(arg) if arg == "--demo" => vec![
            "2 large pepperoni pizzas".into(),
            "Make one of the pizzas small".into(),
            "Change the sodas with cocktails".into(),
            "Make two of the drinks a regular".into(),
        ],
        Some(arg) => vec![arg],
        None => bail!(USAGE),
    };

    let nlp = LexiconPipeline::load(&lexicon_dir, LoadMode::Mmap)
        .with_context(|| format!("loading lexicon from {}", lexicon_dir.display()))?;

    println!("Lexicon: {}", lexicon_dir.display());

    for text in sentences {
        println!("\nSentence: {text}");
        let doc = nlp.annotate(&text);
        for (idx, tok) in doc.tokens().iter().enumerate() {
            let head = tok
                .head
                .map(|h| h.to_string())
                .unwrap_or_else(|| "ROOT".to_string());
            println!(
                "  {idx:>2} {:<12} {:<10} {:<6} -> {head}",
                tok.text,
                tok.lemma,
                tok.pos.as_tag()
            );
        }
        for chunk in doc.noun_chunks() {
            let words: Vec<&str> = doc.tokens()[chunk.start..chunk.end]
                .iter()
                .map(|t| t.text.as_str())
                .collect();
            println!("  chunk: {}", words.join(" "));
        }
        match AnalyzedSentence::analyze(&text, &nlp) {
            Ok(analyzed) => println!(
                "  noun: {} | modifiers: {:?} | qualifier: {:?} | quantity: {}",
                analyzed.main_noun(),
                analyzed.modifiers(),
                analyzed.qualifier(),
                analyzed.quantity()
            ),
            Err(err) => println!("  not analyzable: {err}"),
        }
    }

    Ok(())
}
