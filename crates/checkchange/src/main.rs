use std::path::PathBuf;

use anyhow::Result;
use checkchange_lexicon::LoadMode;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use checkchange::{DEFAULT_LEXICON_DIR, LexiconPipeline, parse_order, reconcile};

#[derive(Parser)]
#[command(name = "checkchange")]
#[command(about = "Apply a natural-language change request to an order")]
struct Cli {
    /// Current order, items separated by commas
    order: String,

    /// Change request, e.g. "Make one of the pizzas small"
    request: String,

    /// Directory holding lexicon.tsv, vectors.txt and optional *.exc files
    #[arg(long, env = "CHECKCHANGE_LEXICON_DIR", default_value = DEFAULT_LEXICON_DIR)]
    lexicon_dir: PathBuf,

    /// How to read lexicon files: mmap or owned
    #[arg(long, env = "CHECKCHANGE_LOAD_MODE", default_value = "mmap")]
    load_mode: LoadMode,

    /// Print the new order as a JSON array
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let nlp = LexiconPipeline::load(&cli.lexicon_dir, cli.load_mode)?;
    let order = parse_order(&cli.order);
    let lines = reconcile(&order, &cli.request, &nlp)?;

    if cli.json {
        println!("{}", serde_json::to_string(&lines)?);
    } else {
        let quoted: Vec<String> = lines.iter().map(|line| format!("'{line}'")).collect();
        println!("New order: [{}]", quoted.join(", "));
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}
