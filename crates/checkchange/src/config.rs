use std::path::PathBuf;

use checkchange_lexicon::LoadMode;
use clap::Parser;

pub const DEFAULT_LEXICON_DIR: &str = "lexicon";

/// Settings for `checkchange-server`, from flags with env-var fallbacks.
#[derive(Debug, Clone, Parser)]
#[command(name = "checkchange-server")]
#[command(about = "Serve order change requests over HTTP")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory holding lexicon.tsv, vectors.txt and optional *.exc files
    #[arg(long, env = "CHECKCHANGE_LEXICON_DIR", default_value = DEFAULT_LEXICON_DIR)]
    pub lexicon_dir: PathBuf,

    /// How to read lexicon files: mmap or owned
    #[arg(long, env = "CHECKCHANGE_LOAD_MODE", default_value = "mmap")]
    pub load_mode: LoadMode,

    /// Largest order accepted by /v1/reconcile
    #[arg(long, env = "MAX_ORDER_ITEMS", default_value_t = 200, value_parser = parse_max_items)]
    pub max_items: usize,
}

fn parse_max_items(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(err) => Err(err.to_string()),
    }
}
