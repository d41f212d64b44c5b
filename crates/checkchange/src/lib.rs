pub mod analyzer;
pub mod config;
pub mod handlers;
pub mod numbers;
pub mod pipeline;
pub mod reconcile;

pub use analyzer::{AnalyzedSentence, CheckError, MAX_MODIFIERS};
pub use config::{DEFAULT_LEXICON_DIR, ServerConfig};
pub use handlers::{AppState, router};
pub use numbers::{NumberError, parse_number};
pub use pipeline::LexiconPipeline;
pub use reconcile::{OrderReconciler, Reconciliation, parse_order, reconcile};
