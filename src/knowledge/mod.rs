pub mod chunker;
pub mod formatting;
pub mod loader;
pub mod manager;
pub mod synthesizer;
pub mod types;

pub use manager::{CorpusStats, KnowledgeCorpus};
