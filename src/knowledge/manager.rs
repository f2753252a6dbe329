use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::config::KnowledgeConfig;
use crate::knowledge::chunker::Chunker;
use crate::knowledge::loader::load_knowledge_base;
use crate::knowledge::synthesizer::{fingerprint, synthesize};
use crate::knowledge::types::{Fragment, KnowledgeBase, Passage, PassageKind};

/// Counts describing a prepared corpus
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusStats {
    pub passages: usize,
    pub fragments: usize,
    /// Passage counts per kind, in first-seen order
    pub by_kind: Vec<(PassageKind, usize)>,
    pub average_fragment_chars: usize,
    pub fingerprint: String,
}

/// Passages and fragments derived from one load of the knowledge files
#[derive(Debug, Clone)]
pub struct KnowledgeCorpus {
    pub passages: Vec<Passage>,
    pub fragments: Vec<Fragment>,
    pub fingerprint: String,
}

impl KnowledgeCorpus {
    /// Load the knowledge files and run them through synthesis and chunking
    pub fn load(config: &KnowledgeConfig, base_dir: &Path) -> Result<Self> {
        let kb = load_knowledge_base(config, base_dir)?;
        Self::from_knowledge_base(&kb, config)
    }

    pub fn from_knowledge_base(kb: &KnowledgeBase, config: &KnowledgeConfig) -> Result<Self> {
        let passages = synthesize(kb)?;
        let chunker = Chunker::from_config(config)?;
        let fragments = chunker.chunk(&passages);
        let fingerprint = fingerprint(&passages);

        info!(
            passages = passages.len(),
            fragments = fragments.len(),
            fingerprint = %&fingerprint[..12],
            "Knowledge corpus prepared"
        );

        Ok(Self {
            passages,
            fragments,
            fingerprint,
        })
    }

    pub fn stats(&self) -> CorpusStats {
        let mut by_kind: Vec<(PassageKind, usize)> = Vec::new();
        for passage in &self.passages {
            match by_kind.iter_mut().find(|(kind, _)| *kind == passage.kind) {
                Some((_, count)) => *count += 1,
                None => by_kind.push((passage.kind, 1)),
            }
        }

        let total_chars: usize = self.fragments.iter().map(|f| f.text.chars().count()).sum();
        let average_fragment_chars = if self.fragments.is_empty() {
            0
        } else {
            total_chars / self.fragments.len()
        };

        CorpusStats {
            passages: self.passages.len(),
            fragments: self.fragments.len(),
            by_kind,
            average_fragment_chars,
            fingerprint: self.fingerprint.clone(),
        }
    }
}
