// Copyright 2026 Aworawo Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Hybrid context assembly.
//!
//! Fragments that literally mention a course named in the question come first,
//! followed by the nearest semantic matches. Duplicates (by exact text) keep
//! their first occurrence and the list is capped at `max_fragments`. When the
//! keyword matches alone fill the cap, no semantic fragment is included.

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::config::{KeywordScope, RetrievalConfig};
use crate::error::RetrievalError;
use crate::knowledge::types::Fragment;
use crate::retrieval::index::VectorIndex;
use crate::transcript::extract_identifiers;

/// How a context fragment was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentSource {
    Keyword,
    Semantic,
}

impl std::fmt::Display for FragmentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FragmentSource::Keyword => write!(f, "keyword"),
            FragmentSource::Semantic => write!(f, "semantic"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContextFragment {
    pub passage_id: String,
    pub text: String,
    pub source: FragmentSource,
    /// Similarity score, only for semantic matches
    pub score: Option<f32>,
}

/// The ordered fragments handed to the language model for one question
#[derive(Debug, Clone, Default)]
pub struct AssembledContext {
    /// Course identifiers found in the question
    pub identifiers: Vec<String>,
    pub fragments: Vec<ContextFragment>,
}

impl AssembledContext {
    /// Fragment texts joined by blank lines
    pub fn render(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

pub struct ContextAssembler {
    config: RetrievalConfig,
}

impl ContextAssembler {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    /// Assemble context for a question, surfacing retrieval failures
    pub async fn retrieve(
        &self,
        question: &str,
        index: &VectorIndex,
    ) -> Result<AssembledContext, RetrievalError> {
        let semantic = index.search(question, self.config.semantic_k).await?;

        let identifiers = extract_identifiers(question);
        let keyword = if identifiers.is_empty() {
            Vec::new()
        } else {
            self.keyword_matches(&identifiers, index).await?
        };

        debug!(
            identifiers = ?identifiers,
            keyword_hits = keyword.len(),
            semantic_hits = semantic.len(),
            "Retrieved candidate fragments"
        );

        let candidates = keyword
            .into_iter()
            .map(|fragment| ContextFragment {
                passage_id: fragment.passage_id,
                text: fragment.text,
                source: FragmentSource::Keyword,
                score: None,
            })
            .chain(semantic.into_iter().map(|scored| ContextFragment {
                passage_id: scored.fragment.passage_id,
                text: scored.fragment.text,
                source: FragmentSource::Semantic,
                score: Some(scored.score),
            }));

        let mut seen = HashSet::new();
        let fragments = candidates
            .filter(|candidate| seen.insert(candidate.text.clone()))
            .take(self.config.max_fragments)
            .collect();

        Ok(AssembledContext {
            identifiers,
            fragments,
        })
    }

    /// Assemble context for a question. Retrieval failures yield an empty context.
    pub async fn assemble(&self, question: &str, index: &VectorIndex) -> AssembledContext {
        match self.retrieve(question, index).await {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "Context retrieval failed, continuing without context");
                AssembledContext::default()
            }
        }
    }

    /// Fragments whose normalized text contains any of the identifiers
    async fn keyword_matches(
        &self,
        identifiers: &[String],
        index: &VectorIndex,
    ) -> Result<Vec<Fragment>, RetrievalError> {
        let pool: Vec<Fragment> = match self.config.keyword_scope {
            KeywordScope::Full => index.fragments().cloned().collect(),
            KeywordScope::SemanticPool => index
                .search(&self.config.pool_query, self.config.pool_k)
                .await?
                .into_iter()
                .map(|scored| scored.fragment)
                .collect(),
        };

        Ok(pool
            .into_iter()
            .filter(|fragment| mentions_any(&fragment.text, identifiers))
            .collect())
    }
}

/// Upper-case with all whitespace removed, so "Math 302" matches "MATH302"
pub(crate) fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

fn mentions_any(text: &str, identifiers: &[String]) -> bool {
    let normalized = normalize(text);
    identifiers.iter().any(|id| normalized.contains(id.as_str()))
}
