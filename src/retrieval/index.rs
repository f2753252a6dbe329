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

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Similarity;
use crate::embedding::Embedder;
use crate::error::RetrievalError;
use crate::knowledge::types::Fragment;

/// A fragment with its stored embedding
struct IndexEntry {
    fragment: Fragment,
    embedding: Vec<f32>,
}

/// A fragment returned from a similarity query
#[derive(Debug, Clone)]
pub struct ScoredFragment {
    pub fragment: Fragment,
    pub score: f32,
}

/// In-memory similarity index over the chunked knowledge base.
/// Immutable once built; queries only read.
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    embedder: Arc<dyn Embedder>,
    similarity: Similarity,
    dimension: usize,
}

impl VectorIndex {
    /// Embed every fragment in batches and store the vectors
    pub async fn build(
        fragments: Vec<Fragment>,
        embedder: Arc<dyn Embedder>,
        similarity: Similarity,
        batch_size: usize,
    ) -> Result<Self, RetrievalError> {
        let batch_size = batch_size.max(1);
        let mut entries = Vec::with_capacity(fragments.len());
        let mut dimension = 0;

        for batch in fragments.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|f| f.text.clone()).collect();
            let embeddings = embedder
                .embed_batch(texts)
                .await
                .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

            if embeddings.len() != batch.len() {
                return Err(RetrievalError::VectorCountMismatch {
                    expected: batch.len(),
                    got: embeddings.len(),
                });
            }

            for (fragment, embedding) in batch.iter().zip(embeddings) {
                if dimension == 0 {
                    dimension = embedding.len();
                } else if embedding.len() != dimension {
                    return Err(RetrievalError::DimensionMismatch {
                        expected: dimension,
                        got: embedding.len(),
                    });
                }
                entries.push(IndexEntry {
                    fragment: fragment.clone(),
                    embedding: prepare(embedding, similarity),
                });
            }
            debug!(embedded = entries.len(), total = fragments.len(), "Embedding batch done");
        }

        info!(fragments = entries.len(), dimension, "Vector index built");

        Ok(Self {
            entries,
            embedder,
            similarity,
            dimension,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// All indexed fragments in build order
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.entries.iter().map(|e| &e.fragment)
    }

    /// Top `k` fragments by similarity to `query`, best first.
    /// Ties keep build order. Asking for more than the index holds returns all.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredFragment>, RetrievalError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;
        if query_embedding.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                got: query_embedding.len(),
            });
        }
        let query_embedding = prepare(query_embedding, self.similarity);

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, dot(&entry.embedding, &query_embedding)))
            .collect();
        // sort_by is stable, equal scores stay in build order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| ScoredFragment {
                fragment: self.entries[idx].fragment.clone(),
                score,
            })
            .collect())
    }
}

/// Unit-normalize for cosine similarity so scoring reduces to a dot product
fn prepare(mut embedding: Vec<f32>, similarity: Similarity) -> Vec<f32> {
    if similarity == Similarity::Cosine {
        let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }
    }
    embedding
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::{FailingEmbedder, HashingEmbedder};
    use async_trait::async_trait;
    use std::sync::atomic::Ordering;

    fn fragment(id: &str, text: &str) -> Fragment {
        Fragment {
            passage_id: id.to_string(),
            ordinal: 0,
            text: text.to_string(),
        }
    }

    fn sample_fragments() -> Vec<Fragment> {
        vec![
            fragment("course:MATH241", "Analytic Geometry and Calculus A covers limits and derivatives."),
            fragment("course:MATH302", "Ordinary Differential Equations requires MATH242 and MATH349."),
            fragment("course:CISC108", "Introduction to Computer Science uses Python programming."),
            fragment("plan:year_1", "First year students take calculus and the first year seminar."),
        ]
    }

    async fn build(fragments: Vec<Fragment>) -> VectorIndex {
        VectorIndex::build(fragments, Arc::new(HashingEmbedder::default()), Similarity::Cosine, 2)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_build_embeds_in_batches() {
        let embedder = Arc::new(HashingEmbedder::default());
        let index = VectorIndex::build(sample_fragments(), embedder.clone(), Similarity::Cosine, 3)
            .await
            .unwrap();

        assert_eq!(index.len(), 4);
        assert_eq!(index.dimension(), crate::embedding::testing::DIMENSIONS);
        assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_search_ranks_most_similar_first() {
        let index = build(sample_fragments()).await;
        let results = index.search("Python programming in computer science", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].fragment.passage_id, "course:CISC108");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_k_larger_than_index_returns_everything() {
        let index = build(sample_fragments()).await;
        let results = index.search("calculus", 50).await.unwrap();
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn test_ties_keep_build_order() {
        let fragments = vec![
            fragment("a", "identical text"),
            fragment("b", "identical text"),
            fragment("c", "identical text"),
        ];
        let index = build(fragments).await;
        let ids: Vec<String> = index
            .search("identical text", 3)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.fragment.passage_id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let index = build(Vec::new()).await;
        assert!(index.is_empty());
        assert!(index.search("anything", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_is_reported() {
        let result = VectorIndex::build(
            sample_fragments(),
            Arc::new(FailingEmbedder),
            Similarity::Cosine,
            8,
        )
        .await;
        assert!(matches!(result, Err(RetrievalError::Embedding(_))));
    }

    struct ShortChangingEmbedder;

    #[async_trait]
    impl Embedder for ShortChangingEmbedder {
        async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(vec![1.0])
        }

        async fn embed_batch(&self, texts: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().skip(1).map(|_| vec![1.0]).collect())
        }
    }

    #[tokio::test]
    async fn test_vector_count_mismatch_is_rejected() {
        let result = VectorIndex::build(
            sample_fragments(),
            Arc::new(ShortChangingEmbedder),
            Similarity::Dot,
            4,
        )
        .await;
        assert!(matches!(
            result,
            Err(RetrievalError::VectorCountMismatch { expected: 4, got: 3 })
        ));
    }

    #[test]
    fn test_cosine_preparation_normalizes() {
        let prepared = prepare(vec![3.0, 4.0], Similarity::Cosine);
        assert!((prepared[0] - 0.6).abs() < 1e-6);
        assert!((prepared[1] - 0.8).abs() < 1e-6);
        assert_eq!(prepare(vec![3.0, 4.0], Similarity::Dot), vec![3.0, 4.0]);
        assert_eq!(prepare(vec![0.0, 0.0], Similarity::Cosine), vec![0.0, 0.0]);
    }
}
