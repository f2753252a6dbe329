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

use async_trait::async_trait;

// Re-export embedding functionality from octolib
pub use octolib::embedding::{
    parse_provider_model, provider::create_embedding_provider_from_parts,
    provider::EmbeddingProvider, types::InputType,
};

/// Text to fixed-length vector. The index only talks to this trait, so the
/// embedding backend can be swapped without touching retrieval.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    async fn embed_batch(&self, texts: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Embedder backed by an octolib provider (fastembed, huggingface, remote APIs)
pub struct ProviderEmbedder {
    provider: Box<dyn EmbeddingProvider>,
}

impl ProviderEmbedder {
    pub fn new(provider: Box<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Embedder for ProviderEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        generate_embedding(text, self.provider.as_ref()).await
    }

    async fn embed_batch(&self, texts: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>> {
        generate_embeddings_batch(texts, self.provider.as_ref()).await
    }
}

/// Create embedding provider from config
pub async fn create_embedding_provider(
    config: &crate::config::Config,
) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    let (provider, model) = parse_provider_model(&config.embedding.model)?;
    create_embedding_provider_from_parts(&provider, &model).await
}

/// Create the configured embedder
pub async fn create_embedder(config: &crate::config::Config) -> anyhow::Result<ProviderEmbedder> {
    let provider = create_embedding_provider(config).await?;
    Ok(ProviderEmbedder::new(provider))
}

/// Generate embeddings for a single text
pub async fn generate_embedding(
    text: &str,
    provider: &dyn EmbeddingProvider,
) -> anyhow::Result<Vec<f32>> {
    provider.generate_embedding(text).await
}

/// Generate embeddings for multiple texts using batch API
pub async fn generate_embeddings_batch(
    texts: Vec<String>,
    provider: &dyn EmbeddingProvider,
) -> anyhow::Result<Vec<Vec<f32>>> {
    provider
        .generate_embeddings_batch(texts, InputType::None)
        .await
}
