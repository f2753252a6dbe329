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

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::resolve_knowledge_dir;

const DEFAULT_TEMPLATE: &str = include_str!("../config-templates/default.toml");

/// Location of the knowledge files and how passages are chunked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    pub directory: PathBuf,
    pub degrees_file: String,
    pub courses_file: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("knowledge_bank"),
            degrees_file: "degrees.json".to_string(),
            courses_file: "courses.json".to_string(),
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl KnowledgeConfig {
    /// `degrees.json` location, with a relative directory taken from `base_dir`
    pub fn degrees_path(&self, base_dir: &Path) -> PathBuf {
        resolve_knowledge_dir(&self.directory, base_dir).join(&self.degrees_file)
    }

    pub fn courses_path(&self, base_dir: &Path) -> PathBuf {
        resolve_knowledge_dir(&self.directory, base_dir).join(&self.courses_file)
    }
}

/// Embedding configuration for index builds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "fastembed:all-MiniLM-L6-v2".to_string(),
            batch_size: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Similarity {
    Cosine,
    Dot,
}

/// Where keyword matches are looked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordScope {
    /// Every fragment in the index
    Full,
    /// Only the fragments returned by a broad semantic probe
    SemanticPool,
}

/// Retrieval and context-assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub semantic_k: usize,
    pub max_fragments: usize,
    pub similarity: Similarity,
    pub keyword_scope: KeywordScope,
    pub pool_query: String,
    pub pool_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_k: 10,
            max_fragments: 15,
            similarity: Similarity::Cosine,
            keyword_scope: KeywordScope::Full,
            pool_query: "course prerequisites offered".to_string(),
            pool_k: 50,
        }
    }
}

/// Chat model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub base_url: String,
    pub name: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            name: "llama3.2".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

/// Main configuration for aworawo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

impl Config {
    /// Load configuration from config.toml file
    /// First tries the system config directory, falls back to the embedded template
    pub fn load() -> Result<Self> {
        let config_path = crate::storage::get_system_config_path()?;

        let config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Self::parse(DEFAULT_TEMPLATE).context("Embedded config template is invalid")?;

            if let Some(parent) = config_path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&config_path, DEFAULT_TEMPLATE)?;

            config
        };

        Ok(config)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.knowledge.chunk_size == 0 {
            anyhow::bail!("knowledge.chunk_size must be positive");
        }
        if self.knowledge.chunk_overlap >= self.knowledge.chunk_size {
            anyhow::bail!(
                "knowledge.chunk_overlap ({}) must be smaller than knowledge.chunk_size ({})",
                self.knowledge.chunk_overlap,
                self.knowledge.chunk_size
            );
        }
        if self.embedding.batch_size == 0 {
            anyhow::bail!("embedding.batch_size must be positive");
        }
        if self.retrieval.semantic_k == 0 || self.retrieval.max_fragments == 0 {
            anyhow::bail!("retrieval.semantic_k and retrieval.max_fragments must be positive");
        }
        if self.model.timeout_secs == 0 {
            anyhow::bail!("model.timeout_secs must be positive");
        }
        Ok(())
    }
}
