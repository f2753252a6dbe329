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

//! The advising pipeline: retrieved context plus conversation history in,
//! model reply out.

pub mod conversation;
pub mod llm;
pub mod persona;
pub mod session;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::{Config, RetrievalConfig};
use crate::embedding::{create_embedder, Embedder};
use crate::error::AdvisorError;
use crate::knowledge::manager::KnowledgeCorpus;
use crate::retrieval::{AssembledContext, ContextAssembler, VectorIndex};

pub use conversation::{ChatMessage, ConversationTurn, Role};
pub use llm::{ChatModel, OllamaChatModel};
pub use session::{Reply, Session, SessionState, TranscriptOutcome};

/// Everything needed to answer questions: the chat model, the built index
/// and the persona. Read-only once created and shared between sessions.
pub struct Advisor {
    model: Arc<dyn ChatModel>,
    index: Arc<VectorIndex>,
    assembler: ContextAssembler,
    persona: String,
}

impl Advisor {
    pub fn new(
        model: Arc<dyn ChatModel>,
        index: Arc<VectorIndex>,
        retrieval: RetrievalConfig,
        persona: String,
    ) -> Self {
        Self {
            model,
            index,
            assembler: ContextAssembler::new(retrieval),
            persona,
        }
    }

    /// Embed a prepared corpus and pair it with a chat model
    pub async fn from_corpus(
        corpus: &KnowledgeCorpus,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn ChatModel>,
        config: &Config,
    ) -> anyhow::Result<Self> {
        let index = VectorIndex::build(
            corpus.fragments.clone(),
            embedder,
            config.retrieval.similarity,
            config.embedding.batch_size,
        )
        .await?;

        info!(
            fragments = index.len(),
            fingerprint = %&corpus.fingerprint[..12],
            model = %model.describe(),
            "Advisor ready"
        );

        Ok(Self::new(
            model,
            Arc::new(index),
            config.retrieval.clone(),
            persona::system_prompt(),
        ))
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn model_name(&self) -> String {
        self.model.describe()
    }

    /// Context the model would see for this question
    pub async fn context_for(&self, question: &str) -> AssembledContext {
        self.assembler.assemble(question, &self.index).await
    }

    /// Answer the latest student turn. `turns` must end with a user message.
    pub async fn respond(&self, turns: &[ConversationTurn]) -> Result<String, AdvisorError> {
        let question = conversation::latest_question(turns)?;
        let context = self.context_for(question).await;
        let messages = conversation::build_prompt(&self.persona, turns, &context.render())?;

        let reply = self.model.complete(&messages).await?;
        Ok(reply)
    }

    /// Like [`Advisor::respond`], but failures become a diagnostic for the student
    pub async fn get_response(&self, turns: &[ConversationTurn]) -> String {
        match self.respond(turns).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Advising turn failed");
                e.diagnostic()
            }
        }
    }
}

/// Load the knowledge base, build the index and connect to the configured chat model
pub async fn create_advisor(config: &Config, base_dir: &Path) -> anyhow::Result<Advisor> {
    let corpus = KnowledgeCorpus::load(&config.knowledge, base_dir)?;
    let embedder: Arc<dyn Embedder> = Arc::new(create_embedder(config).await?);
    let model: Arc<dyn ChatModel> = Arc::new(OllamaChatModel::new(&config.model)?);

    Advisor::from_corpus(&corpus, embedder, model, config).await
}

/// Answer the latest turn of `conversation`, never failing: model errors come
/// back as a diagnostic message for the student
pub async fn get_response(advisor: &Advisor, conversation: &[ConversationTurn]) -> String {
    advisor.get_response(conversation).await
}

/// Builds the advisor once, however many sessions ask for it concurrently
#[derive(Default)]
pub struct SharedAdvisor {
    cell: OnceCell<Arc<Advisor>>,
}

impl SharedAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared advisor, running `init` if this is the first request.
    /// A failed init leaves the cell empty so a later call can retry.
    pub async fn get_or_init<F, Fut>(&self, init: F) -> anyhow::Result<Arc<Advisor>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Advisor>>,
    {
        let advisor = self
            .cell
            .get_or_try_init(|| async move { init().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(advisor))
    }

    pub fn get(&self) -> Option<Arc<Advisor>> {
        self.cell.get().cloned()
    }
}
