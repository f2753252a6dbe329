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
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use aworawo::advisor::{Advisor, ChatMessage, ChatModel, Reply, Session};
use aworawo::config::Config;
use aworawo::embedding::Embedder;
use aworawo::error::{KnowledgeBaseError, ModelInvocationError};
use aworawo::knowledge::loader::load_knowledge_base;
use aworawo::knowledge::KnowledgeCorpus;
use aworawo::retrieval::FragmentSource;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn fixture_config() -> Config {
    let mut config = Config::default();
    config.knowledge.directory = fixtures();
    config
}

struct BagOfWords;

#[async_trait]
impl Embedder for BagOfWords {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vector = vec![0.0f32; 128];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let bucket = token
                .to_lowercase()
                .bytes()
                .fold(17u64, |acc, b| acc.wrapping_mul(131).wrapping_add(b as u64));
            vector[(bucket % 128) as usize] += 1.0;
        }
        Ok(vector)
    }

    async fn embed_batch(&self, texts: Vec<String>) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in &texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Echoes the final prompt message back, or fails when told to
#[derive(Default)]
struct EchoModel {
    fail: bool,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

#[async_trait]
impl ChatModel for EchoModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelInvocationError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        if self.fail {
            return Err(ModelInvocationError::Unreachable {
                endpoint: "http://localhost:11434/api/chat".to_string(),
                detail: "connection refused".to_string(),
            });
        }
        Ok(format!("echo: {}", messages.last().map(|m| m.content.len()).unwrap_or(0)))
    }

    fn describe(&self) -> String {
        "echo".to_string()
    }
}

async fn advisor(model: Arc<EchoModel>) -> Advisor {
    let config = fixture_config();
    let corpus = KnowledgeCorpus::load(&config.knowledge, Path::new("/")).unwrap();
    Advisor::from_corpus(&corpus, Arc::new(BagOfWords), model, &config)
        .await
        .unwrap()
}

#[test]
fn test_fixture_corpus_is_complete() {
    let config = fixture_config();
    let corpus = KnowledgeCorpus::load(&config.knowledge, Path::new("/")).unwrap();

    let ids: Vec<&str> = corpus.passages.iter().map(|p| p.id.as_str()).collect();
    for expected in [
        "program",
        "university:course:ENGL110",
        "college:writing",
        "major:core",
        "major:restricted_electives",
        "plan:freshman_fall",
        "course:MATH302",
        "chain:applied_track",
        "availability:MATH222",
        "availability:honors",
    ] {
        assert!(ids.contains(&expected), "missing passage {}", expected);
    }

    let math302 = corpus.passages.iter().find(|p| p.id == "course:MATH302").unwrap();
    assert!(math302.text.contains("Prerequisites for MATH302: MATH242, MATH349."));
    assert!(math302.text.contains("MATH302 is offered: Spring."));

    let math308 = corpus.passages.iter().find(|p| p.id == "course:MATH308").unwrap();
    assert!(math308.text.contains("does NOT count as a restricted elective"));

    assert!(corpus.fragments.iter().all(|f| f.text.chars().count() <= 500));
    assert_eq!(corpus.stats().fingerprint.len(), 64);
}

#[test]
fn test_loading_twice_gives_identical_corpus() {
    let config = fixture_config();
    let first = KnowledgeCorpus::load(&config.knowledge, Path::new("/")).unwrap();
    let second = KnowledgeCorpus::load(&config.knowledge, Path::new("/")).unwrap();

    assert_eq!(first.passages, second.passages);
    assert_eq!(first.fragments, second.fragments);
    assert_eq!(first.fingerprint, second.fingerprint);
}

#[test]
fn test_missing_knowledge_directory_names_the_file() {
    let mut config = fixture_config();
    config.knowledge.directory = fixtures().join("does-not-exist");

    match load_knowledge_base(&config.knowledge, Path::new("/")) {
        Err(KnowledgeBaseError::MissingFile { path }) => {
            assert!(path.ends_with("degrees.json"));
        }
        other => panic!("expected MissingFile, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_course_mention_puts_its_passage_first() {
    let advisor = advisor(Arc::new(EchoModel::default())).await;

    let context = advisor.context_for("What are the prerequisites for math 302?").await;

    assert_eq!(context.identifiers, vec!["MATH302"]);
    assert!(context.len() <= 15);
    assert_eq!(context.fragments[0].source, FragmentSource::Keyword);
    assert!(context
        .fragments
        .iter()
        .any(|f| f.passage_id == "course:MATH302" && f.source == FragmentSource::Keyword));

    let first_semantic = context
        .fragments
        .iter()
        .position(|f| f.source == FragmentSource::Semantic);
    let last_keyword = context
        .fragments
        .iter()
        .rposition(|f| f.source == FragmentSource::Keyword);
    if let (Some(first_semantic), Some(last_keyword)) = (first_semantic, last_keyword) {
        assert!(last_keyword < first_semantic);
    }
}

#[tokio::test]
async fn test_session_round_trip_and_failure() {
    let model = Arc::new(EchoModel::default());
    let advisor_ok = advisor(model.clone()).await;
    let mut session = Session::new();

    let reply = session.send(&advisor_ok, "Can I take MATH401 after MATH245?").await;
    assert!(matches!(reply, Reply::Answer(_)));
    assert_eq!(session.turns().len(), 2);
    assert_eq!(session.tracked().as_slice(), ["MATH401", "MATH245"]);

    let prompt = &model.prompts.lock().unwrap()[0];
    assert!(prompt[0].content.starts_with("You are Aworawo"));
    assert!(prompt[1].content.contains("Prerequisites for MATH401: MATH243, MATH245."));

    let failing = advisor(Arc::new(EchoModel {
        fail: true,
        ..EchoModel::default()
    }))
    .await;
    let reply = session.send(&failing, "And MATH302?").await;
    match reply {
        Reply::Diagnostic(text) => assert!(text.contains("ollama serve")),
        other => panic!("expected a diagnostic, got {:?}", other),
    }
    assert_eq!(session.turns().len(), 3);
    assert_eq!(session.summary(), "3 messages | 3 courses tracked");
}
