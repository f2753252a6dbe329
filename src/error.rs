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

//! Error types for the advising pipeline.
//!
//! Knowledge-base and model errors are surfaced to the caller with enough
//! detail to act on. Retrieval errors are absorbed by the context assembler,
//! and transcript extraction never fails.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to load or interpret the structured knowledge files.
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("knowledge file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("failed to read knowledge file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {} (line {line}, column {column}): {detail}", path.display())]
    InvalidJson {
        path: PathBuf,
        line: usize,
        column: usize,
        detail: String,
    },

    #[error("malformed record in {unit}: {problem}")]
    MalformedRecord { unit: String, problem: String },
}

impl KnowledgeBaseError {
    pub(crate) fn malformed(unit: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::MalformedRecord {
            unit: unit.into(),
            problem: problem.into(),
        }
    }
}

/// Failure while embedding fragments or querying the index.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("embedder returned {got} vectors for {expected} fragments")]
    VectorCountMismatch { expected: usize, got: usize },

    #[error("embedding dimension mismatch: index uses {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("invalid chunking parameters: max_size={max_size}, overlap={overlap}")]
    InvalidChunking { max_size: usize, overlap: usize },
}

/// Failure of the language-model call.
#[derive(Debug, Error)]
pub enum ModelInvocationError {
    #[error("could not reach the language model at {endpoint}: {detail}")]
    Unreachable { endpoint: String, detail: String },

    #[error("language model did not answer within {}s", timeout.as_secs())]
    Timeout { timeout: Duration },

    #[error("language model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("language model returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// Failure to turn an uploaded transcript into text.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("could not read PDF: {0}")]
    Unreadable(String),

    #[error("could not extract any text from this PDF, try typing your courses instead")]
    NoText,
}

/// Orchestrator-level failure of a single advising turn.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("conversation is empty")]
    EmptyConversation,

    #[error("the latest turn must come from the student")]
    NotAwaitingAnswer,

    #[error(transparent)]
    Model(#[from] ModelInvocationError),
}

impl AdvisorError {
    /// User-facing text for a failed turn. Never empty.
    pub fn diagnostic(&self) -> String {
        match self {
            AdvisorError::Model(ModelInvocationError::Unreachable { endpoint, .. }) => format!(
                "I'm having trouble right now. Make sure Ollama is running with 'ollama serve' \
                 and reachable at {}. Error: {}",
                endpoint, self
            ),
            AdvisorError::Model(ModelInvocationError::Timeout { .. }) => format!(
                "I'm having trouble right now. The language model took too long to answer; \
                 it may still be loading. Please try again. Error: {}",
                self
            ),
            AdvisorError::Model(_) => format!(
                "I'm having trouble right now. The language model backend returned an \
                 unexpected answer. Error: {}",
                self
            ),
            _ => format!("I couldn't process that message. Error: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_error_names_file() {
        let err = KnowledgeBaseError::MissingFile {
            path: PathBuf::from("/tmp/kb/degrees.json"),
        };
        assert!(err.to_string().contains("/tmp/kb/degrees.json"));
    }

    #[test]
    fn test_unreachable_diagnostic_mentions_backend() {
        let err = AdvisorError::from(ModelInvocationError::Unreachable {
            endpoint: "http://localhost:11434".to_string(),
            detail: "connection refused".to_string(),
        });
        let text = err.diagnostic();
        assert!(text.contains("ollama serve"));
        assert!(text.contains("http://localhost:11434"));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn test_every_diagnostic_is_non_empty() {
        let errors = vec![
            AdvisorError::EmptyConversation,
            AdvisorError::NotAwaitingAnswer,
            AdvisorError::from(ModelInvocationError::Timeout {
                timeout: Duration::from_secs(5),
            }),
            AdvisorError::from(ModelInvocationError::Status {
                status: 500,
                body: "boom".to_string(),
            }),
            AdvisorError::from(ModelInvocationError::MalformedResponse("eof".to_string())),
        ];
        for err in errors {
            assert!(!err.diagnostic().trim().is_empty());
        }
    }
}
