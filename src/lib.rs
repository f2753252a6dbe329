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

//! Aworawo: a retrieval-augmented academic advising assistant.
//!
//! Structured degree and course data is rendered into passages, chunked and
//! embedded into an in-memory index. Each student question is answered by a
//! local chat model given hybrid (course-code keyword plus semantic) context.

pub mod advisor;
pub mod cli;
pub mod commands;
pub mod config;
pub mod embedding;
pub mod error;
pub mod knowledge;
pub mod logging;
pub mod retrieval;
pub mod storage;
pub mod transcript;

pub use advisor::{create_advisor, get_response, Advisor, ConversationTurn, SharedAdvisor};
pub use transcript::{extract_identifiers, pdf_to_text};
