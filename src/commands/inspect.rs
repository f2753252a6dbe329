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


use anyhow::Result;
use std::path::Path;

use crate::advisor::create_advisor;
use crate::config::Config;
use crate::knowledge::formatting::{format_context, format_passages, format_stats};
use crate::knowledge::KnowledgeCorpus;

/// Print synthesized passages, optionally only those whose id starts with `filter`
pub fn passages(config: &Config, base_dir: &Path, filter: Option<&str>) -> Result<()> {
    let corpus = KnowledgeCorpus::load(&config.knowledge, base_dir)?;
    let selected: Vec<_> = corpus
        .passages
        .into_iter()
        .filter(|p| filter.is_none_or(|prefix| p.id.starts_with(prefix)))
        .collect();

    print!("{}", format_passages(&selected));
    Ok(())
}

/// Print the context the advisor would retrieve for a question
pub async fn context(config: &Config, base_dir: &Path, question: &str) -> Result<()> {
    let advisor = create_advisor(config, base_dir).await?;
    let context = advisor.context_for(question).await;

    print!("{}", format_context(&context));
    Ok(())
}

pub fn stats(config: &Config, base_dir: &Path) -> Result<()> {
    let corpus = KnowledgeCorpus::load(&config.knowledge, base_dir)?;
    print!("{}", format_stats(&corpus.stats()));
    Ok(())
}
