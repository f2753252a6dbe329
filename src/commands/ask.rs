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

use crate::advisor::{create_advisor, get_response, ChatMessage};
use crate::config::Config;

/// Answer one question without keeping a conversation
pub async fn execute(config: &Config, base_dir: &Path, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("Question cannot be empty");
    }

    let advisor = create_advisor(config, base_dir).await?;
    let answer = get_response(&advisor, &[ChatMessage::user(question)]).await;
    println!("{}", answer);

    Ok(())
}
