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


mod ask;
pub mod chat;
mod extract;
mod inspect;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::advisor::{create_advisor, SharedAdvisor};
use crate::cli::Commands;
use crate::config::Config;

/// Execute a CLI command
pub async fn execute(config: &Config, base_dir: &Path, command: Commands) -> Result<()> {
    match command {
        Commands::Chat { .. } => {
            let shared = SharedAdvisor::new();
            let advisor = shared
                .get_or_init(|| create_advisor(config, base_dir))
                .await?;
            chat::execute(Arc::clone(&advisor)).await
        }
        Commands::Ask { question } => ask::execute(config, base_dir, &question.join(" ")).await,
        Commands::Extract { pdf, text } => extract::execute(pdf.as_deref(), &text.join(" ")),
        Commands::Passages { filter } => inspect::passages(config, base_dir, filter.as_deref()),
        Commands::Context { question } => {
            inspect::context(config, base_dir, &question.join(" ")).await
        }
        Commands::Stats => inspect::stats(config, base_dir),
    }
}
