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
use clap::Parser;

use aworawo::cli::{Cli, Commands};
use aworawo::config::Config;
use aworawo::{commands, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // The chat REPL owns the terminal, so it logs to a file
    match &cli.command {
        Commands::Chat { debug } => {
            logging::init_chat_logging(*debug)?;
        }
        _ => logging::init_console_logging(),
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    if let Err(e) = commands::execute(&config, &base_dir, cli.command).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
