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

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aworawo")]
#[command(version)]
#[command(about = "Academic advising assistant for the UD BS in Mathematics", long_about = None)]
pub struct Cli {
    /// Use this configuration file instead of the one in the storage directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Resolve a relative knowledge directory against this path (default: current directory)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive advising conversation
    Chat {
        /// Log debug output to the chat log file
        #[arg(long)]
        debug: bool,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Extract course identifiers from text or a transcript PDF
    Extract {
        /// Transcript PDF to read
        #[arg(short, long)]
        pdf: Option<PathBuf>,

        /// Text to scan (used when no PDF is given)
        text: Vec<String>,
    },

    /// Print the passages synthesized from the knowledge files
    Passages {
        /// Only show passages whose id starts with this prefix (e.g. "course:")
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show the context that would be retrieved for a question
    Context {
        /// The question to retrieve context for
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Show knowledge base statistics
    Stats,
}
