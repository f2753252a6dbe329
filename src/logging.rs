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

use std::any::Any;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, fmt::Layer, prelude::*, registry::Registry, EnvFilter};

/// Console logging for one-shot commands, on stderr so stdout stays clean
pub fn init_console_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aworawo=info"));

    // A subscriber may already be installed (tests); keep it
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize logging for the interactive chat with daily file rotation.
/// Nothing is written to the terminal so log lines don't interleave with answers.
pub fn init_chat_logging(debug_mode: bool) -> Result<PathBuf, anyhow::Error> {
    let log_dir = crate::storage::get_log_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "chat.log");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_mode {
            EnvFilter::new("info,aworawo=debug")
        } else {
            EnvFilter::new("warn,aworawo=info")
        }
    });

    // File layer with JSON formatting for structured logs
    let file_layer = Layer::new()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .json();

    Registry::default()
        .with(file_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install chat logger: {}", e))?;

    // Panics caught further down (e.g. in the PDF parser) would otherwise
    // print over the conversation
    std::panic::set_hook(Box::new(|panic| {
        error!(
            location = panic.location().map(|l| l.to_string()).unwrap_or_default(),
            "Panic: {}",
            panic_message(panic.payload())
        );
    }));

    info!(
        log_directory = %log_dir.display(),
        debug_mode = debug_mode,
        "Chat logging initialized"
    );

    Ok(log_dir)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_reads_common_payloads() {
        let literal = std::panic::catch_unwind(|| panic!("bad xref table")).unwrap_err();
        assert_eq!(panic_message(literal.as_ref()), "bad xref table");

        let formatted = std::panic::catch_unwind(|| panic!("object {} missing", 12)).unwrap_err();
        assert_eq!(panic_message(formatted.as_ref()), "object 12 missing");

        let other: Box<dyn Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
