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
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::advisor::persona::QUICK_QUESTIONS;
use crate::advisor::{Advisor, Reply, Session, TranscriptOutcome};
use crate::knowledge::formatting::format_tracked_courses;
use crate::transcript::pdf_file_to_text;

const HELP: &str = "Commands:
  /new                 start a new conversation (forgets tracked courses)
  /courses             show tracked courses
  /clear-courses       forget tracked courses
  /transcript <pdf>    load completed courses from a transcript PDF
  /quick [n]           list quick questions, or ask question n
  /help                show this help
  /quit                leave
Anything else is sent to Aworawo.";

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReplCommand {
    Message(String),
    New,
    Courses,
    ClearCourses,
    Transcript(PathBuf),
    Quick(Option<usize>),
    Help,
    Quit,
    Invalid(String),
}

pub(crate) fn parse_line(line: &str) -> Option<ReplCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.starts_with('/') {
        return Some(ReplCommand::Message(trimmed.to_string()));
    }

    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (trimmed, ""),
    };

    let parsed = match command {
        "/new" => ReplCommand::New,
        "/courses" => ReplCommand::Courses,
        "/clear-courses" => ReplCommand::ClearCourses,
        "/help" => ReplCommand::Help,
        "/quit" | "/exit" => ReplCommand::Quit,
        "/transcript" if argument.is_empty() => {
            ReplCommand::Invalid("usage: /transcript <path-to-pdf>".to_string())
        }
        "/transcript" => ReplCommand::Transcript(PathBuf::from(argument)),
        "/quick" if argument.is_empty() => ReplCommand::Quick(None),
        "/quick" => match argument.parse::<usize>() {
            Ok(n) if (1..=QUICK_QUESTIONS.len()).contains(&n) => ReplCommand::Quick(Some(n)),
            _ => ReplCommand::Invalid(format!(
                "pick a quick question between 1 and {}",
                QUICK_QUESTIONS.len()
            )),
        },
        other => ReplCommand::Invalid(format!("unknown command {}, try /help", other)),
    };
    Some(parsed)
}

/// Interactive advising loop over line-oriented input
pub struct ChatRepl {
    advisor: Arc<Advisor>,
    session: Session,
}

impl ChatRepl {
    pub fn new(advisor: Arc<Advisor>) -> Self {
        Self {
            advisor,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run until `/quit` or end of input
    pub async fn run<R, W>(&mut self, reader: R, mut out: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            session_id = %self.session.id(),
            model = %self.advisor.model_name(),
            "Chat session started"
        );

        let mut reader = reader;
        let mut line = String::new();

        write(&mut out, &welcome()).await?;
        loop {
            write(&mut out, &format!("{} ", "you>".green().bold())).await?;

            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                debug!("EOF received, ending chat");
                break;
            }

            let Some(command) = parse_line(&line) else {
                continue;
            };
            if command == ReplCommand::Quit {
                break;
            }

            let output = self.handle(command).await;
            write(&mut out, &output).await?;
        }

        write(&mut out, "Goodbye! Good luck with your planning.\n").await?;
        info!(session_id = %self.session.id(), summary = %self.session.summary(), "Chat session ended");
        Ok(())
    }

    async fn handle(&mut self, command: ReplCommand) -> String {
        match command {
            ReplCommand::Message(message) => {
                let reply = self.session.send(&self.advisor, &message).await;
                self.render_reply(&reply)
            }
            ReplCommand::Quick(Some(n)) => {
                let question = QUICK_QUESTIONS[n - 1];
                let reply = self.session.send(&self.advisor, question).await;
                format!("{} {}\n{}", "you>".green().bold(), question, self.render_reply(&reply))
            }
            ReplCommand::Quick(None) => quick_question_list(),
            ReplCommand::New => {
                self.session.reset();
                "Started a new conversation.\n".to_string()
            }
            ReplCommand::Courses => format!("{}\n", format_tracked_courses(self.session.tracked())),
            ReplCommand::ClearCourses => {
                self.session.clear_courses();
                "Tracked courses cleared.\n".to_string()
            }
            ReplCommand::Transcript(path) => self.load_transcript(path).await,
            ReplCommand::Help => format!("{}\n", HELP),
            ReplCommand::Invalid(message) => format!("{}\n", message.red()),
            ReplCommand::Quit => String::new(),
        }
    }

    async fn load_transcript(&mut self, path: PathBuf) -> String {
        // PDF parsing is CPU-bound
        let text = match tokio::task::spawn_blocking(move || pdf_file_to_text(&path)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return format!("{}\n", e.to_string().red()),
            Err(e) => return format!("{}\n", format!("could not read PDF: {}", e).red()),
        };

        match self.session.load_transcript(&self.advisor, &text).await {
            TranscriptOutcome::Sent { courses, reply } => format!(
                "Found {} courses in your transcript: {}\n{}",
                courses.len(),
                courses.join(", "),
                self.render_reply(&reply)
            ),
            TranscriptOutcome::AlreadyAsked { courses } => format!(
                "Found {} courses in your transcript. You already asked about them, tracked courses updated.\n",
                courses.len()
            ),
            TranscriptOutcome::NoCourses => format!(
                "{}\n",
                "No course codes found. Try typing your courses instead.".yellow()
            ),
        }
    }

    fn render_reply(&self, reply: &Reply) -> String {
        let body = match reply {
            Reply::Answer(text) => text.normal(),
            Reply::Diagnostic(text) => text.red(),
        };
        format!(
            "{} {}\n{}\n",
            "aworawo>".blue().bold(),
            body,
            self.session.summary().bright_black()
        )
    }
}

fn welcome() -> String {
    format!(
        "{}\nAsk about degree requirements, prerequisites or course planning. Type /help for commands.\n\n{}",
        "Aworawo, your BS Mathematics advisor".bold(),
        quick_question_list()
    )
}

fn quick_question_list() -> String {
    let mut output = format!("{}\n", "Quick questions (/quick <n>):".bold());
    for (n, question) in QUICK_QUESTIONS.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", n + 1, question));
    }
    output
}

async fn write<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

/// Talk to the advisor on stdin/stdout
pub async fn execute(advisor: Arc<Advisor>) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    ChatRepl::new(advisor).run(stdin, stdout).await
}
