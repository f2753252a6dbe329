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

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::advisor::conversation::{ChatMessage, ConversationTurn, Role};
use crate::advisor::persona::transcript_message;
use crate::advisor::Advisor;
use crate::transcript::{extract_identifiers, TrackedCourses};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No turns yet
    Empty,
    /// A student turn is waiting for the model
    AwaitingResponse,
    /// History present, nothing in flight
    Idle,
}

/// Result of one student message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The model answered; the answer is now part of the history
    Answer(String),
    /// The model call failed; nothing was added for the advisor
    Diagnostic(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Answer(text) | Reply::Diagnostic(text) => text,
        }
    }

    pub fn is_answer(&self) -> bool {
        matches!(self, Reply::Answer(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptOutcome {
    /// Courses were found and the follow-up question was sent
    Sent { courses: Vec<String>, reply: Reply },
    /// Courses were found, but the same follow-up question was already asked
    AlreadyAsked { courses: Vec<String> },
    /// The transcript text named no recognised course
    NoCourses,
}

/// One student's conversation with the advisor, processed strictly in order
pub struct Session {
    id: Uuid,
    turns: Vec<ConversationTurn>,
    tracked: TrackedCourses,
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
            tracked: TrackedCourses::new(),
            state: SessionState::Empty,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn tracked(&self) -> &TrackedCourses {
        &self.tracked
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Record a student message and ask the advisor about it.
    /// Course identifiers in the message join the tracked set.
    pub async fn send(&mut self, advisor: &Advisor, message: &str) -> Reply {
        let mentioned = extract_identifiers(message);
        let added = self.tracked.merge(mentioned);
        if added > 0 {
            debug!(session_id = %self.id, added, "Tracking courses from message");
        }

        self.turns.push(ChatMessage::user(message));
        self.state = SessionState::AwaitingResponse;

        let reply = match advisor.respond(&self.turns).await {
            Ok(answer) => {
                self.turns.push(ChatMessage::assistant(answer.clone()));
                Reply::Answer(answer)
            }
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Advisor did not answer");
                Reply::Diagnostic(e.diagnostic())
            }
        };
        self.state = SessionState::Idle;

        reply
    }

    /// Replace the tracked courses with those found in transcript text and ask
    /// what to take next, unless that exact question is already in the history
    pub async fn load_transcript(&mut self, advisor: &Advisor, text: &str) -> TranscriptOutcome {
        let courses = extract_identifiers(text);
        if courses.is_empty() {
            return TranscriptOutcome::NoCourses;
        }

        info!(session_id = %self.id, courses = courses.len(), "Transcript loaded");
        self.tracked.replace(courses.iter().cloned());

        let message = transcript_message(&courses);
        let already_asked = self
            .turns
            .iter()
            .any(|turn| turn.role == Role::User && turn.content == message);
        if already_asked {
            return TranscriptOutcome::AlreadyAsked { courses };
        }

        let reply = self.send(advisor, &message).await;
        TranscriptOutcome::Sent { courses, reply }
    }

    /// Start over: drop the history and the tracked courses
    pub fn reset(&mut self) {
        self.turns.clear();
        self.tracked.clear();
        self.state = SessionState::Empty;
        info!(session_id = %self.id, "Conversation reset");
    }

    pub fn clear_courses(&mut self) {
        self.tracked.clear();
    }

    /// Status line, e.g. "4 messages | 3 courses tracked"
    pub fn summary(&self) -> String {
        format!(
            "{} messages | {} courses tracked",
            self.turns.len(),
            self.tracked.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::llm::testing::ScriptedModel;
    use crate::advisor::persona::FIRST_TURN_MARKER;
    use crate::advisor::testing::advisor_with;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_successful_turn_appends_both_sides() {
        let advisor = advisor_with(Arc::new(ScriptedModel::replying(["Take MATH242 next."]))).await;
        let mut session = Session::new();
        assert_eq!(session.state(), SessionState::Empty);

        let reply = session.send(&advisor, "I finished math 241").await;

        assert_eq!(reply, Reply::Answer("Take MATH242 next.".to_string()));
        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.turns()[1], ChatMessage::assistant("Take MATH242 next."));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.tracked().as_slice(), ["MATH241"]);
    }

    #[tokio::test]
    async fn test_failed_turn_adds_no_assistant_turn() {
        let model = Arc::new(ScriptedModel::replying(["Welcome!"]).then_fail("connection refused"));
        let advisor = advisor_with(model).await;
        let mut session = Session::new();

        session.send(&advisor, "Hi").await;
        let before = session.turns().len();
        let reply = session.send(&advisor, "What about MATH302?").await;

        assert!(!reply.is_answer());
        assert!(!reply.text().is_empty());
        assert!(reply.text().contains("ollama serve"));
        assert_eq!(session.turns().len(), before + 1);
        assert_eq!(session.turns().last().map(|t| t.role), Some(Role::User));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_only_first_turn_is_marked() {
        let model = Arc::new(ScriptedModel::replying(["one", "two"]));
        let advisor = advisor_with(model.clone()).await;
        let mut session = Session::new();

        session.send(&advisor, "Hello").await;
        session.send(&advisor, "What next?").await;

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].last().unwrap().content.starts_with(FIRST_TURN_MARKER));
        assert!(!prompts[1].last().unwrap().content.contains(FIRST_TURN_MARKER));
        // persona, user, assistant, augmented question
        assert_eq!(prompts[1].len(), 4);
    }

    #[tokio::test]
    async fn test_transcript_sends_question_once() {
        let model = Arc::new(ScriptedModel::replying(["Try MATH302."]));
        let advisor = advisor_with(model.clone()).await;
        let mut session = Session::new();
        session.tracked.merge(["CISC108"]);

        let transcript = "Fall 2024 MATH 241 A\nSpring 2025 MATH 242 B+\n";
        let outcome = session.load_transcript(&advisor, transcript).await;
        match outcome {
            TranscriptOutcome::Sent { courses, reply } => {
                assert_eq!(courses, vec!["MATH241", "MATH242"]);
                assert!(reply.is_answer());
            }
            other => panic!("expected Sent, got {:?}", other),
        }
        assert_eq!(session.tracked().as_slice(), ["MATH241", "MATH242"]);
        assert_eq!(
            session.turns()[0].content,
            "I've completed these courses: MATH241, MATH242. What should I take next?"
        );

        let again = session.load_transcript(&advisor, transcript).await;
        assert!(matches!(again, TranscriptOutcome::AlreadyAsked { .. }));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_transcript_without_courses() {
        let advisor = advisor_with(Arc::new(ScriptedModel::default())).await;
        let mut session = Session::new();
        let outcome = session.load_transcript(&advisor, "Unofficial transcript\nGPA 3.5").await;
        assert_eq!(outcome, TranscriptOutcome::NoCourses);
        assert!(session.turns().is_empty());
    }

    #[tokio::test]
    async fn test_reset_and_clear_courses() {
        let advisor = advisor_with(Arc::new(ScriptedModel::replying(["ok"]))).await;
        let mut session = Session::new();
        session.send(&advisor, "I took MATH241 and CISC108").await;
        assert_eq!(session.summary(), "2 messages | 2 courses tracked");

        session.clear_courses();
        assert_eq!(session.summary(), "2 messages | 0 courses tracked");

        session.tracked.merge(["MATH242"]);
        session.reset();
        assert_eq!(session.summary(), "0 messages | 0 courses tracked");
        assert_eq!(session.state(), SessionState::Empty);
    }
}
