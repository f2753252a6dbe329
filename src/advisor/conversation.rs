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

use serde::{Deserialize, Serialize};

use crate::advisor::persona::augmented_question;
use crate::error::AdvisorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message sent to the chat model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A conversation turn is a chat message from the student or the advisor
pub type ConversationTurn = ChatMessage;

/// Whether the latest student message is the first one in the conversation
pub fn is_first_turn(turns: &[ConversationTurn]) -> bool {
    match turns.split_last() {
        Some((last, prior)) => last.role == Role::User && prior.is_empty(),
        None => false,
    }
}

/// The latest student question, which must close the conversation
pub fn latest_question(turns: &[ConversationTurn]) -> Result<&str, AdvisorError> {
    match turns.last() {
        None => Err(AdvisorError::EmptyConversation),
        Some(turn) if turn.role != Role::User => Err(AdvisorError::NotAwaitingAnswer),
        Some(turn) => Ok(&turn.content),
    }
}

/// Persona, then every prior turn in order, then the latest question wrapped with its context
pub fn build_prompt(
    persona: &str,
    turns: &[ConversationTurn],
    context: &str,
) -> Result<Vec<ChatMessage>, AdvisorError> {
    let question = latest_question(turns)?;
    let first_turn = is_first_turn(turns);

    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatMessage::system(persona));
    messages.extend(
        turns[..turns.len() - 1]
            .iter()
            .filter(|turn| turn.role != Role::System)
            .cloned(),
    );
    messages.push(ChatMessage::user(augmented_question(context, question, first_turn)));

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::persona::FIRST_TURN_MARKER;

    #[test]
    fn test_single_user_turn_is_first() {
        assert!(is_first_turn(&[ChatMessage::user("Hi")]));
    }

    #[test]
    fn test_answered_turn_is_not_first() {
        let turns = [ChatMessage::user("Hi"), ChatMessage::assistant("Hello!")];
        assert!(!is_first_turn(&turns));

        let turns = [
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello!"),
            ChatMessage::user("What about MATH302?"),
        ];
        assert!(!is_first_turn(&turns));
        assert!(!is_first_turn(&[]));
    }

    #[test]
    fn test_build_prompt_shape() {
        let turns = vec![
            ChatMessage::user("Do I need MATH241?"),
            ChatMessage::assistant("Yes, it is core."),
            ChatMessage::user("And MATH302?"),
        ];
        let messages = build_prompt("persona", &turns, "MATH302 needs MATH242.").unwrap();

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], ChatMessage::system("persona"));
        assert_eq!(messages[1], turns[0]);
        assert_eq!(messages[2], turns[1]);
        assert_eq!(messages[3].role, Role::User);
        assert!(messages[3].content.contains("MATH302 needs MATH242."));
        assert!(messages[3].content.ends_with(
            "If the context doesn't fully answer the question, say so and recommend they check with their advisor."
        ));
        assert!(messages[3].content.contains("And MATH302?"));
        assert!(!messages[3].content.contains(FIRST_TURN_MARKER));
    }

    #[test]
    fn test_first_prompt_carries_marker() {
        let messages = build_prompt("persona", &[ChatMessage::user("Hi")], "").unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.starts_with(FIRST_TURN_MARKER));
    }

    #[test]
    fn test_prompt_requires_pending_question() {
        assert!(matches!(
            build_prompt("p", &[], ""),
            Err(AdvisorError::EmptyConversation)
        ));
        assert!(matches!(
            build_prompt("p", &[ChatMessage::user("a"), ChatMessage::assistant("b")], ""),
            Err(AdvisorError::NotAwaitingAnswer)
        ));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("ok")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
    }
}
