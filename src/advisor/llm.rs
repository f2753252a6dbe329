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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::advisor::conversation::ChatMessage;
use crate::config::ModelConfig;
use crate::error::ModelInvocationError;

/// Chat-completion backend: ordered role-tagged messages in, reply text out
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelInvocationError>;

    /// Human-readable backend name for status output
    fn describe(&self) -> String;
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Chat model served by a local Ollama instance
pub struct OllamaChatModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OllamaChatModel {
    pub fn new(config: &ModelConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("Aworawo/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", config.base_url.trim_end_matches('/')),
            model: config.name.clone(),
            temperature: config.temperature,
            timeout,
        })
    }

    async fn send(&self, body: Vec<u8>) -> Result<String, ModelInvocationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(ModelInvocationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    fn transport_error(&self, e: reqwest::Error) -> ModelInvocationError {
        if e.is_timeout() {
            ModelInvocationError::Timeout {
                timeout: self.timeout,
            }
        } else {
            ModelInvocationError::Unreachable {
                endpoint: self.endpoint.clone(),
                detail: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ChatModel for OllamaChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelInvocationError> {
        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| ModelInvocationError::MalformedResponse(format!("request encoding: {}", e)))?;

        debug!(model = %self.model, messages = messages.len(), "Calling chat model");

        let text = tokio::time::timeout(self.timeout, self.send(body))
            .await
            .map_err(|_| ModelInvocationError::Timeout {
                timeout: self.timeout,
            })??;

        parse_reply(&text)
    }

    fn describe(&self) -> String {
        format!("{} via {}", self.model, self.endpoint)
    }
}

/// Pull the assistant text out of an Ollama chat response body
fn parse_reply(body: &str) -> Result<String, ModelInvocationError> {
    let response: OllamaChatResponse = serde_json::from_str(body)
        .map_err(|e| ModelInvocationError::MalformedResponse(e.to_string()))?;

    if response.message.content.trim().is_empty() {
        return Err(ModelInvocationError::MalformedResponse(
            "empty reply content".to_string(),
        ));
    }

    Ok(response.message.content)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replies from a fixed script and records every prompt it receives
    #[derive(Default)]
    pub(crate) struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, String>>>,
        pub(crate) prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedModel {
        pub(crate) fn replying<I: IntoIterator<Item = &'static str>>(replies: I) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// Queue a failure for the next call
        pub(crate) fn then_fail(self, detail: &str) -> Self {
            self.replies.lock().unwrap().push_back(Err(detail.to_string()));
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelInvocationError> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(detail)) => Err(ModelInvocationError::Unreachable {
                    endpoint: "http://localhost:11434/api/chat".to_string(),
                    detail,
                }),
                None => Ok("(no scripted reply)".to_string()),
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply() {
        let body = r#"{"model":"llama3.2","message":{"role":"assistant","content":"Take MATH242."},"done":true}"#;
        assert_eq!(parse_reply(body).unwrap(), "Take MATH242.");
    }

    #[test]
    fn test_parse_reply_rejects_garbage_and_empty() {
        assert!(matches!(
            parse_reply("<html>502</html>"),
            Err(ModelInvocationError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"message":{"role":"assistant","content":"  "}}"#),
            Err(ModelInvocationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("persona"), ChatMessage::user("hi")];
        let request = OllamaChatRequest {
            model: "llama3.2",
            messages: &messages,
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama3.2");
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["options"]["temperature"], 0.0);
    }

    #[test]
    fn test_endpoint_from_config() {
        let config = ModelConfig {
            base_url: "http://127.0.0.1:11434/".to_string(),
            ..ModelConfig::default()
        };
        let model = OllamaChatModel::new(&config).unwrap();
        assert_eq!(model.describe(), "llama3.2 via http://127.0.0.1:11434/api/chat");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_reported() {
        // Port 9 (discard) is closed on test machines
        let config = ModelConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
            ..ModelConfig::default()
        };
        let model = OllamaChatModel::new(&config).unwrap();
        let err = model.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(
            err,
            ModelInvocationError::Unreachable { .. } | ModelInvocationError::Timeout { .. }
        ));
    }
}
