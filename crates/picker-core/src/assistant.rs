//! Client for the remote chat completion endpoint.
//!
//! One POST per turn carrying the whole conversation. No retry, no timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AssistantConfig;
use crate::types::ChatMessage;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Endpoint returned status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[async_trait]
pub trait Assistant: Send + Sync {
    /// Send the accumulated conversation. `Ok(None)` means the endpoint
    /// answered but carried no reply text.
    async fn send(&self, messages: &[ChatMessage]) -> Result<Option<String>, AssistantError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Default, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionResponse {
    fn into_reply(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.is_empty())
    }
}

/// [`Assistant`] backed by an HTTP endpoint speaking `{model, messages}` →
/// `{choices: [{message: {content}}]}`.
pub struct HttpAssistant {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl HttpAssistant {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(&config.endpoint, &config.model)
    }
}

#[async_trait]
impl Assistant for HttpAssistant {
    async fn send(&self, messages: &[ChatMessage]) -> Result<Option<String>, AssistantError> {
        debug!(
            "POST {} with {} messages (model {})",
            self.endpoint,
            messages.len(),
            self.model
        );
        let response = self
            .client
            .post(&self.endpoint)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: CompletionResponse = serde_json::from_slice(&body)?;
        Ok(parsed.into_reply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_local;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Option<Value>>>;

    /// Spawn a local endpoint that records the request body and answers with `reply`.
    async fn spawn_endpoint(status: StatusCode, reply: &'static str) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(None));
        let app = Router::new()
            .route(
                "/",
                post(
                    move |State(captured): State<Captured>, Json(body): Json<Value>| async move {
                        *captured.lock().unwrap() = Some(body);
                        (status, reply)
                    },
                ),
            )
            .with_state(captured.clone());

        (serve_local(app).await, captured)
    }

    #[test]
    fn test_reply_extraction() {
        let parsed: CompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "Use SPF daily."}}]
        }))
        .unwrap();
        assert_eq!(parsed.into_reply().as_deref(), Some("Use SPF daily."));

        let empty: CompletionResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": ""}}]})).unwrap();
        assert_eq!(empty.into_reply(), None);

        let no_choices: CompletionResponse = serde_json::from_value(json!({"error": "x"})).unwrap();
        assert_eq!(no_choices.into_reply(), None);
    }

    #[tokio::test]
    async fn test_send_posts_model_and_full_conversation() {
        let (url, captured) = spawn_endpoint(
            StatusCode::OK,
            r#"{"choices":[{"message":{"content":"Cleanse, then moisturize."}}]}"#,
        )
        .await;

        let assistant = HttpAssistant::new(url, "gpt-4o");
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("routine?")];
        let reply = assistant.send(&messages).await.unwrap();
        assert_eq!(reply.as_deref(), Some("Cleanse, then moisturize."));

        let body = captured.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "routine?");
    }

    #[tokio::test]
    async fn test_send_unparseable_body_is_error() {
        let (url, _) = spawn_endpoint(StatusCode::OK, "<html>oops</html>").await;
        let assistant = HttpAssistant::new(url, "gpt-4o");
        let err = assistant.send(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, AssistantError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_send_error_status_is_error() {
        let (url, _) = spawn_endpoint(StatusCode::BAD_GATEWAY, "{}").await;
        let assistant = HttpAssistant::new(url, "gpt-4o");
        let err = assistant.send(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, AssistantError::Status(502)));
    }

    #[tokio::test]
    async fn test_send_unreachable_endpoint_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let assistant = HttpAssistant::new(format!("http://{}/", addr), "gpt-4o");
        let err = assistant.send(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, AssistantError::Transport(_)));
    }
}
