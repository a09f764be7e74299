use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::app::ports::{CompletionPort, CompletionRequest};
use crate::config::OpenAiSettings;
use crate::error::{ClerkError, Result};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Deserialize)]
struct ChatContent {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u64,
}

/// Chat-completions client for the OpenAI HTTP API
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(settings: &OpenAiSettings) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl CompletionPort for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &request.profile.model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
            max_tokens: request.profile.max_tokens,
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("OpenAI API error {}: {}", status, text);
            return Err(ClerkError::Api { message: format!("OpenAI API error {}: {}", status, text) });
        }

        let parsed: ChatResponse = response.json().await?;
        if let Some(usage) = parsed.usage {
            debug!("{} used {} tokens", request.profile.model, usage.total_tokens);
        }
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClerkError::Api { message: "OpenAI response contained no choices".to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_system_and_user_roles() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage { role: "system", content: "instr" },
                ChatMessage { role: "user", content: "texto" },
            ],
            max_tokens: 8000,
            temperature: 0.0,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "texto");
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn response_without_usage_parses() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"a,b"}}]}"#).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("a,b"));
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let settings = OpenAiSettings {
            api_key: "sk-test".to_string(),
            base_url: "http://localhost:9999/v1/".to_string(),
            extraction_model: "m".to_string(),
            extraction_max_tokens: 1,
            summary_model: "s".to_string(),
            summary_max_tokens: 1,
        };
        assert_eq!(OpenAiClient::new(&settings).unwrap().endpoint, "http://localhost:9999/v1/chat/completions");
    }
}
