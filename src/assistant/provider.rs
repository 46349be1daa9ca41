//! OpenAI-compatible chat completions client (OpenRouter or OpenAI)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::AssistantError;
use crate::config::{AssistantConfig, ProviderKind, ProviderSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Text of the first completion choice
    async fn complete(&self, request: ChatRequest) -> Result<String, AssistantError>;
}

pub struct OpenAiCompatibleProvider {
    client: Client,
    kind: ProviderKind,
    api_key: String,
    base_url: String,
    model: String,
    site_url: Option<String>,
    site_name: Option<String>,
    timeout: Duration,
}

impl OpenAiCompatibleProvider {
    pub fn new(settings: ProviderSettings, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            kind: settings.kind,
            api_key: settings.api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            site_url: None,
            site_name: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Provider for the configured key, if any
    pub fn from_config(cfg: &AssistantConfig) -> Option<Self> {
        cfg.provider().map(|settings| {
            let model = cfg.model_for(settings.kind).to_string();
            Self::new(settings, model)
                .with_site_url(cfg.site_url.clone())
                .with_site_name(cfg.site_name.clone())
                .with_timeout(cfg.request_timeout())
        })
    }

    /// Sent as `HTTP-Referer` for OpenRouter rankings
    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    /// Sent as `X-Title`
    pub fn with_site_name(mut self, name: impl Into<String>) -> Self {
        self.site_name = Some(name.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn parse_error(&self, status: u16, body: &str) -> AssistantError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());

        match status {
            401 | 403 => AssistantError::Authentication(message),
            402 => AssistantError::InsufficientCredits(message),
            429 => AssistantError::RateLimited(message),
            _ => AssistantError::Api { status, message },
        }
    }
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        match self.kind {
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::OpenAi => "openai",
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, AssistantError> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let mut req = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .timeout(self.timeout);
        if let Some(ref site_url) = self.site_url {
            req = req.header("HTTP-Referer", site_url);
        }
        if let Some(ref site_name) = self.site_name {
            req = req.header("X-Title", site_name);
        }

        let response = req.json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text));
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AssistantError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(
            ProviderSettings {
                kind: ProviderKind::OpenRouter,
                api_key: "sk-test".to_string(),
                base_url: format!("{}/api/v1/", server.uri()),
            },
            "openai/gpt-4o-mini",
        )
        .with_site_url("https://energysense-ai.com")
        .with_site_name("EnergySense AI")
    }

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![PromptMessage::system("be brief"), PromptMessage::user("hi")],
            max_tokens: 100,
            temperature: 0.3,
        }
    }

    #[tokio::test]
    async fn test_complete_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(bearer_token("sk-test"))
            .and(header("HTTP-Referer", "https://energysense-ai.com"))
            .and(header("X-Title", "EnergySense AI"))
            .and(body_partial_json(serde_json::json!({
                "model": "openai/gpt-4o-mini",
                "max_tokens": 100,
                "messages": [{"role": "system", "content": "be brief"}, {"role": "user", "content": "hi"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "gen-1",
                "choices": [{"message": {"role": "assistant", "content": "Hello!"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = provider(&server).complete(request()).await.unwrap();
        assert_eq!(reply, "Hello!");
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
                "error": {"message": "Insufficient credits", "code": 402}
            })))
            .mount(&server)
            .await;

        let err = provider(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, AssistantError::InsufficientCredits(ref m) if m == "Insufficient credits"));
    }

    #[tokio::test]
    async fn test_server_error_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = provider(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, AssistantError::Api { status: 503, ref message } if message == "upstream down"));
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, AssistantError::EmptyResponse));
    }

    #[test]
    fn test_from_config() {
        assert!(OpenAiCompatibleProvider::from_config(&AssistantConfig::default()).is_none());
        let cfg = AssistantConfig {
            openai_api_key: Some("sk-oa".to_string()),
            ..AssistantConfig::default()
        };
        let p = OpenAiCompatibleProvider::from_config(&cfg).unwrap();
        assert_eq!(p.name(), "openai");
        assert_eq!(p.model(), "gpt-4o-mini");
        assert_eq!(p.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_openai_key_sends_bare_model_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(bearer_token("sk-oa"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Hi from OpenAI"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = AssistantConfig {
            openai_api_key: Some("sk-oa".to_string()),
            openai_base_url: format!("{}/v1", server.uri()),
            ..AssistantConfig::default()
        };
        let p = OpenAiCompatibleProvider::from_config(&cfg).unwrap();
        assert_eq!(p.complete(request()).await.unwrap(), "Hi from OpenAI");

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
    }
}
