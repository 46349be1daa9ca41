use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::context::HouseholdContext;
use super::fallback::FallbackResponder;
use super::prompts::{
    analysis_prompt, anomaly_prompt, optimization_prompt, prediction_prompt, ANALYSIS_SYSTEM,
    ANOMALY_SYSTEM, OPTIMIZATION_SYSTEM, PREDICTION_SYSTEM,
};
use super::provider::{ChatProvider, ChatRequest, OpenAiCompatibleProvider, PromptMessage};
use super::AssistantError;
use crate::config::AssistantConfig;

static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// (max tokens, temperature) per task
const PREDICTION_PARAMS: (u32, f64) = (1500, 0.3);
const OPTIMIZATION_PARAMS: (u32, f64) = (1500, 0.5);
const ANOMALY_PARAMS: (u32, f64) = (1000, 0.4);

pub const QUICK_SUGGESTIONS: [&str; 4] = [
    "How can I save energy?",
    "Predict my next bill",
    "Optimize my devices",
    "Analyze my consumption",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantStatus {
    pub online: bool,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub content: String,
    /// True when the reply came from the offline responder
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthPrediction {
    pub month: u32,
    pub energy_kwh: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionPrediction {
    pub predictions: Vec<MonthPrediction>,
}

/// Pulls the outermost `{...}` out of a model reply and parses it.
pub fn extract_prediction(reply: &str) -> Result<ConsumptionPrediction, AssistantError> {
    JSON_OBJECT
        .find(reply)
        .and_then(|m| serde_json::from_str(m.as_str()).ok())
        .ok_or_else(|| AssistantError::UnparsablePrediction {
            raw: reply.to_string(),
        })
}

pub struct EnergyAssistant {
    provider: Option<Arc<dyn ChatProvider>>,
    max_tokens: u32,
    temperature: f64,
    fallback: FallbackResponder,
}

impl EnergyAssistant {
    pub fn new(provider: Option<Arc<dyn ChatProvider>>, max_tokens: u32, temperature: f64) -> Self {
        Self {
            provider,
            max_tokens,
            temperature,
            fallback: FallbackResponder,
        }
    }

    pub fn offline() -> Self {
        let defaults = AssistantConfig::default();
        Self::new(None, defaults.max_tokens, defaults.temperature)
    }

    pub fn from_config(cfg: &AssistantConfig) -> Self {
        let provider = OpenAiCompatibleProvider::from_config(cfg)
            .map(|p| Arc::new(p) as Arc<dyn ChatProvider>);
        Self::new(provider, cfg.max_tokens, cfg.temperature)
    }

    pub fn is_online(&self) -> bool {
        self.provider.is_some()
    }

    pub fn status(&self) -> AssistantStatus {
        match &self.provider {
            Some(p) => AssistantStatus {
                online: true,
                provider: Some(p.name().to_string()),
                model: Some(p.model().to_string()),
                label: format!("AI Assistant: Online ({})", p.model()),
            },
            None => AssistantStatus {
                online: false,
                provider: None,
                model: None,
                label: "AI Assistant: Offline".to_string(),
            },
        }
    }

    fn provider(&self) -> Result<&Arc<dyn ChatProvider>, AssistantError> {
        self.provider.as_ref().ok_or(AssistantError::NotConfigured)
    }

    async fn ask(
        &self,
        system: &str,
        user: String,
        (max_tokens, temperature): (u32, f64),
    ) -> Result<String, AssistantError> {
        let provider = self.provider()?;
        let request = ChatRequest {
            messages: vec![PromptMessage::system(system), PromptMessage::user(user)],
            max_tokens,
            temperature,
        };
        provider.complete(request).await
    }

    /// Never fails: any provider problem degrades to the canned reply.
    pub async fn chat(&self, message: &str, ctx: &HouseholdContext) -> ChatReply {
        if !self.is_online() {
            debug!("assistant offline, answering from fallback");
            return ChatReply {
                content: self.fallback.respond(message, ctx),
                fallback: true,
            };
        }

        match self.comprehensive_analysis(ctx, Some(message)).await {
            Ok(content) => ChatReply {
                content,
                fallback: false,
            },
            Err(err) => {
                warn!(error = %err, "assistant request failed, using fallback reply");
                ChatReply {
                    content: self.fallback.respond(message, ctx),
                    fallback: true,
                }
            }
        }
    }

    pub async fn comprehensive_analysis(
        &self,
        ctx: &HouseholdContext,
        query: Option<&str>,
    ) -> Result<String, AssistantError> {
        self.ask(
            ANALYSIS_SYSTEM,
            analysis_prompt(ctx, query),
            (self.max_tokens, self.temperature),
        )
        .await
    }

    pub async fn predict_consumption(
        &self,
        ctx: &HouseholdContext,
        months: u32,
    ) -> Result<ConsumptionPrediction, AssistantError> {
        let reply = self
            .ask(PREDICTION_SYSTEM, prediction_prompt(ctx, months), PREDICTION_PARAMS)
            .await?;
        extract_prediction(&reply)
    }

    pub async fn optimize(
        &self,
        ctx: &HouseholdContext,
        target_reduction: f64,
    ) -> Result<String, AssistantError> {
        let prompt = optimization_prompt(ctx, target_reduction)?;
        self.ask(OPTIMIZATION_SYSTEM, prompt, OPTIMIZATION_PARAMS).await
    }

    pub async fn analyze_anomalies(
        &self,
        consumption_data: &serde_json::Value,
    ) -> Result<String, AssistantError> {
        let prompt = anomaly_prompt(consumption_data)?;
        self.ask(ANOMALY_SYSTEM, prompt, ANOMALY_PARAMS).await
    }
}
