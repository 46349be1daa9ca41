//! Energy assistant backed by an OpenAI-compatible chat API, with a keyword
//! responder standing in whenever the API is unavailable.

pub mod context;
pub mod engine;
pub mod fallback;
pub mod prompts;
pub mod provider;

pub use context::HouseholdContext;
pub use engine::{
    extract_prediction, AssistantStatus, ChatReply, ConsumptionPrediction, EnergyAssistant,
    MonthPrediction, QUICK_SUGGESTIONS,
};
pub use fallback::FallbackResponder;
pub use provider::{ChatProvider, ChatRequest, OpenAiCompatibleProvider, PromptMessage, PromptRole};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("AI service not available")]
    NotConfigured,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("insufficient credits: {0}")]
    InsufficientCredits(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("provider error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("provider returned no content")]
    EmptyResponse,
    #[error("Could not parse prediction data")]
    UnparsablePrediction { raw: String },
    #[error("could not encode prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}
