use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Plain variable names (as used in `.env` and `secrets.toml`) and the keys they set
const BARE_KEYS: [(&str, &str); 7] = [
    ("OPENROUTER_API_KEY", "assistant.openrouter_api_key"),
    ("OPENAI_API_KEY", "assistant.openai_api_key"),
    ("SITE_URL", "assistant.site_url"),
    ("SITE_NAME", "assistant.site_name"),
    ("AI_MODEL", "assistant.model"),
    ("MAX_TOKENS", "assistant.max_tokens"),
    ("TEMPERATURE", "assistant.temperature"),
];

fn bare_key(name: &str) -> Option<&'static str> {
    BARE_KEYS
        .iter()
        .find(|(bare, _)| bare.eq_ignore_ascii_case(name))
        .map(|(_, key)| *key)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub household: HouseholdConfig,
    pub simulation: SimulationConfig,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            request_timeout_secs: 30,
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HouseholdConfig {
    pub default_country: String,
    pub default_temperature_c: f64,
    pub chat_history_limit: usize,
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            default_country: "Nigeria".to_string(),
            default_temperature_c: 28.0,
            chat_history_limit: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_seconds: u64,
    pub window: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 2,
            window: 20,
        }
    }
}

impl SimulationConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_seconds.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenRouter,
    OpenAi,
}

/// Resolved connection settings for the chat provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: String,
    pub base_url: String,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub openrouter_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub site_url: String,
    pub site_name: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub request_timeout_secs: u64,
    pub openrouter_base_url: String,
    pub openai_base_url: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            openrouter_api_key: None,
            openai_api_key: None,
            site_url: "https://energysense-ai.com".to_string(),
            site_name: "EnergySense AI".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            request_timeout_secs: 60,
            openrouter_base_url: OPENROUTER_BASE_URL.to_string(),
            openai_base_url: OPENAI_BASE_URL.to_string(),
        }
    }
}

// Keys stay out of logs.
impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("openrouter_api_key", &self.openrouter_api_key.as_ref().map(|_| "***"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("site_url", &self.site_url)
            .field("site_name", &self.site_name)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl AssistantConfig {
    /// OpenRouter wins over OpenAI; blank keys count as missing.
    pub fn provider(&self) -> Option<ProviderSettings> {
        let present = |key: &Option<String>| {
            key.as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
        };

        if let Some(api_key) = present(&self.openrouter_api_key) {
            return Some(ProviderSettings {
                kind: ProviderKind::OpenRouter,
                api_key,
                base_url: self.openrouter_base_url.clone(),
            });
        }
        present(&self.openai_api_key).map(|api_key| ProviderSettings {
            kind: ProviderKind::OpenAi,
            api_key,
            base_url: self.openai_base_url.clone(),
        })
    }

    /// Model id in the form the provider accepts. OpenAI rejects the
    /// `openai/` vendor prefix that OpenRouter requires.
    pub fn model_for(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::OpenRouter => self.model.as_str(),
            ProviderKind::OpenAi => self.model.strip_prefix("openai/").unwrap_or(self.model.as_str()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config"))
    }

    /// Layers, lowest first: `default.toml`, `secrets.toml`, `ENERGYSENSE__*`
    /// variables, then the plain variables such as `OPENROUTER_API_KEY`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(dir.join("default.toml")));

        for (key, value) in read_secrets(&dir.join("secrets.toml"))? {
            if let Some(target) = bare_key(&key) {
                figment = figment.merge((target, value));
            }
        }

        let figment = figment
            .merge(Env::prefixed("ENERGYSENSE__").split("__"))
            .merge(Env::raw().filter_map(|name| bare_key(name.as_str()).map(Into::into)));

        figment.extract().context("invalid configuration")
    }
}

fn read_secrets(path: &Path) -> Result<BTreeMap<String, toml::Value>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
