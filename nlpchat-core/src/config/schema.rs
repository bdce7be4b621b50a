//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for nlpchat
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat defaults
    pub chat: ChatConfig,
    /// OpenRouter provider configuration
    pub provider: ProviderConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chat defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model to use for chat completions
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens per response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// System prompt injected at the start of every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Directory for saved conversations
    #[serde(default = "default_sessions_dir")]
    pub sessions_dir: String,
}

fn default_model() -> String {
    "meta-llama/llama-3.3-70b-instruct:free".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_system_prompt() -> String {
    "You are an expert NLP (Natural Language Processing) assistant. You specialize in:\n\
     - Text analysis and understanding\n\
     - Language modeling and generation\n\
     - Sentiment analysis\n\
     - Named Entity Recognition (NER)\n\
     - Text classification\n\
     - Machine translation\n\
     - Question answering\n\
     - Text summarization\n\
     - Language understanding tasks\n\n\
     Provide helpful, accurate, and detailed responses related to NLP topics. \
     When appropriate, suggest practical approaches, tools, or code examples."
        .to_string()
}

fn default_sessions_dir() -> String {
    "~/.nlpchat/sessions".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            sessions_dir: default_sessions_dir(),
        }
    }
}

/// OpenRouter provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key, usually supplied via OPENROUTER_API_KEY
    #[serde(default)]
    pub api_key: String,
    /// API base URL override
    #[serde(default)]
    pub api_base: Option<String>,
    /// HTTP-Referer header sent with every request
    #[serde(default = "default_referer")]
    pub referer: String,
    /// X-Title header sent with every request
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_referer() -> String {
    "https://github.com/nlpchat/nlpchat".to_string()
}

fn default_title() -> String {
    "NLP Chatbot".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: None,
            referer: default_referer(),
            title: default_title(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}
