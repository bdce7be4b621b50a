//! LLM provider integration for nlpchat
//!
//! This crate provides the provider abstraction and the OpenRouter client
//! implementation.

pub mod base;
pub mod openrouter;

pub use base::{ChatReply, LlmProvider, Message, ProviderError, ProviderResult, TokenUsage};
pub use openrouter::OpenRouterClient;
