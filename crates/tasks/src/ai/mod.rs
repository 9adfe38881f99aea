//! AI integration for task extraction.
//!
//! This module provides:
//! - AI provider abstraction
//! - An OpenAI-compatible client (Groq by default)
//! - Prompt templates rendered with Handlebars

pub mod openai;
pub mod prompts;
pub mod provider;

// Re-exports
pub use openai::{OpenAIProvider, DEFAULT_MODEL, GROQ_API_KEY_ENV, GROQ_API_URL};
pub use prompts::PromptTemplate;
pub use provider::{AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions, TokenUsage};
