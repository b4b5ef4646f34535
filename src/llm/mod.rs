//! LLM integration for tabletalk.
//!
//! Provides the structured-output generation trait and implementations for
//! the supported LLM providers.

pub mod mock;
pub mod ollama;
pub mod openai;
pub mod responses;
pub mod types;

pub use mock::{FailingLlmClient, MockLlmClient};
pub use ollama::{OllamaClient, OllamaConfig};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use responses::{AnswerResponse, ResponseSchema, SqlGenerationResponse};
pub use types::{Message, Role};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::str::FromStr;

use crate::error::{Result, TabletalkError};

/// Trait for LLM clients that produce structured output.
///
/// Given a rendered prompt and a target schema with a fixed set of named
/// string fields, implementations return a JSON object conforming to that
/// schema or fail. Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a structured response for the given messages.
    ///
    /// The returned value is guaranteed by the provider (or checked by the
    /// adapter) to be a JSON object; field-level validation happens when the
    /// caller deserializes it.
    async fn generate(&self, messages: &[Message], schema: &ResponseSchema)
        -> Result<serde_json::Value>;
}

/// Generates a structured response and deserializes it into `T`.
///
/// A deserialization failure (missing or mistyped fields) is reported as an
/// LLM error, since it means the provider violated the requested schema.
pub async fn generate_structured<T: DeserializeOwned>(
    client: &dyn LlmClient,
    messages: &[Message],
    schema: &ResponseSchema,
) -> Result<T> {
    let value = client.generate(messages, schema).await?;
    serde_json::from_value(value).map_err(|e| {
        TabletalkError::llm(format!(
            "Response does not match the {} schema: {}",
            schema.name, e
        ))
    })
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// OpenAI (gpt-4o-mini, etc.)
    #[default]
    OpenAi,
    /// Local Ollama instance
    Ollama,
    /// Mock client for testing (no API key required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Creates an LLM client for the given provider and model.
pub fn create_client(provider: LlmProvider, model: &str) -> Result<Box<dyn LlmClient>> {
    match provider {
        LlmProvider::OpenAi => {
            let client = OpenAiClient::from_env(model)?;
            Ok(Box::new(client))
        }
        LlmProvider::Ollama => {
            let client = OllamaClient::new(OllamaConfig::new(model))?;
            Ok(Box::new(client))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}
