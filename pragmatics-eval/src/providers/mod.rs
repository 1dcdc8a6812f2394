//! LLM provider implementations used as the prediction oracle

pub mod anthropic;
pub mod openai;
pub mod traits;

pub use anthropic::AnthropicClient;
pub use openai::OpenAIClient;
pub use traits::{
    CompletionRequest, CompletionResponse, LLMProvider, Message, ProviderError, ProviderResult,
};

use crate::config::ProviderConfig;
use std::sync::Arc;

/// Build the configured provider, reading its API key from the environment
pub fn create_provider(config: &ProviderConfig) -> ProviderResult<Arc<dyn LLMProvider>> {
    match config.name.to_lowercase().as_str() {
        "openai" | "gpt" => {
            let mut client = match &config.api_key_env {
                Some(var) => OpenAIClient::from_env_var(var)?,
                None => OpenAIClient::from_env()?,
            }
            .with_model(&config.model);
            if let Some(url) = &config.base_url {
                client = client.with_base_url(url);
            }
            Ok(Arc::new(client))
        }
        "anthropic" | "claude" => {
            let mut client = match &config.api_key_env {
                Some(var) => AnthropicClient::from_env_var(var)?,
                None => AnthropicClient::from_env()?,
            }
            .with_model(&config.model);
            if let Some(url) = &config.base_url {
                client = client.with_base_url(url);
            }
            Ok(Arc::new(client))
        }
        _ => Err(ProviderError::Config(format!("Unknown provider: {}", config.name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider() {
        let config = ProviderConfig {
            name: "mystery".to_string(),
            ..Default::default()
        };
        assert!(matches!(create_provider(&config), Err(ProviderError::Config(_))));
    }

    #[test]
    fn test_missing_key() {
        let config = ProviderConfig {
            api_key_env: Some("PRAGMATICS_EVAL_TEST_UNSET_KEY".to_string()),
            ..Default::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(err.to_string().contains("PRAGMATICS_EVAL_TEST_UNSET_KEY"));
    }
}
