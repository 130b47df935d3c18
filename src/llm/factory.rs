use std::env;
use std::sync::Arc;

use super::client::{LlmClient, MockLlmClient};
use super::client_impl::OpenAiClient;
use crate::config::Config;
use crate::error::{Error, Result};

/// Create the LLM client for a run. API credentials come only from the
/// environment, never from the config file. `dry_run` swaps in the mock
/// client so the whole pipeline can be exercised offline.
pub fn create_client(config: &Config, dry_run: bool) -> Result<Arc<dyn LlmClient>> {
    if dry_run {
        return Ok(Arc::new(MockLlmClient::new()));
    }

    let api_key = env::var("OPENAI_API_KEY")
        .map_err(|_| Error::Config("OPENAI_API_KEY is not set".to_string()))?;

    let client = match env::var("OPENAI_API_BASE") {
        Ok(base) if !base.trim().is_empty() => {
            OpenAiClient::with_base_url(api_key, config.openai_model.clone(), base)?
        }
        _ => OpenAiClient::new(api_key, config.openai_model.clone())?,
    };

    Ok(Arc::new(client))
}
