//! LLM transport for taskmind.
//!
//! One concrete `taskmind_core::Provider` implementation covers every
//! OpenAI-compatible endpoint, which is all the system needs. Circuit
//! breaking and deadlines are applied above this crate by the
//! orchestrator; the transport only speaks the wire protocol.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;
use taskmind_config::AppConfig;
use taskmind_core::Provider;

/// Build the configured provider.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Provider> {
    let api_key = config.provider.api_key.clone().unwrap_or_default();
    Arc::new(OpenAiCompatProvider::new(
        &config.provider.name,
        &config.provider.base_url,
        api_key,
    ))
}
