//! Scripted providers for tests.

use super::{LlmError, LlmGateway, LlmProvider, ProviderSlot, RetryPolicy};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

type Responder = dyn Fn(&str) -> Result<String, LlmError> + Send + Sync;

/// Provider answering every prompt through a closure.
pub struct ScriptedProvider {
    name: &'static str,
    responder: Box<Responder>,
}

impl ScriptedProvider {
    pub fn new(
        name: &'static str,
        responder: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            responder: Box::new(responder),
        })
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        (self.responder)(prompt)
    }
}

/// Gateway whose primary answers with `responder` and whose fallback always fails.
pub fn gateway_with(
    responder: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
) -> Arc<LlmGateway> {
    let policy = RetryPolicy::new(1, Duration::ZERO);
    let primary = ScriptedProvider::new("primary", responder);
    let fallback = ScriptedProvider::new("fallback", |_| {
        Err(LlmError::Request("fallback down".to_string()))
    });
    Arc::new(LlmGateway::new(
        ProviderSlot::new(primary, policy),
        ProviderSlot::new(fallback, policy),
    ))
}

/// Gateway where every provider fails.
pub fn failing_gateway() -> Arc<LlmGateway> {
    gateway_with(|_| Err(LlmError::Request("primary down".to_string())))
}
