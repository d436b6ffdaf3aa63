//! Ordered provider fallback with per-provider quota cooldowns.
//!
//! Each provider is either available or cooling down. A quota error flips it to cooling
//! down and records the time; the flag is cleared lazily on the next call once the cooldown
//! window has passed. Transient errors are retried inside a single call and never change
//! provider state.

use super::{build_provider, LlmError, LlmProvider};
use crate::config::{LlmSettings, ProviderSettings};
use crate::error::{KapittelError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Longest server-requested wait honoured between attempts.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Source of wall-clock time for cooldown bookkeeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Quota bookkeeping for one provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProviderState {
    pub quota_exceeded: bool,
    pub last_error_time: Option<DateTime<Utc>>,
}

/// Attempts per call and the base delay between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_delay,
        }
    }

    /// Delay before the next attempt after a failure on `attempt` (0-based).
    fn delay_after(&self, attempt: u32, error: &LlmError) -> Duration {
        match error {
            LlmError::RateLimited {
                retry_after: Some(wait),
                ..
            } => (*wait).min(MAX_RETRY_AFTER),
            LlmError::RateLimited { .. } => self.base_delay.saturating_mul(1 << attempt.min(16)),
            _ => self.base_delay,
        }
    }
}

/// A provider together with its retry policy and quota state.
pub struct ProviderSlot {
    provider: Arc<dyn LlmProvider>,
    policy: RetryPolicy,
    state: Mutex<ProviderState>,
}

impl ProviderSlot {
    pub fn new(provider: Arc<dyn LlmProvider>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            policy,
            state: Mutex::new(ProviderState::default()),
        }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub fn state(&self) -> ProviderState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Snapshot of one provider for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub model: String,
    pub configured: bool,
    pub quota_exceeded: bool,
    pub last_error_time: Option<DateTime<Utc>>,
}

/// Primary-then-fallback text generation.
pub struct LlmGateway {
    slots: Vec<ProviderSlot>,
    cooldown: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LlmGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmGateway")
            .field("slots", &self.slots.len())
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

impl LlmGateway {
    /// Create a gateway trying `primary` before `fallback`, with a 24 hour quota cooldown.
    pub fn new(primary: ProviderSlot, fallback: ProviderSlot) -> Self {
        Self {
            slots: vec![primary, fallback],
            cooldown: chrono::Duration::hours(24),
            clock: Arc::new(SystemClock),
        }
    }

    /// Build both providers from settings.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let base_delay = Duration::from_millis(settings.retry_delay_ms);
        let slot = |provider: &ProviderSettings| -> Result<ProviderSlot> {
            Ok(ProviderSlot::new(
                build_provider(provider)?,
                RetryPolicy::new(provider.max_retries, base_delay),
            ))
        };

        let cooldown = i64::try_from(settings.quota_reset_hours)
            .ok()
            .and_then(chrono::TimeDelta::try_hours)
            .ok_or_else(|| {
                KapittelError::Config(format!(
                    "llm.quota_reset_hours is too large: {}",
                    settings.quota_reset_hours
                ))
            })?;

        let gateway = Self::new(slot(&settings.primary)?, slot(&settings.fallback)?)
            .with_cooldown(cooldown);

        for s in &gateway.slots {
            if s.provider.is_configured() {
                info!("LLM provider {} ({}) ready", s.provider.name(), s.provider.model());
            } else {
                warn!("LLM provider {} has no API key configured", s.provider.name());
            }
        }

        Ok(gateway)
    }

    pub fn with_cooldown(mut self, cooldown: chrono::Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn slots(&self) -> &[ProviderSlot] {
        &self.slots
    }

    /// True if at least one provider has credentials.
    pub fn has_configured_provider(&self) -> bool {
        self.slots.iter().any(|s| s.provider.is_configured())
    }

    /// Generate text, trying each available provider in order.
    #[instrument(skip_all, fields(prompt_chars = prompt.len()))]
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        for slot in &self.slots {
            let name = slot.provider.name();

            if !slot.provider.is_configured() {
                debug!("Skipping {}: not configured", name);
                continue;
            }

            if !self.is_available(slot) {
                info!("Skipping {}: quota cooldown active", name);
                continue;
            }

            if let Some(text) = self.try_provider(slot, prompt).await {
                return Ok(text);
            }

            warn!("{} produced no result, moving on", name);
        }

        error!("All LLM providers failed");
        Err(KapittelError::AllProvidersFailed)
    }

    /// Current state of every provider.
    pub fn status(&self) -> Vec<ProviderStatus> {
        self.slots
            .iter()
            .map(|slot| {
                let state = slot.state();
                ProviderStatus {
                    name: slot.provider.name().to_string(),
                    model: slot.provider.model().to_string(),
                    configured: slot.provider.is_configured(),
                    quota_exceeded: state.quota_exceeded,
                    last_error_time: state.last_error_time,
                }
            })
            .collect()
    }

    /// Send one prompt to each provider directly, bypassing retries and quota state.
    pub async fn probe(
        &self,
        prompt: &str,
    ) -> Vec<(String, std::result::Result<String, LlmError>)> {
        let mut results = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let result = slot.provider.generate(prompt).await;
            results.push((slot.provider.name().to_string(), result));
        }
        results
    }

    /// Whether the provider may be called, clearing an expired quota flag first.
    fn is_available(&self, slot: &ProviderSlot) -> bool {
        let mut state = slot.lock();
        if !state.quota_exceeded {
            return true;
        }

        let expired = state
            .last_error_time
            .is_none_or(|at| self.clock.now() - at >= self.cooldown);
        if expired {
            info!("Quota cooldown over for {}, re-enabling", slot.provider.name());
            *state = ProviderState::default();
        }
        !state.quota_exceeded
    }

    fn mark_quota_exceeded(&self, slot: &ProviderSlot) {
        let mut state = slot.lock();
        state.quota_exceeded = true;
        state.last_error_time = Some(self.clock.now());
    }

    /// Run the provider's retry loop. `None` means no usable result.
    async fn try_provider(&self, slot: &ProviderSlot, prompt: &str) -> Option<String> {
        let name = slot.provider.name();
        let max_retries = slot.policy.max_retries;

        for attempt in 0..max_retries {
            debug!("{} attempt {}/{}", name, attempt + 1, max_retries);

            let error = match slot.provider.generate(prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!("Generated {} chars with {}", text.len(), name);
                    return Some(text);
                }
                Ok(_) => LlmError::InvalidResponse("empty output".to_string()),
                Err(e) => e,
            };

            match &error {
                LlmError::QuotaExceeded(_) => {
                    warn!("{} quota exceeded, cooling down: {}", name, error);
                    self.mark_quota_exceeded(slot);
                    return None;
                }
                LlmError::NotConfigured(_) => {
                    warn!("{} rejected credentials: {}", name, error);
                    return None;
                }
                LlmError::RateLimited { .. } => {
                    warn!("{} rate limited (attempt {}): {}", name, attempt + 1, error);
                }
                _ => {
                    warn!("{} error (attempt {}): {}", name, attempt + 1, error);
                }
            }

            if attempt + 1 < max_retries {
                let delay = slot.policy.delay_after(attempt, &error);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        None
    }
}
