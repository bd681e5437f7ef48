//! Bounded exponential backoff for calls to external services.
//!
//! [`RetryPolicy`] runs a single fallible async operation; [`Retrying`]
//! wraps a whole capability so every call through it gets the same policy.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    ports::{EmbeddingService, SearchCapability, Synthesizer},
    AggregatedContext, Embedding, Result, SearchResult, SynthesizedResponse,
};

/// Upper bound on any single backoff sleep.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier,
        }
    }

    /// Delay to wait after the failed attempt number `attempt` (0-based),
    /// capped at [`MAX_RETRY_DELAY`].
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = if self.multiplier.is_finite() {
            self.multiplier.max(1.0)
        } else {
            f64::MAX
        };
        let seconds = self.base_delay.as_secs_f64() * multiplier.powi(attempt as i32);
        Duration::try_from_secs_f64(seconds)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }

    /// Runs `op` until it succeeds, fails with a non-transient error, or
    /// the attempts are used up. The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt + 1 < max_attempts => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        operation,
                        attempt = attempt + 1,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Decorator applying a [`RetryPolicy`] to every call of the wrapped capability.
pub struct Retrying<T: ?Sized> {
    inner: Arc<T>,
    policy: RetryPolicy,
}

impl<T: ?Sized> Retrying<T> {
    pub fn new(inner: Arc<T>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<T: Synthesizer + ?Sized> Synthesizer for Retrying<T> {
    async fn generate_response(
        &self,
        question: &str,
        context: &AggregatedContext,
    ) -> Result<SynthesizedResponse> {
        self.policy
            .run("synthesis", || self.inner.generate_response(question, context))
            .await
    }
}

#[async_trait]
impl<T: SearchCapability + ?Sized> SearchCapability for Retrying<T> {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.policy
            .run("search", || self.inner.search(query, limit))
            .await
    }
}

#[async_trait]
impl<T: EmbeddingService + ?Sized> EmbeddingService for Retrying<T> {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.policy.run("embed", || self.inner.embed(text)).await
    }
}
