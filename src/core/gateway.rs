use crate::error::{GatewayError, Result, SummarizeError};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// One request to the hosted model: an optional video reference, the
/// composed prompt and the JSON Schema constraining the response.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub video_uri: Option<String>,
    pub prompt: String,
    pub schema: Value,
    pub thinking_level: Option<String>,
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Sends a single request and returns the model's raw text.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError>;
}

/// Bounded exponential backoff with multiplicative jitter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_secs: f64,
    pub max_delay_secs: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base_delay_secs: 1.0,
            max_delay_secs: 20.0,
        }
    }
}

pub const JITTER_MIN: f64 = 0.7;
pub const JITTER_MAX: f64 = 1.3;

impl RetryPolicy {
    /// Un-jittered delay after the failed attempt `attempt` (0-based).
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exp = self.base_delay_secs * 2f64.powi(attempt.min(i32::MAX as u32) as i32);
        secs(exp.min(self.max_delay_secs))
    }

    pub fn jittered_delay<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let factor = rng.random_range(JITTER_MIN..=JITTER_MAX);
        secs(self.base_delay(attempt).as_secs_f64() * factor)
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

/// Calls `gateway` until it succeeds or `policy.max_attempts` calls failed,
/// sleeping between attempts. Exhaustion wraps the last error.
pub async fn generate_with_retry<G>(
    gateway: &G,
    request: &GenerateRequest,
    policy: &RetryPolicy,
) -> Result<String>
where
    G: ModelGateway + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        debug!("Calling model {} (attempt {})", request.model, attempt + 1);
        let err = match gateway.generate(request).await {
            Ok(text) => return Ok(text),
            Err(err) => err,
        };

        attempt += 1;
        if attempt >= max_attempts {
            return Err(SummarizeError::RetriesExhausted {
                attempts: attempt,
                source: err,
            });
        }

        let delay = policy.jittered_delay(attempt - 1, &mut rand::rng());
        warn!(
            "Model call failed (attempt {}/{}): {}; retrying in {:.2}s",
            attempt,
            max_attempts,
            err,
            delay.as_secs_f64()
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_delay_doubles_then_caps() {
        let policy = RetryPolicy::default();
        let delays: Vec<f64> = (0..7).map(|k| policy.base_delay(k).as_secs_f64()).collect();
        assert_eq!(delays, vec![1.0, 2.0, 4.0, 8.0, 16.0, 20.0, 20.0]);
        assert_eq!(policy.base_delay(200).as_secs_f64(), 20.0);
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let policy = RetryPolicy::default();
        let mut rng = rand::rng();
        for attempt in 0..6 {
            let base = policy.base_delay(attempt).as_secs_f64();
            for _ in 0..200 {
                let delay = policy.jittered_delay(attempt, &mut rng).as_secs_f64();
                assert!(delay >= base * JITTER_MIN - 1e-9 && delay <= base * JITTER_MAX + 1e-9);
            }
        }
    }
}
