// lakeseed-core/src/application/retry.rs

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::domain::project::configuration::RetryConfig;
use crate::domain::semantic::{DeploymentPayload, QualifiedName};
use crate::error::LakeseedError;
use crate::ports::catalog_api::{CatalogApi, RemoteObject};

/// Capped exponential backoff for transient remote errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, LakeseedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LakeseedError>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt - 1);
                    warn!(
                        operation,
                        attempt,
                        error = %e,
                        "Transient error, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

/// Wraps any catalog client so every call goes through a [`RetryPolicy`].
pub struct RetryingCatalogApi<A> {
    inner: A,
    policy: RetryPolicy,
}

impl<A: CatalogApi> RetryingCatalogApi<A> {
    pub fn new(inner: A, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<A: CatalogApi> CatalogApi for RetryingCatalogApi<A> {
    async fn get_semantic_object(
        &self,
        name: &QualifiedName,
    ) -> Result<Option<RemoteObject>, LakeseedError> {
        self.policy
            .run("get", || self.inner.get_semantic_object(name))
            .await
    }

    async fn create_semantic_object(
        &self,
        payload: &DeploymentPayload,
    ) -> Result<RemoteObject, LakeseedError> {
        self.policy
            .run("create", || self.inner.create_semantic_object(payload))
            .await
    }

    async fn update_semantic_object(
        &self,
        existing: &RemoteObject,
        payload: &DeploymentPayload,
    ) -> Result<RemoteObject, LakeseedError> {
        self.policy
            .run("update", || {
                self.inner.update_semantic_object(existing, payload)
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::error::InfrastructureError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    fn unavailable() -> LakeseedError {
        LakeseedError::Infrastructure(InfrastructureError::Api {
            status: 503,
            body: "try later".into(),
        })
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = fast(10);
        assert_eq!(policy.delay_for(0), Duration::from_millis(1));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4));
        assert_eq!(policy.delay_for(30), Duration::from_millis(4));
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = fast(3)
            .run("get", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(unavailable())
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast(2)
            .run("get", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(unavailable())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast(5)
            .run("create", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(LakeseedError::Infrastructure(InfrastructureError::Api {
                    status: 400,
                    body: "bad request".into(),
                }))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
