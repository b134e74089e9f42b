//! Background reclamation of abandoned sessions

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::registry::SessionRegistry;

/// Periodically drops sessions that never received an `end`
pub struct SessionSweeper;

impl SessionSweeper {
    /// Spawn the sweep loop on the current runtime.
    ///
    /// Returns `None` when the registry has no idle timeout configured.
    pub fn spawn(registry: Arc<SessionRegistry>) -> Option<JoinHandle<()>> {
        let timeout = registry.config().idle_timeout?;
        let period = registry.config().sweep_interval;

        tracing::info!(
            idle_timeout_secs = timeout.as_secs(),
            sweep_interval_secs = period.as_secs(),
            "Session sweeper started"
        );

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let expired = registry.sweep_idle(Instant::now()).await;
                for key in &expired {
                    tracing::warn!(session = %key, "Discarded idle session without end");
                }
                if !expired.is_empty() {
                    tracing::debug!(count = expired.len(), "Idle sweep complete");
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{RegistryConfig, SessionKey};
    use chrono::Utc;
    use std::time::Duration;

    #[tokio::test]
    async fn no_task_without_idle_timeout() {
        let registry = Arc::new(SessionRegistry::new(
            RegistryConfig::default().with_idle_timeout(None),
        ));
        assert!(SessionSweeper::spawn(registry).is_none());
    }

    #[tokio::test]
    async fn sweeper_reclaims_abandoned_session() {
        let config = RegistryConfig::default()
            .with_idle_timeout(Some(Duration::from_millis(30)))
            .with_sweep_interval(Duration::from_millis(10));
        let registry = Arc::new(SessionRegistry::new(config));
        let key = SessionKey::new("alice".into(), "sess_1");
        registry.create(key.clone(), "p", Utc::now()).await.unwrap();

        let task = SessionSweeper::spawn(Arc::clone(&registry)).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(registry.get(&key).await.is_none());
        task.abort();
    }
}
