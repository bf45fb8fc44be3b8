use crate::core::error::ReadinessError;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Create a one-shot readiness pair
///
/// The component keeps the [`ReadySignal`] and publishes itself once mounted;
/// consumers hold a [`ReadyWatch`].
pub fn readiness<T: Clone>() -> (ReadySignal<T>, ReadyWatch<T>) {
    let (tx, rx) = watch::channel(None);
    (ReadySignal { tx }, ReadyWatch { rx })
}

pub struct ReadySignal<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T: Clone> ReadySignal<T> {
    /// Publish the ready component; later publishes replace earlier ones
    pub fn publish(&self, value: T) {
        self.tx.send_replace(Some(value));
    }
}

#[derive(Clone)]
pub struct ReadyWatch<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T: Clone> ReadyWatch<T> {
    /// The component if it is ready now
    pub fn try_get(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Wait for readiness, bounded by `timeout`
    pub async fn wait(&self, timeout: Duration) -> Result<T, ReadinessError> {
        let mut rx = self.rx.clone();
        let waited = tokio::time::timeout(timeout, async move {
            rx.wait_for(Option::is_some)
                .await
                .map(|value| (*value).clone())
                .map_err(|_| ReadinessError::Abandoned)
        })
        .await;

        match waited {
            Ok(Ok(Some(value))) => Ok(value),
            Ok(Ok(None)) | Ok(Err(_)) => Err(ReadinessError::Abandoned),
            Err(_) => Err(ReadinessError::TimedOut {
                waited_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Bounded poll: settle, then check up to `attempts` times
    pub async fn poll(
        &self,
        settle: Duration,
        attempts: u32,
        interval: Duration,
    ) -> Result<T, ReadinessError> {
        tokio::time::sleep(settle).await;

        for attempt in 1..=attempts {
            if let Some(value) = self.try_get() {
                debug!(attempt, "Component ready");
                return Ok(value);
            }
            if attempt < attempts {
                tokio::time::sleep(interval).await;
            }
        }

        let waited = settle + interval * attempts.saturating_sub(1);
        Err(ReadinessError::TimedOut {
            waited_ms: waited.as_millis() as u64,
        })
    }
}
