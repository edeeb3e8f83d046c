use pinhole_core::Shortener;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Spawns a background task that purges expired mappings every `interval`.
///
/// The first sweep runs one interval after the task starts. A failed sweep
/// is logged and the next tick runs as scheduled. The task exits when
/// `shutdown` turns `true` or its sender is dropped; a sweep already in
/// progress finishes first.
pub fn spawn_sweeper<S>(
    shortener: Arc<S>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    S: Shortener + ?Sized,
{
    // tokio intervals panic on a zero period.
    let interval = interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting expiration sweeper");

        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    match shortener.cleanup_expired().await {
                        Ok(0) => debug!("Sweep found no expired mappings"),
                        Ok(deleted) => info!(deleted, "Purged expired mappings"),
                        Err(e) => warn!(error = %e, "Expiration sweep failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Expiration sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ShortenerConfig, ShortenerService};
    use async_trait::async_trait;
    use jiff::SignedDuration;
    use pinhole_cache::NoopUrlCache;
    use pinhole_core::{
        Algorithm, ExpirationPolicy, ShortCode, ShortenParams, ShortenerError, StorageError,
        UrlMapping,
    };
    use pinhole_storage::InMemoryRepository;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Counts sweeps and fails the first one.
    #[derive(Default)]
    struct FlakyShortener {
        sweeps: AtomicU32,
    }

    #[async_trait]
    impl Shortener for FlakyShortener {
        async fn shorten(&self, _params: ShortenParams) -> Result<UrlMapping, ShortenerError> {
            unimplemented!()
        }

        async fn resolve(&self, _code: &ShortCode) -> Result<String, ShortenerError> {
            unimplemented!()
        }

        async fn list(&self) -> Result<Vec<UrlMapping>, ShortenerError> {
            unimplemented!()
        }

        async fn cleanup_expired(&self) -> Result<u64, ShortenerError> {
            if self.sweeps.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(StorageError::Unavailable("database is down".to_string()).into());
            }
            Ok(0)
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sweeper_purges_expired_mappings() {
        let service = Arc::new(ShortenerService::new(
            InMemoryRepository::new(),
            NoopUrlCache,
            ShortenerConfig::default(),
        ));
        service
            .shorten(ShortenParams {
                original_url: "https://example.com".to_string(),
                algorithm: Algorithm::Base62,
                owner_id: None,
                expiration: ExpirationPolicy::AfterDuration(SignedDuration::from_millis(50)),
            })
            .await
            .unwrap();

        let (tx, rx) = watch::channel(false);
        let handle = spawn_sweeper(Arc::clone(&service), Duration::from_millis(20), rx);

        awaitility::at_most(Duration::from_secs(5))
            .poll_interval(Duration::from_millis(20))
            .until_async(|| async { service.repository().is_empty() })
            .await;

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_sweep_does_not_stop_the_sweeper() {
        let shortener = Arc::new(FlakyShortener::default());
        let (tx, rx) = watch::channel(false);
        let handle = spawn_sweeper(Arc::clone(&shortener), Duration::from_millis(10), rx);

        awaitility::at_most(Duration::from_secs(5))
            .poll_interval(Duration::from_millis(10))
            .until_async(|| async { shortener.sweeps.load(Ordering::SeqCst) >= 3 })
            .await;

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn sweeper_stops_on_shutdown_signal() {
        let shortener = Arc::new(FlakyShortener::default());
        let (tx, rx) = watch::channel(false);
        let handle = spawn_sweeper(Arc::clone(&shortener), Duration::from_secs(3600), rx);

        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
        assert_eq!(shortener.sweeps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sweeper_stops_when_sender_is_dropped() {
        let shortener: Arc<dyn Shortener> = Arc::new(FlakyShortener::default());
        let (tx, rx) = watch::channel(false);
        let handle = spawn_sweeper(shortener, Duration::from_secs(3600), rx);

        drop(tx);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
