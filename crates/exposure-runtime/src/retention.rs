//! # Retention Task
//!
//! Background task that periodically deletes exposures older than the
//! retention window.
//!
//! Each tick computes `cutoff = now - retention` from the injected clock and
//! issues one `delete_exposures(cutoff)`. A failed pass is logged and retried
//! on the next tick. The task exits when its `CancellationToken` fires.

use std::sync::Arc;
use std::time::Duration;

use exposure_store::{ExposureApi, ExposureError, TimeSource};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Configuration for the retention task.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Maximum exposure age.
    pub retention: chrono::Duration,
    /// Interval between passes.
    pub cleanup_interval: Duration,
}

/// Handle to a running retention task.
pub struct RetentionTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RetentionTask {
    /// Token that stops the task when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the task and wait for it to finish its current pass.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "[retention] task ended abnormally");
        }
    }
}

/// Spawn the retention loop on the current tokio runtime.
///
/// The first pass runs immediately.
pub fn spawn_retention_task<A, T>(api: Arc<A>, clock: Arc<T>, config: RetentionConfig) -> RetentionTask
where
    A: ExposureApi + Send + Sync + 'static,
    T: TimeSource + ?Sized + 'static,
{
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();

    let handle = tokio::spawn(async move {
        run_retention_loop(api.as_ref(), clock.as_ref(), &config, task_cancel).await;
    });

    RetentionTask { cancel, handle }
}

async fn run_retention_loop<A, T>(api: &A, clock: &T, config: &RetentionConfig, cancel: CancellationToken)
where
    A: ExposureApi,
    T: TimeSource + ?Sized,
{
    let mut ticker = interval(config.cleanup_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        interval_secs = config.cleanup_interval.as_secs(),
        retention_hours = config.retention.num_hours(),
        "[retention] task started"
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("[retention] task shutting down");
                break;
            }
            _ = ticker.tick() => {
                match run_retention_pass(api, clock, config.retention) {
                    Ok(0) => debug!("[retention] no expired exposures"),
                    Ok(deleted) => info!(deleted, "[retention] pass completed"),
                    Err(e) => warn!(error = %e, "[retention] pass failed"),
                }
            }
        }
    }
}

/// Delete every exposure created before `clock.now() - retention`.
pub fn run_retention_pass<A, T>(
    api: &A,
    clock: &T,
    retention: chrono::Duration,
) -> Result<i64, ExposureError>
where
    A: ExposureApi,
    T: TimeSource + ?Sized,
{
    let cutoff = clock.now() - retention;
    api.delete_exposures(cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use exposure_store::{
        Exposure, ExposureService, ExposureStoreConfig, IterateCriteria, ScanContext,
    };
    use std::sync::Mutex;

    struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        fn at(ts: DateTime<Utc>) -> Self {
            Self(Mutex::new(ts))
        }

        fn advance(&self, by: chrono::Duration) {
            let mut now = self.0.lock().unwrap();
            *now = *now + by;
        }
    }

    impl TimeSource for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 5, d, 0, 0, 0).unwrap()
    }

    fn exposure(key: &str, created_at: DateTime<Utc>) -> Exposure {
        Exposure {
            exposure_key: key.as_bytes().to_vec(),
            regions: vec!["US".into()],
            created_at,
            ..Default::default()
        }
    }

    fn remaining_keys<A: ExposureApi>(api: &A) -> Vec<Vec<u8>> {
        let mut keys = Vec::new();
        api.iterate_exposures(&ScanContext::background(), &IterateCriteria::new(), |e| {
            keys.push(e.exposure_key);
            Ok(())
        })
        .unwrap();
        keys
    }

    fn seeded_service() -> Arc<ExposureService<exposure_store::InMemoryKVStore, exposure_store::BincodeExposureSerializer>> {
        let service = ExposureService::new_in_memory(ExposureStoreConfig::default());
        service
            .insert_exposures(vec![
                exposure("old", day(1)),
                exposure("mid", day(10)),
                exposure("new", day(20)),
            ])
            .unwrap();
        Arc::new(service)
    }

    #[test]
    fn test_pass_deletes_only_expired() {
        let service = seeded_service();
        let clock = FixedClock::at(day(16));

        let deleted = run_retention_pass(service.as_ref(), &clock, chrono::Duration::days(7)).unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(remaining_keys(service.as_ref()), vec![b"mid".to_vec(), b"new".to_vec()]);

        // Running again at the same instant is a no-op.
        assert_eq!(
            run_retention_pass(service.as_ref(), &clock, chrono::Duration::days(7)).unwrap(),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_runs_on_interval_and_stops_on_cancel() {
        let service = seeded_service();
        let clock = Arc::new(FixedClock::at(day(16)));
        let config = RetentionConfig {
            retention: chrono::Duration::days(7),
            cleanup_interval: Duration::from_secs(60),
        };

        let task = spawn_retention_task(Arc::clone(&service), Arc::clone(&clock), config);

        // First tick fires immediately.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(remaining_keys(service.as_ref()).len(), 2);

        // Nothing new expires until the clock moves and the next tick fires.
        clock.advance(chrono::Duration::days(2));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(remaining_keys(service.as_ref()), vec![b"new".to_vec()]);

        let token = task.cancellation_token();
        task.shutdown().await;
        assert!(token.is_cancelled());
    }
}
