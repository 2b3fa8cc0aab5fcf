//! Background polling and daily reset loops.
//!
//! Both loops are tokio tasks holding a [`Weak`] reference to the service, so
//! dropping the last [`Arc<UsageService>`] ends them at the next tick. A loop
//! is stopped by flipping its watch channel and awaiting the join handle;
//! once `stop_*` returns the loop has exited and cannot deliver again.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Datelike;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use super::service::{POLLING_RETRY_COUNT, UsageCallback, UsageService};
use crate::error::{CcduError, Result};

/// A spawned loop and its stop signal.
#[derive(Debug)]
pub struct BackgroundTask {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    fn spawn<F, Fut>(body: F) -> Self
    where
        F: FnOnce(watch::Receiver<bool>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(body(stop_rx));
        Self { stop_tx, handle }
    }

    /// Signal the loop and wait for it to exit.
    pub async fn stop(self) {
        // The receiver is gone if the loop already ended on its own.
        let _ = self.stop_tx.send(true);
        if let Err(err) = self.handle.await {
            if err.is_panic() {
                tracing::error!(error = %err, "background task panicked");
            }
        }
    }
}

fn ticker(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Resolves once the stop flag is set or every sender is gone.
async fn stopped(stop_rx: &mut watch::Receiver<bool>) {
    let _ = stop_rx.wait_for(|stop| *stop).await;
}

impl UsageService {
    // =========================================================================
    // Polling
    // =========================================================================

    /// Start the polling loop, replacing any running one.
    ///
    /// Every `interval_secs` the loop refreshes with retries and passes the
    /// resulting snapshot to `callback`, whether or not the refresh failed.
    /// The first refresh happens one interval after the call.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive interval; nothing is
    /// stopped or registered in that case.
    pub async fn start_polling(
        self: &Arc<Self>,
        interval_secs: i64,
        callback: UsageCallback,
    ) -> Result<()> {
        let period = u64::try_from(interval_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                CcduError::Validation(format!(
                    "polling interval must be positive, got {interval_secs}"
                ))
            })?;

        let mut slot = self.poller.lock().await;
        if let Some(previous) = slot.take() {
            previous.stop().await;
        }
        self.register_callback(callback);

        let service = Arc::downgrade(self);
        *slot = Some(BackgroundTask::spawn(move |stop_rx| {
            poll_loop(service, period, stop_rx)
        }));
        tracing::info!(interval_secs, "polling started");
        Ok(())
    }

    /// Stop the polling loop and drop its callback.
    ///
    /// Idempotent; a no-op if polling never started.
    pub async fn stop_polling(&self) {
        let task = self.poller.lock().await.take();
        if let Some(task) = task {
            task.stop().await;
            tracing::info!("polling stopped");
        }
        self.clear_callback();
    }

    // =========================================================================
    // Daily reset
    // =========================================================================

    /// Start watching for a calendar-day change, replacing any running monitor.
    ///
    /// On rollover the counters are reset and one refresh runs; its snapshot
    /// goes to the polling callback if one is registered.
    pub async fn start_daily_reset_monitor(self: &Arc<Self>) {
        let mut slot = self.reset_monitor.lock().await;
        if let Some(previous) = slot.take() {
            previous.stop().await;
        }

        let service = Arc::downgrade(self);
        let period = self.reset_check_interval();
        let start_day = self.clock().now().day();
        *slot = Some(BackgroundTask::spawn(move |stop_rx| {
            reset_loop(service, period, start_day, stop_rx)
        }));
        tracing::info!(check_secs = period.as_secs(), "daily reset monitor started");
    }

    /// Stop the reset monitor. Idempotent.
    pub async fn stop_daily_reset_monitor(&self) {
        let task = self.reset_monitor.lock().await.take();
        if let Some(task) = task {
            task.stop().await;
            tracing::info!("daily reset monitor stopped");
        }
    }

    /// Stop both background loops.
    pub async fn shutdown(&self) {
        self.stop_polling().await;
        self.stop_daily_reset_monitor().await;
    }
}

async fn poll_loop(
    service: Weak<UsageService>,
    period: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = ticker(period);

    loop {
        tokio::select! {
            biased;
            () = stopped(&mut stop_rx) => break,
            _ = ticker.tick() => {}
        }

        let Some(service) = service.upgrade() else {
            break;
        };

        // Dropping the refresh on stop kills any running child process.
        let outcome = tokio::select! {
            biased;
            () = stopped(&mut stop_rx) => break,
            outcome = service.refresh(POLLING_RETRY_COUNT) => outcome,
        };

        if let Some(err) = &outcome.error {
            tracing::warn!(error = %err, code = err.error_code(), "polling refresh failed");
        }
        if *stop_rx.borrow() {
            break;
        }
        service.deliver(outcome.state);
    }

    tracing::debug!("polling loop exited");
}

async fn reset_loop(
    service: Weak<UsageService>,
    period: Duration,
    mut last_day: u32,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = ticker(period);

    loop {
        tokio::select! {
            biased;
            () = stopped(&mut stop_rx) => break,
            _ = ticker.tick() => {}
        }

        let Some(service) = service.upgrade() else {
            break;
        };

        let today = service.clock().now().day();
        if today == last_day {
            continue;
        }

        tracing::info!(previous = last_day, today, "calendar day changed");
        if let Err(err) = service.reset_daily() {
            tracing::error!(error = %err, code = err.error_code(), "daily reset failed");
            last_day = today;
            continue;
        }

        let outcome = tokio::select! {
            biased;
            () = stopped(&mut stop_rx) => break,
            outcome = service.get_daily_usage() => outcome,
        };
        if let Some(err) = &outcome.error {
            tracing::warn!(error = %err, code = err.error_code(), "refresh after reset failed");
        }
        if *stop_rx.borrow() {
            break;
        }
        service.deliver(outcome.state);
        last_day = today;
    }

    tracing::debug!("daily reset loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::config::Config;
    use crate::core::models::UsageState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service() -> Arc<UsageService> {
        let config = Config {
            tool_path: "/nonexistent/ccusage".to_string(),
            ..Config::default()
        };
        Arc::new(
            UsageService::new(&config)
                .unwrap()
                .with_backoff_step(Duration::from_millis(1)),
        )
    }

    #[tokio::test]
    async fn stop_before_start_is_noop() {
        let service = service();
        service.stop_polling().await;
        service.stop_polling().await;
        service.stop_daily_reset_monitor().await;
        service.shutdown().await;
    }

    #[tokio::test]
    async fn non_positive_interval_is_rejected() {
        let service = service();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let callback: UsageCallback = Arc::new(move |_: UsageState| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        for interval in [0, -5] {
            let err = service
                .start_polling(interval, Arc::clone(&callback))
                .await
                .unwrap_err();
            assert!(matches!(err, CcduError::Validation(_)));
        }
        assert!(service.poller.lock().await.is_none());
        assert!(!service.deliver(service.snapshot()));
    }

    #[tokio::test]
    async fn restart_replaces_running_poller() {
        let service = service();
        let noop: UsageCallback = Arc::new(|_: UsageState| {});
        service.start_polling(60, Arc::clone(&noop)).await.unwrap();
        service.start_polling(60, noop).await.unwrap();
        assert!(service.poller.lock().await.is_some());
        service.shutdown().await;
        assert!(service.poller.lock().await.is_none());
    }
}
