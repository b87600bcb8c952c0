//! Background loop that rescans the package database on a fixed interval.

use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::run_cycle;
use crate::metrics::MetricRegistry;
use crate::runtime::Runtime;

pub struct Scheduler<R: Runtime + 'static> {
    runtime: Arc<R>,
    root: PathBuf,
    interval: Duration,
    registry: Arc<MetricRegistry>,
}

impl<R: Runtime + 'static> Scheduler<R> {
    /// `interval` must be non-zero; [`crate::config::Config`] guarantees it.
    pub fn new(
        runtime: Arc<R>,
        root: PathBuf,
        interval: Duration,
        registry: Arc<MetricRegistry>,
    ) -> Self {
        Self {
            runtime,
            root,
            interval,
            registry,
        }
    }

    /// Run the loop on its own task.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Scan immediately, then once per interval until `cancel` fires.
    ///
    /// Cancellation is only observed between scans; a scan in progress always
    /// finishes and publishes. A scan that overruns the interval is followed
    /// directly by the next one, without replaying the missed ticks.
    pub async fn run(self, cancel: CancellationToken) {
        let mut tick = tokio::time::interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycles: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Package scan stopped after {} cycles", cycles);
                    return;
                }
                _ = tick.tick() => {}
            }

            // Directory walking is blocking I/O, keep it off the async workers
            let runtime = Arc::clone(&self.runtime);
            let root = self.root.clone();
            let registry = Arc::clone(&self.registry);
            let result =
                tokio::task::spawn_blocking(move || run_cycle(runtime.as_ref(), &root, &registry))
                    .await;

            cycles += 1;
            match result {
                Ok(Some(outcome)) if cycles == 1 => info!(
                    "First scan of {:?}: {} packages, {} skipped in {:?}",
                    self.root,
                    outcome.samples.len(),
                    outcome.skipped,
                    outcome.elapsed
                ),
                Ok(Some(outcome)) => debug!(
                    "Scan {} of {:?}: {} packages, {} skipped in {:?}",
                    cycles,
                    self.root,
                    outcome.samples.len(),
                    outcome.skipped,
                    outcome.elapsed
                ),
                Ok(None) => warn!("Scan {} of {:?} published nothing", cycles, self.root),
                Err(e) => error!("Scan {} of {:?} panicked: {}", cycles, self.root, e),
            }
        }
    }
}
