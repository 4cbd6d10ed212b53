// ABOUTME: Periodic background tasks with cooperative shutdown
// ABOUTME: Interval loops driven by tokio::select! over a tick and a shutdown channel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// Handle to a periodic task spawned on the runtime
#[derive(Debug)]
pub struct BackgroundTask {
    name: &'static str,
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    /// Run `tick` every `period` until shutdown. The first run happens after one period.
    pub fn spawn_interval<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        tick().await;
                    }
                    _ = shutdown_rx.recv() => {
                        debug!(task = name, "Background task received shutdown signal");
                        break;
                    }
                }
            }
        });

        debug!(task = name, period_secs = period.as_secs_f64(), "Background task started");
        Self {
            name,
            shutdown_tx,
            handle,
        }
    }

    /// Task name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Signal the task to stop and wait for its current tick to finish
    pub async fn shutdown(self) {
        // Err means the task already exited
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.handle.await {
            warn!(task = self.name, error = %e, "Background task ended abnormally");
        }
    }
}
