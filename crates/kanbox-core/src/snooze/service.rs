//! Background task that thaws frozen items when their snooze runs out.

use std::time::Duration;

use kanbox_api::MailApi;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::coordinator::{ActionOutcome, Coordinator};

/// Polls the timer registry and returns expired items to their columns.
#[derive(Debug, Clone)]
pub struct SnoozeService<A> {
    coordinator: Coordinator<A>,
    tick: Duration,
}

impl<A: MailApi + 'static> SnoozeService<A> {
    /// Creates a service checking for expiries every `tick`.
    #[must_use]
    pub const fn new(coordinator: Coordinator<A>, tick: Duration) -> Self {
        Self { coordinator, tick }
    }

    /// Thaws every item whose deadline has passed.
    ///
    /// Returns the number of items moved back. Failed thaws are reported
    /// by the coordinator and not retried.
    pub async fn run_once(&self) -> usize {
        let expired = self.coordinator.timers().take_expired(self.coordinator.now());
        let mut thawed = 0;
        for entry in expired {
            match self.coordinator.expire_snooze(&entry.email_id).await {
                Ok(ActionOutcome::Applied) => thawed += 1,
                Ok(ActionOutcome::NoOp) => {
                    debug!("{} already left Frozen", entry.email_id);
                }
                Err(e) => {
                    // Rollback re-arms the timer; one attempt per expiry.
                    self.coordinator.timers().cancel(&entry.email_id);
                    warn!("Failed to thaw {}: {}", entry.email_id, e);
                }
            }
        }
        thawed
    }

    /// Runs the service on the current tokio runtime until stopped.
    #[must_use = "dropping the handle stops the service"]
    pub fn spawn(self) -> SnoozeHandle {
        let (shutdown, mut stop) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!("Snooze service started, tick {:?}", self.tick);

            loop {
                tokio::select! {
                    _ = &mut stop => break,
                    _ = interval.tick() => {
                        let thawed = self.run_once().await;
                        if thawed > 0 {
                            info!("Thawed {} snoozed items", thawed);
                        }
                    }
                }
            }
            info!("Snooze service stopped");
        });
        SnoozeHandle { shutdown, task }
    }
}

/// Stops a spawned [`SnoozeService`].
#[derive(Debug)]
pub struct SnoozeHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SnoozeHandle {
    /// Signals the service and waits for it to finish its current tick.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            warn!("Snooze service ended abnormally: {}", e);
        }
    }

    /// Returns true if the service task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
