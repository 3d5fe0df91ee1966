//! Poll loop owning the coordinator, and the handle other tasks talk to

use super::coordinator::{CoordinatorStatus, DatasetSnapshot, PriceCoordinator};
use crate::error::{Result, SpotovaError};
use crate::logging::{StructuredLogger, get_logger};
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Requests accepted by the poll loop
#[derive(Debug)]
pub enum CoordinatorCommand {
    /// Run a refresh now; `force` ignores the current-slot cache
    Refresh {
        force: bool,
        reply: oneshot::Sender<Result<CoordinatorStatus>>,
    },
}

/// Cloneable read/command access to a running coordinator
#[derive(Clone)]
pub struct CoordinatorHandle {
    dataset_rx: watch::Receiver<DatasetSnapshot>,
    status_rx: watch::Receiver<CoordinatorStatus>,
    events_tx: broadcast::Sender<String>,
    commands_tx: mpsc::Sender<CoordinatorCommand>,
    tz: Tz,
}

impl CoordinatorHandle {
    /// Latest successfully fetched dataset, if any
    pub fn dataset(&self) -> DatasetSnapshot {
        self.dataset_rx.borrow().clone()
    }

    pub fn status(&self) -> CoordinatorStatus {
        self.status_rx.borrow().clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<String> {
        self.events_tx.subscribe()
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn local_now(&self) -> NaiveDateTime {
        chrono::Utc::now().with_timezone(&self.tz).naive_local()
    }

    /// Ask the poll loop for a refresh and wait for its outcome
    pub async fn request_refresh(&self, force: bool) -> Result<CoordinatorStatus> {
        let (reply, rx) = oneshot::channel();
        self.commands_tx
            .send(CoordinatorCommand::Refresh { force, reply })
            .await
            .map_err(|_| SpotovaError::generic("Coordinator is not running"))?;
        rx.await
            .map_err(|_| SpotovaError::generic("Coordinator dropped the refresh request"))?
    }
}

/// Drives periodic refreshes and serialises them with on-demand requests
pub struct PriceService {
    coordinator: PriceCoordinator,
    commands_rx: mpsc::Receiver<CoordinatorCommand>,
    poll_interval: Duration,
    logger: StructuredLogger,
}

impl PriceService {
    /// Wrap a coordinator; returns the service and a handle to it
    pub fn new(coordinator: PriceCoordinator, poll_interval: Duration) -> (Self, CoordinatorHandle) {
        let (commands_tx, commands_rx) = mpsc::channel(16);
        let handle = CoordinatorHandle {
            dataset_rx: coordinator.subscribe_dataset(),
            status_rx: coordinator.subscribe_status(),
            events_tx: coordinator.events_sender(),
            commands_tx,
            tz: coordinator.timezone(),
        };
        let service = Self {
            coordinator,
            commands_rx,
            poll_interval,
            logger: get_logger("poller"),
        };
        (service, handle)
    }

    /// Run until `shutdown` flips to true or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        self.logger.info(&format!(
            "Starting price poll loop, interval {}s",
            self.poll_interval.as_secs()
        ));

        // The first tick fires immediately, giving the initial fetch
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Failures are recorded in the status; the next tick retries
                    let _ = self.coordinator.refresh().await;
                }
                Some(cmd) = self.commands_rx.recv() => {
                    self.handle_command(cmd).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.logger.info("Shutdown signal received");
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    async fn handle_command(&mut self, cmd: CoordinatorCommand) {
        match cmd {
            CoordinatorCommand::Refresh { force, reply } => {
                if force {
                    self.logger.info("Forced refresh requested");
                    self.coordinator.invalidate();
                }
                let outcome = self
                    .coordinator
                    .refresh()
                    .await
                    .map(|_| self.coordinator.status());
                if reply.send(outcome).is_err() {
                    self.logger.debug("Refresh requester went away");
                }
            }
        }
    }
}
