//! Slot-aware refresh of the cached price dataset

use super::source::PriceSource;
use super::types::{Endpoint, PriceDataset, Slot};
use crate::config::Config;
use crate::error::{Result, SpotovaError};
use crate::logging::{StructuredLogger, get_logger};
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Shared, atomically replaced dataset snapshot
pub type DatasetSnapshot = Option<Arc<PriceDataset>>;

/// Last slot in which a refresh was attempted
#[derive(Debug, Clone, Default)]
pub struct RefreshState {
    last_slot: Option<Slot>,
}

impl RefreshState {
    pub fn last_slot(&self) -> Option<Slot> {
        self.last_slot
    }

    pub fn is_current(&self, slot: Slot) -> bool {
        self.last_slot == Some(slot)
    }

    pub fn record(&mut self, slot: Slot) {
        self.last_slot = Some(slot);
    }

    pub fn clear(&mut self) {
        self.last_slot = None;
    }
}

/// Point-in-time view of the coordinator for the API
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoordinatorStatus {
    pub has_data: bool,
    pub source: Option<Endpoint>,
    pub last_slot: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
    pub fetch_attempts: u64,
    pub failed_refreshes: u64,
}

/// Result of a refresh that reached the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    Fetched,
    Failed,
}

/// What a refresh did, published to event subscribers
#[derive(Debug, Clone, Serialize)]
pub struct RefreshEvent {
    pub timestamp: DateTime<Utc>,
    pub slot: String,
    pub outcome: RefreshOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Owns the cached dataset and refreshes it from the price API
pub struct PriceCoordinator {
    source: Arc<dyn PriceSource>,
    quarter_hour_url: String,
    hourly_url: String,
    timeout: Duration,
    tz: Tz,
    state: RefreshState,
    dataset_tx: watch::Sender<DatasetSnapshot>,
    status_tx: watch::Sender<CoordinatorStatus>,
    events_tx: broadcast::Sender<String>,
    logger: StructuredLogger,
}

impl PriceCoordinator {
    pub fn new(source: Arc<dyn PriceSource>, config: &Config) -> Result<Self> {
        let (dataset_tx, _) = watch::channel(None);
        let (status_tx, _) = watch::channel(CoordinatorStatus::default());
        let (events_tx, _) = broadcast::channel(64);
        Ok(Self {
            source,
            quarter_hour_url: config.api.quarter_hour_url.clone(),
            hourly_url: config.api.hourly_url.clone(),
            timeout: Duration::from_secs(config.api.timeout_secs),
            tz: config.tz()?,
            state: RefreshState::default(),
            dataset_tx,
            status_tx,
            events_tx,
            logger: get_logger("coordinator"),
        })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Current local wall-clock time in the configured timezone
    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }

    pub fn dataset(&self) -> DatasetSnapshot {
        self.dataset_tx.borrow().clone()
    }

    pub fn status(&self) -> CoordinatorStatus {
        self.status_tx.borrow().clone()
    }

    pub fn refresh_state(&self) -> &RefreshState {
        &self.state
    }

    pub fn subscribe_dataset(&self) -> watch::Receiver<DatasetSnapshot> {
        self.dataset_tx.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<CoordinatorStatus> {
        self.status_tx.subscribe()
    }

    pub fn events_sender(&self) -> broadcast::Sender<String> {
        self.events_tx.clone()
    }

    /// Forget the last refreshed slot so the next refresh always fetches
    pub fn invalidate(&mut self) {
        self.state.clear();
    }

    /// Refresh using the current local time
    pub async fn refresh(&mut self) -> Result<Arc<PriceDataset>> {
        let now = self.local_now();
        self.refresh_at(now).await
    }

    /// Refresh as if the local time were `now`
    ///
    /// Within the slot of the previous refresh the cached dataset is returned
    /// without touching the network. A failed refresh leaves the cache as is.
    pub async fn refresh_at(&mut self, now: NaiveDateTime) -> Result<Arc<PriceDataset>> {
        let slot = Slot::containing(now);
        if self.state.is_current(slot)
            && let Some(cached) = self.dataset()
        {
            self.logger
                .trace(&format!("Slot {} already refreshed, serving cache", slot));
            return Ok(cached);
        }

        self.state.record(slot);
        self.status_tx
            .send_modify(|s| s.last_slot = Some(slot.to_string()));

        match self.fetch_with_fallback().await {
            Ok((dataset, endpoint)) => {
                let dataset = Arc::new(dataset);
                self.dataset_tx.send_replace(Some(dataset.clone()));
                self.status_tx.send_modify(|s| {
                    s.has_data = true;
                    s.source = Some(endpoint);
                    s.last_success = Some(Utc::now());
                    s.last_error = None;
                });
                self.logger.info(&format!(
                    "Prices refreshed from {} endpoint: {} today, {} tomorrow",
                    endpoint,
                    dataset.hours_today.len(),
                    dataset.hours_tomorrow.len()
                ));
                self.publish(slot, RefreshOutcome::Fetched, Some(endpoint), None);
                Ok(dataset)
            }
            Err(e) => {
                let message = e.to_string();
                self.status_tx.send_modify(|s| {
                    s.last_error = Some(message.clone());
                    s.last_error_at = Some(Utc::now());
                    s.failed_refreshes += 1;
                });
                self.logger.error(&format!(
                    "Price refresh failed, keeping cached data: {}",
                    message
                ));
                self.publish(slot, RefreshOutcome::Failed, None, Some(message));
                Err(e)
            }
        }
    }

    async fn fetch_with_fallback(&self) -> Result<(PriceDataset, Endpoint)> {
        let primary_err = match self.fetch_endpoint(Endpoint::QuarterHour).await {
            Ok(dataset) => return Ok((dataset, Endpoint::QuarterHour)),
            Err(e) => e,
        };
        // Anything but an unreachable or unusable endpoint is not worth a retry
        if !primary_err.is_fetch_failure() {
            return Err(primary_err);
        }
        self.logger.warn(&format!(
            "Quarter-hour endpoint failed, falling back to hourly: {}",
            primary_err
        ));

        match self.fetch_endpoint(Endpoint::Hourly).await {
            Ok(dataset) => Ok((dataset, Endpoint::Hourly)),
            Err(fallback_err) => Err(SpotovaError::update_failed(format!(
                "quarter-hour endpoint: {}; hourly endpoint: {}",
                primary_err, fallback_err
            ))),
        }
    }

    async fn fetch_endpoint(&self, endpoint: Endpoint) -> Result<PriceDataset> {
        let url = match endpoint {
            Endpoint::QuarterHour => self.quarter_hour_url.clone(),
            Endpoint::Hourly => self.hourly_url.clone(),
        };
        self.status_tx.send_modify(|s| s.fetch_attempts += 1);

        let payload = tokio::time::timeout(self.timeout, self.source.fetch(&url))
            .await
            .map_err(|_| {
                SpotovaError::timeout(format!(
                    "no answer from {} within {}s",
                    url,
                    self.timeout.as_secs()
                ))
            })??;
        PriceDataset::from_payload(payload)
    }

    fn publish(
        &self,
        slot: Slot,
        outcome: RefreshOutcome,
        source: Option<Endpoint>,
        error: Option<String>,
    ) {
        let event = RefreshEvent {
            timestamp: Utc::now(),
            slot: slot.to_string(),
            outcome,
            source,
            error,
        };
        if let Ok(payload) = serde_json::to_string(&event) {
            // No subscribers is fine
            let _ = self.events_tx.send(payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_state_tracks_slot() {
        let mut state = RefreshState::default();
        let at = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(7, 14, 0)
            .unwrap();
        let slot = Slot::containing(at);
        assert!(!state.is_current(slot));
        state.record(slot);
        assert!(state.is_current(slot));
        assert_eq!(state.last_slot(), Some(slot));
        state.clear();
        assert!(state.last_slot().is_none());
    }
}
