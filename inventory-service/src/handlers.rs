use chrono::Utc;
use shared::{EventEnvelope, ReservationEvent};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info};

use crate::error::{ReserveError, StoreError};
use crate::models::IdempotencyMarker;
use crate::publisher::EventPublisher;
use crate::store::{Decrement, InventoryStore, MarkerWrite};

/// Non-error results of a reservation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reserved { remaining: i64 },
    /// The request id was already admitted; nothing was changed.
    Duplicate { request_id: String },
    Insufficient { sku: String },
}

#[derive(Debug, Clone)]
pub struct ReservationConfig {
    pub marker_ttl: chrono::Duration,
    pub store_timeout: Duration,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            marker_ttl: chrono::Duration::hours(24),
            store_timeout: Duration::from_millis(2000),
        }
    }
}

#[derive(Clone)]
pub struct ReservationHandler {
    store: Arc<dyn InventoryStore>,
    publisher: Arc<dyn EventPublisher>,
    config: ReservationConfig,
}

impl ReservationHandler {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        publisher: Arc<dyn EventPublisher>,
        config: ReservationConfig,
    ) -> Self {
        Self { store, publisher, config }
    }

    /// Reserves `qty` units of `sku` exactly once per `request_id`.
    ///
    /// The idempotency marker is written before stock is touched and is kept
    /// whatever the decrement decides, so a replayed `request_id` always
    /// reports `Duplicate`. Callers that want a fresh attempt need a new id.
    ///
    /// The store calls run on their own task, so dropping the returned future
    /// cannot leave a request admitted without its decrement.
    pub async fn reserve(
        &self,
        sku: &str,
        qty: i64,
        request_id: &str,
    ) -> Result<Outcome, ReserveError> {
        validate(sku, qty, request_id)?;

        let handler = self.clone();
        let sku = sku.to_string();
        let request_id = request_id.to_string();
        let task = tokio::spawn(async move {
            handler.run_reservation(&sku, qty, &request_id).await
        });

        task.await.map_err(|e| {
            error!("Reservation task failed: {}", e);
            ReserveError::StoreUnavailable {
                reason: format!("reservation task failed: {}", e),
            }
        })?
    }

    async fn run_reservation(
        &self,
        sku: &str,
        qty: i64,
        request_id: &str,
    ) -> Result<Outcome, ReserveError> {
        let marker = IdempotencyMarker::new(request_id, Utc::now(), self.config.marker_ttl);
        let admission = self.bounded(self.store.create_marker(&marker)).await.map_err(|e| {
            error!("Failed to admit request {}: {}", request_id, e);
            e
        })?;

        if admission == MarkerWrite::AlreadyExists {
            info!("Request {} already processed, skipping", request_id);
            return Ok(Outcome::Duplicate { request_id: request_id.to_string() });
        }

        let decrement = self.bounded(self.store.decrement_stock(sku, qty)).await.map_err(|e| {
            error!("Failed to decrement stock for {} (request {}): {}", sku, request_id, e);
            e
        })?;

        let remaining = match decrement {
            Decrement::Applied { remaining } => remaining,
            Decrement::ConditionFailed => {
                info!("Insufficient stock for {} (requested {}, request {})", sku, qty, request_id);
                return Ok(Outcome::Insufficient { sku: sku.to_string() });
            }
        };

        info!(
            "Reserved {} of {} for request {}, {} remaining",
            qty, sku, request_id, remaining
        );

        let event = EventEnvelope::inventory_reserved(ReservationEvent {
            sku: sku.to_string(),
            qty_reserved: qty,
            qty_remaining: remaining,
            request_id: request_id.to_string(),
        });
        if let Err(e) = self.publisher.publish(&event).await {
            error!("Failed to publish reservation event {}: {}", event.id, e);
        }

        Ok(Outcome::Reserved { remaining })
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.config.store_timeout)),
        }
    }
}

fn validate(sku: &str, qty: i64, request_id: &str) -> Result<(), ReserveError> {
    let reason = if sku.is_empty() {
        "sku must not be empty"
    } else if qty <= 0 {
        "qty must be a positive integer"
    } else if request_id.is_empty() {
        "request_id must not be empty"
    } else {
        return Ok(());
    };
    Err(ReserveError::InvalidRequest { reason: reason.to_string() })
}
