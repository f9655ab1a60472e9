#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inventory_service::models::IdempotencyMarker;
use inventory_service::publisher::EventPublisher;
use inventory_service::store::{Decrement, MarkerWrite};
use inventory_service::{
    InventoryStore, MemoryStore, ReservationConfig, ReservationHandler, StoreError,
};
use shared::{EventEnvelope, ReservationEvent};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Keeps every published event for later inspection.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<EventEnvelope<ReservationEvent>>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<ReservationEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|envelope| envelope.detail.clone())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &EventEnvelope<ReservationEvent>) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _event: &EventEnvelope<ReservationEvent>) -> anyhow::Result<()> {
        anyhow::bail!("broker unreachable")
    }
}

/// Store whose calls never finish within any reasonable timeout.
pub struct StalledStore;

#[async_trait]
impl InventoryStore for StalledStore {
    async fn create_marker(&self, _marker: &IdempotencyMarker) -> Result<MarkerWrite, StoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(MarkerWrite::Created)
    }

    async fn decrement_stock(&self, _sku: &str, _qty: i64) -> Result<Decrement, StoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Decrement::ConditionFailed)
    }

    async fn purge_expired_markers(&self, _now: DateTime<Utc>) -> Result<u64, StoreError> {
        Ok(0)
    }
}

/// Admits every marker, then fails the decrement.
pub struct BrokenStockStore;

#[async_trait]
impl InventoryStore for BrokenStockStore {
    async fn create_marker(&self, _marker: &IdempotencyMarker) -> Result<MarkerWrite, StoreError> {
        Ok(MarkerWrite::Created)
    }

    async fn decrement_stock(&self, _sku: &str, _qty: i64) -> Result<Decrement, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn purge_expired_markers(&self, _now: DateTime<Utc>) -> Result<u64, StoreError> {
        Ok(0)
    }
}

/// Delegates to a [`MemoryStore`] but holds every decrement for `delay`.
pub struct SlowDecrementStore {
    inner: Arc<MemoryStore>,
    delay: Duration,
}

impl SlowDecrementStore {
    pub fn new(inner: Arc<MemoryStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl InventoryStore for SlowDecrementStore {
    async fn create_marker(&self, marker: &IdempotencyMarker) -> Result<MarkerWrite, StoreError> {
        self.inner.create_marker(marker).await
    }

    async fn decrement_stock(&self, sku: &str, qty: i64) -> Result<Decrement, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.decrement_stock(sku, qty).await
    }

    async fn purge_expired_markers(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.inner.purge_expired_markers(now).await
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub handler: ReservationHandler,
}

pub fn harness(stock: &[(&str, i64)]) -> Harness {
    let store = Arc::new(MemoryStore::with_stock(
        stock.iter().map(|(sku, qty)| (*sku, *qty)),
    ));
    let publisher = Arc::new(RecordingPublisher::default());
    let handler = ReservationHandler::new(
        store.clone(),
        publisher.clone(),
        ReservationConfig::default(),
    );
    Harness { store, publisher, handler }
}
