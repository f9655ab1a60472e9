use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::IdempotencyMarker;

/// Result of an atomic create-if-absent on an idempotency marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerWrite {
    Created,
    AlreadyExists,
}

/// Result of an atomic `qty >= n` guarded decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    Applied { remaining: i64 },
    ConditionFailed,
}

/// Key-indexed store holding stock records and idempotency markers.
///
/// Both write operations must be atomic with respect to concurrent callers:
/// at most one `create_marker` wins per request id, and concurrent
/// decrements against one SKU never drive `qty` below zero.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn create_marker(&self, marker: &IdempotencyMarker) -> Result<MarkerWrite, StoreError>;

    /// Decrements `sku` by `qty` only if at least `qty` is available. An
    /// unknown SKU fails the condition.
    async fn decrement_stock(&self, sku: &str, qty: i64) -> Result<Decrement, StoreError>;

    /// Deletes markers whose expiry is before `now`, returning how many went.
    async fn purge_expired_markers(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// In-process store; every operation runs under a single lock acquisition.
#[derive(Debug, Default)]
pub struct MemoryStore {
    stock: Mutex<HashMap<String, i64>>,
    markers: Mutex<HashMap<String, IdempotencyMarker>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stock<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let stock = items.into_iter().map(|(sku, qty)| (sku.into(), qty)).collect();
        Self {
            stock: Mutex::new(stock),
            markers: Mutex::new(HashMap::new()),
        }
    }

    pub fn stock_level(&self, sku: &str) -> Option<i64> {
        self.stock.lock().ok()?.get(sku).copied()
    }

    pub fn has_marker(&self, request_id: &str) -> bool {
        self.markers
            .lock()
            .map(|markers| markers.contains_key(request_id))
            .unwrap_or(false)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.lock().map(|markers| markers.len()).unwrap_or(0)
    }
}

fn poisoned(operation: &str) -> StoreError {
    StoreError::Unavailable(format!("lock poisoned during {}", operation))
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn create_marker(&self, marker: &IdempotencyMarker) -> Result<MarkerWrite, StoreError> {
        let mut markers = self.markers.lock().map_err(|_| poisoned("create_marker"))?;
        if markers.contains_key(&marker.request_id) {
            return Ok(MarkerWrite::AlreadyExists);
        }
        markers.insert(marker.request_id.clone(), marker.clone());
        Ok(MarkerWrite::Created)
    }

    async fn decrement_stock(&self, sku: &str, qty: i64) -> Result<Decrement, StoreError> {
        let mut stock = self.stock.lock().map_err(|_| poisoned("decrement_stock"))?;
        match stock.get_mut(sku) {
            Some(current) if *current >= qty => {
                *current -= qty;
                Ok(Decrement::Applied { remaining: *current })
            }
            _ => Ok(Decrement::ConditionFailed),
        }
    }

    async fn purge_expired_markers(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut markers = self.markers.lock().map_err(|_| poisoned("purge_expired_markers"))?;
        let before = markers.len();
        markers.retain(|_, marker| !marker.is_expired(now));
        Ok((before - markers.len()) as u64)
    }
}
