use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info};

use crate::error::StoreError;
use crate::store::InventoryStore;

/// Periodically deletes idempotency markers past their expiry.
pub struct MarkerReaper {
    store: Arc<dyn InventoryStore>,
    interval: Duration,
}

impl MarkerReaper {
    pub fn new(store: Arc<dyn InventoryStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    pub async fn run(&self) {
        let mut interval = time::interval(self.interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.reap_once().await {
                error!("Error purging expired idempotency markers: {}", e);
            }
        }
    }

    pub async fn reap_once(&self) -> Result<u64, StoreError> {
        let purged = self.store.purge_expired_markers(Utc::now()).await?;
        if purged > 0 {
            info!("Purged {} expired idempotency markers", purged);
        }
        Ok(purged)
    }
}
