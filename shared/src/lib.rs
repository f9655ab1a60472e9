use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const INVENTORY_SOURCE: &str = "app.inventory";
pub const INVENTORY_RESERVED: &str = "InventoryReserved";

/// Fact emitted after a successful stock reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationEvent {
    pub sku: String,
    #[serde(rename = "qty")]
    pub qty_reserved: i64,
    #[serde(rename = "remaining")]
    pub qty_remaining: i64,
    pub request_id: String,
}

/// Bus envelope wrapping a domain event with its routing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    pub id: Uuid,
    pub source: String,
    pub detail_type: String,
    pub detail: T,
    pub created_at: DateTime<Utc>,
}

impl EventEnvelope<ReservationEvent> {
    pub fn inventory_reserved(event: ReservationEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: INVENTORY_SOURCE.to_string(),
            detail_type: INVENTORY_RESERVED.to_string(),
            detail: event,
            created_at: Utc::now(),
        }
    }

    pub fn partition_key(&self) -> &str {
        &self.detail.sku
    }
}
