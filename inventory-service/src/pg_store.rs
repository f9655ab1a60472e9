use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection, RunQueryDsl};

use crate::error::StoreError;
use crate::models::IdempotencyMarker;
use crate::schema::*;
use crate::store::{Decrement, InventoryStore, MarkerWrite};

pub type DbPool = Pool<AsyncPgConnection>;

/// Postgres-backed store. Each operation is a single statement, so row-level
/// locking gives the atomicity the reservation path relies on.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn unavailable(err: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn create_marker(&self, marker: &IdempotencyMarker) -> Result<MarkerWrite, StoreError> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;

        let inserted = diesel::insert_into(idempotency_markers::table)
            .values(marker)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(unavailable)?;

        if inserted == 0 {
            Ok(MarkerWrite::AlreadyExists)
        } else {
            Ok(MarkerWrite::Created)
        }
    }

    async fn decrement_stock(&self, sku: &str, qty: i64) -> Result<Decrement, StoreError> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;

        let remaining = diesel::update(
            stock::table
                .filter(stock::sku.eq(sku))
                .filter(stock::qty.ge(qty)),
        )
        .set((
            stock::qty.eq(stock::qty - qty),
            stock::updated_at.eq(Utc::now()),
        ))
        .returning(stock::qty)
        .get_result::<i64>(&mut conn)
        .await
        .optional()
        .map_err(unavailable)?;

        Ok(match remaining {
            Some(remaining) => Decrement::Applied { remaining },
            None => Decrement::ConditionFailed,
        })
    }

    async fn purge_expired_markers(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;

        let deleted = diesel::delete(
            idempotency_markers::table.filter(idempotency_markers::expires_at.lt(now)),
        )
        .execute(&mut conn)
        .await
        .map_err(unavailable)?;

        Ok(deleted as u64)
    }
}
