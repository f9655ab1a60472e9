pub mod api;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pg_store;
pub mod publisher;
pub mod reaper;
pub mod schema;
pub mod store;

pub use error::{ReserveError, StoreError};
pub use handlers::{Outcome, ReservationConfig, ReservationHandler};
pub use store::{InventoryStore, MemoryStore};
