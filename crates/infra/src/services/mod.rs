//! Mapping services: the data-access surface the application consumes.
//!
//! Each service issues row queries through a [`DataStore`](crate::store::DataStore)
//! and translates rows to domain models through the versioned shapes in
//! [`rows`]. Store failures are wrapped with the operation that failed.

mod clients;
mod products;
mod projects;
pub mod rows;

pub use clients::ClientService;
pub use products::ProductService;
pub use projects::ProjectService;
pub use rows::ROW_SCHEMA_VERSION;

use chrono::{SecondsFormat, Utc};
use menuiserie_products::Rejection;
use serde_json::Value;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("unexpected {entity} row (schema v{}): {message}", ROW_SCHEMA_VERSION)]
    Schema {
        entity: &'static str,
        message: String,
    },

    #[error("{entity} {id} not found")]
    Missing { entity: &'static str, id: String },

    #[error(transparent)]
    Rejected(#[from] Rejection),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Attach the failed operation to a store error.
trait StoreContext<T> {
    fn context(self, context: &'static str) -> ServiceResult<T>;
}

impl<T> StoreContext<T> for Result<T, StoreError> {
    fn context(self, context: &'static str) -> ServiceResult<T> {
        self.map_err(|source| ServiceError::Store { context, source })
    }
}

/// `updated_at` value written by every update.
fn now_stamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}
