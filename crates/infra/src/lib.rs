//! Infrastructure layer: configuration, the remote row store and the services
//! mapping stored rows to domain models.

pub mod config;
pub mod services;
pub mod store;

pub use config::{Config, ConfigError};
pub use services::{ClientService, ProductService, ProjectService, ServiceError};
pub use store::{DataStore, InMemoryStore, PostgrestStore, Query, Row, StoreError, Table};
