//! `menuiserie-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model and the postal address shared between
//! clients and projects.

pub mod address;
pub mod entity;
pub mod error;
pub mod id;

pub use address::PostalAddress;
pub use entity::{Entity, index_by_id};
pub use error::DomainError;
pub use id::{CategoryId, ClientId, ProductId, ProjectId, ProjectProductId};
