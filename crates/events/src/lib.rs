//! In-process change notifications.
//!
//! Mutations publish `client:created`, `project:updated`, ... on an [`EventBus`];
//! fetch resources subscribe and reload themselves.

pub mod bus;
pub mod event;
pub mod notifier;

pub use bus::{EventBus, HandlerResult, Unsubscribe};
pub use event::{Change, EntityKind, EventName, UnknownEvent};
pub use notifier::EntityEvents;
