//! Application layer: mutation handles that announce changes on the event bus,
//! and resources that reload when those announcements arrive.

pub mod context;
pub mod handles;
pub mod loaders;
pub mod resource;

pub use context::AppContext;
pub use handles::{ClientsHandle, ProductsHandle, ProjectsHandle};
pub use resource::{FetchState, Loader, Resource};
