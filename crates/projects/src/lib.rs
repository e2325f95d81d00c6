//! Projects domain module.
//!
//! A project is a job for one client: a job site, a schedule and the list of
//! catalog products measured and configured for it. Configuration goes through
//! the dimension ruleset of `menuiserie-products`.

pub mod project;
pub mod project_product;

pub use project::{NewProject, Project, ProjectPatch, ProjectStatus};
pub use project_product::{
    NewProjectProduct, ProductConfiguration, ProjectProduct, ProjectProductStatus,
};
