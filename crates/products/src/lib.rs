//! Products domain module (catalog).
//!
//! This crate contains the catalog view models and the dimension-constraint
//! ruleset used when a product is measured into a project, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod dimensions;
pub mod product;

pub use dimensions::{
    Bounds, DimensionRanges, Dimensions, MeasurementCandidate, Parameters, Rejection, baseline,
    compute_ranges, validate,
};
pub use product::{
    DEFAULT_CATEGORY_ICON, DefaultDimensions, NewCategory, NewProduct, Product, ProductCategory,
    ProductPatch, ProductType, Specifications,
};
