use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuiserie_core::{Entity, ProductId, ProjectId, ProjectProductId};
use menuiserie_products::{
    Dimensions, MeasurementCandidate, Parameters, Product, Rejection, validate,
};

/// Progress of one configured product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectProductStatus {
    #[default]
    Draft,
    Validated,
    Ordered,
}

impl ProjectProductStatus {
    pub fn as_db(self) -> &'static str {
        match self {
            ProjectProductStatus::Draft => "draft",
            ProjectProductStatus::Validated => "validated",
            ProjectProductStatus::Ordered => "ordered",
        }
    }

    /// Unknown or missing values read as `Draft`.
    pub fn from_db(value: Option<&str>) -> Self {
        match value {
            Some("validated") => ProjectProductStatus::Validated,
            Some("ordered") => ProjectProductStatus::Ordered,
            _ => ProjectProductStatus::Draft,
        }
    }
}

/// A catalog product as measured and configured for one project.
///
/// The embedded `product` is a read-only snapshot of the catalog template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProduct {
    pub id: ProjectProductId,
    pub project_id: ProjectId,
    pub product_id: ProductId,
    pub product: Product,
    pub quantity: u32,
    pub dimensions: Dimensions,
    pub parameters: Parameters,
    pub notes: Option<String>,
    pub status: ProjectProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for ProjectProduct {
    type Id = ProjectProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Form input for adding a product to a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConfiguration {
    pub quantity: u32,
    pub dimensions: Dimensions,
    pub parameters: Parameters,
    pub notes: Option<String>,
}

/// A validated configuration, ready to be stored.
///
/// Only [`NewProjectProduct::configure`] builds one, so every value of this
/// type has passed the dimension ruleset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProjectProduct {
    project_id: ProjectId,
    product_id: ProductId,
    quantity: u32,
    dimensions: Dimensions,
    parameters: Parameters,
    notes: Option<String>,
    status: ProjectProductStatus,
}

impl NewProjectProduct {
    /// Validate `config` against `product`'s effective ranges.
    ///
    /// A quantity of zero is stored as one. The result always starts as
    /// `Draft`.
    pub fn configure(
        project_id: ProjectId,
        product: &Product,
        config: ProductConfiguration,
    ) -> Result<Self, Rejection> {
        let candidate = MeasurementCandidate {
            product_type: product.product_type,
            type_label: product.unrecognized_type.clone(),
            quantity: config.quantity,
            dimensions: config.dimensions,
            parameters: config.parameters,
            notes: config.notes,
        };
        validate(&candidate, &product.dimension_ranges())?;

        Ok(Self {
            project_id,
            product_id: product.id,
            quantity: candidate.quantity.max(1),
            dimensions: candidate.dimensions,
            parameters: candidate.parameters,
            notes: candidate.notes.filter(|n| !n.trim().is_empty()),
            status: ProjectProductStatus::Draft,
        })
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn status(&self) -> ProjectProductStatus {
        self.status
    }
}
