use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuiserie_core::{CategoryId, DomainError, Entity, ProductId};

use crate::dimensions::{DimensionRanges, compute_ranges};

/// Icon shown for a category when the store has none.
pub const DEFAULT_CATEGORY_ICON: &str = "package";

/// Product family. The set is closed: every catalog product is one of these.
///
/// Serialized with the stored tags (`fenetre`, `porte`, `portail`, `volet`);
/// the English names are accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "fenetre", alias = "window")]
    Window,
    #[serde(rename = "porte", alias = "door")]
    Door,
    #[serde(rename = "portail", alias = "gate")]
    Gate,
    #[serde(rename = "volet", alias = "shutter")]
    Shutter,
}

impl ProductType {
    pub const ALL: [ProductType; 4] = [
        ProductType::Window,
        ProductType::Door,
        ProductType::Gate,
        ProductType::Shutter,
    ];

    /// Tag stored in the `products.type` column.
    pub fn tag(self) -> &'static str {
        match self {
            ProductType::Window => "fenetre",
            ProductType::Door => "porte",
            ProductType::Gate => "portail",
            ProductType::Shutter => "volet",
        }
    }

    /// Lookup by stored tag or English name.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "fenetre" | "window" => Some(ProductType::Window),
            "porte" | "door" => Some(ProductType::Door),
            "portail" | "gate" => Some(ProductType::Gate),
            "volet" | "shutter" => Some(ProductType::Shutter),
            _ => None,
        }
    }

    /// Like [`ProductType::from_tag`] but an unknown tag maps to `Window`, whose
    /// baseline is the most permissive for everyday joinery.
    pub fn from_tag_or_window(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or_else(|| {
            tracing::warn!(tag, "unknown product type; using window dimension baseline");
            ProductType::Window
        })
    }
}

impl core::fmt::Display for ProductType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            ProductType::Window => "window",
            ProductType::Door => "door",
            ProductType::Gate => "gate",
            ProductType::Shutter => "shutter",
        };
        f.write_str(label)
    }
}

impl FromStr for ProductType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| DomainError::validation(format!("unknown product type '{s}'")))
    }
}

/// What a product can be ordered in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    pub materials: Vec<String>,
    pub colors: Vec<String>,
    pub glazing_types: Option<Vec<String>>,
    pub opening_systems: Option<Vec<String>>,
}

/// The product's own dimension envelope, in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultDimensions {
    pub width_min: f64,
    pub width_max: f64,
    pub height_min: f64,
    pub height_max: f64,
}

/// Catalog product (template). Never mutated by project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    /// Stored type tag that matched no known type. `product_type` is then the
    /// window fallback, and measurement messages name this tag instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrecognized_type: Option<String>,
    pub specifications: Specifications,
    pub default_dimensions: DefaultDimensions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Bounds enforced when this product is measured into a project.
    pub fn dimension_ranges(&self) -> DimensionRanges {
        compute_ranges(self.product_type, &self.default_dimensions)
    }

    /// Name of the product's type as shown to the user.
    pub fn type_label(&self) -> String {
        match &self.unrecognized_type {
            Some(tag) => tag.clone(),
            None => self.product_type.to_string(),
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub icon: String,
}

impl Entity for ProductCategory {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payload for creating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
}

/// Payload for creating a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    #[serde(default)]
    pub specifications: Specifications,
    #[serde(default)]
    pub default_dimensions: DefaultDimensions,
}

/// Partial update of a catalog product. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub category_id: Option<CategoryId>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<ProductType>,
    pub specifications: Option<Specifications>,
    pub default_dimensions: Option<DefaultDimensions>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.product_type.is_none()
            && self.specifications.is_none()
            && self.default_dimensions.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_and_english_names_both_parse() {
        for ty in ProductType::ALL {
            assert_eq!(ProductType::from_tag(ty.tag()), Some(ty));
            assert_eq!(ty.to_string().parse::<ProductType>().unwrap(), ty);
        }
        assert_eq!(ProductType::from_tag(" Porte "), Some(ProductType::Door));
    }

    #[test]
    fn unknown_tag_is_an_error_strictly_and_window_leniently() {
        assert!("veranda".parse::<ProductType>().is_err());
        assert_eq!(ProductType::from_tag_or_window("veranda"), ProductType::Window);
    }

    #[test]
    fn serde_writes_stored_tag_and_reads_aliases() {
        assert_eq!(serde_json::to_string(&ProductType::Gate).unwrap(), "\"portail\"");
        let ty: ProductType = serde_json::from_str("\"shutter\"").unwrap();
        assert_eq!(ty, ProductType::Shutter);
    }

    fn window(defaults: DefaultDimensions) -> Product {
        Product {
            id: ProductId::new(),
            category_id: CategoryId::new(),
            name: "Fenêtre PVC 2 vantaux".to_string(),
            description: String::new(),
            product_type: ProductType::Window,
            unrecognized_type: None,
            specifications: Specifications::default(),
            default_dimensions: defaults,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn product_ranges_combine_type_baseline_and_defaults() {
        let product = window(DefaultDimensions {
            width_min: 500.0,
            width_max: 1800.0,
            height_min: 300.0,
            height_max: 2600.0,
        });

        let ranges = product.dimension_ranges();
        assert_eq!((ranges.width.min, ranges.width.max), (500.0, 1800.0));
        assert_eq!((ranges.height.min, ranges.height.max), (400.0, 2500.0));
    }

    #[test]
    fn type_label_prefers_the_unrecognized_tag() {
        let mut product = window(DefaultDimensions::default());
        assert_eq!(product.type_label(), "window");

        product.unrecognized_type = Some("veranda".to_string());
        assert_eq!(product.type_label(), "veranda");
        assert_eq!(product.product_type, ProductType::Window);
    }
}
