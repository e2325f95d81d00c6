//! Stored row shapes, version 1.
//!
//! Each `*RowV1` mirrors one table exactly as the hosted schema returns it.
//! Decoding is strict about types and required columns; nullable columns get
//! the same defaults everywhere (country "France", quantity 1, empty
//! specifications, zero dimensions).
//!
//! JSON columns (`specifications`, `default_dimensions`, `dimensions`,
//! `parameters`) are shared with the mobile app and keep its French keys.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use menuiserie_clients::Client;
use menuiserie_core::{
    CategoryId, ClientId, PostalAddress, ProductId, ProjectId, ProjectProductId,
    address::DEFAULT_COUNTRY,
};
use menuiserie_products::{
    DEFAULT_CATEGORY_ICON, DefaultDimensions, Dimensions, Parameters, Product, ProductCategory,
    ProductType, Specifications,
};
use menuiserie_projects::{Project, ProjectProduct, ProjectProductStatus, ProjectStatus};

use crate::services::ServiceError;
use crate::store::Row;

/// Version of the row shapes below.
pub const ROW_SCHEMA_VERSION: u32 = 1;

/// Decode one row into its schema, naming `entity` on failure.
pub fn decode<T: DeserializeOwned>(entity: &'static str, row: Row) -> Result<T, ServiceError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| ServiceError::Schema {
        entity,
        message: e.to_string(),
    })
}

/// Encode a write payload as a row.
pub fn encode<T: Serialize>(entity: &'static str, payload: &T) -> Result<Row, ServiceError> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(ServiceError::Schema {
            entity,
            message: format!("payload encoded as {other} instead of an object"),
        }),
        Err(e) => Err(ServiceError::Schema {
            entity,
            message: e.to_string(),
        }),
    }
}

fn stamp(value: Option<DateTime<Utc>>) -> DateTime<Utc> {
    value.unwrap_or_default()
}

// ---------------------------------------------------------------- clients

#[derive(Debug, Clone, Deserialize)]
pub struct ClientRowV1 {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub address_street: String,
    pub address_city: String,
    pub address_postal_code: String,
    pub address_country: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ClientRowV1 {
    pub fn into_domain(self) -> Client {
        Client {
            id: self.id,
            last_name: self.last_name,
            first_name: self.first_name,
            company: self.company.filter(|c| !c.is_empty()),
            email: self.email,
            phone: self.phone,
            address: PostalAddress {
                street: self.address_street,
                city: self.address_city,
                postal_code: self.address_postal_code,
                country: self
                    .address_country
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            },
            notes: None,
            project_ids: Vec::new(),
            created_at: stamp(self.created_at),
            updated_at: stamp(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientInsertV1 {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub address_street: String,
    pub address_city: String,
    pub address_postal_code: String,
    pub address_country: String,
}

// --------------------------------------------------------------- products

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRowV1 {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl CategoryRowV1 {
    pub fn into_domain(self) -> ProductCategory {
        ProductCategory {
            id: self.id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            icon: self
                .icon
                .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryInsertV1 {
    pub name: String,
    pub description: Option<String>,
}

/// `products.specifications`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationsV1 {
    #[serde(default)]
    pub materiaux: Vec<String>,
    #[serde(default)]
    pub couleurs: Vec<String>,
    #[serde(rename = "typesVitrage", default, skip_serializing_if = "Option::is_none")]
    pub types_vitrage: Option<Vec<String>>,
    #[serde(rename = "systemeOuverture", default, skip_serializing_if = "Option::is_none")]
    pub systeme_ouverture: Option<Vec<String>>,
}

impl From<SpecificationsV1> for Specifications {
    fn from(v: SpecificationsV1) -> Self {
        Specifications {
            materials: v.materiaux,
            colors: v.couleurs,
            glazing_types: v.types_vitrage,
            opening_systems: v.systeme_ouverture,
        }
    }
}

impl From<&Specifications> for SpecificationsV1 {
    fn from(s: &Specifications) -> Self {
        SpecificationsV1 {
            materiaux: s.materials.clone(),
            couleurs: s.colors.clone(),
            types_vitrage: s.glazing_types.clone(),
            systeme_ouverture: s.opening_systems.clone(),
        }
    }
}

/// `products.default_dimensions`. Missing bounds read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefaultDimensionsV1 {
    pub largeur_min: f64,
    pub largeur_max: f64,
    pub hauteur_min: f64,
    pub hauteur_max: f64,
}

impl From<DefaultDimensionsV1> for DefaultDimensions {
    fn from(v: DefaultDimensionsV1) -> Self {
        DefaultDimensions {
            width_min: v.largeur_min,
            width_max: v.largeur_max,
            height_min: v.hauteur_min,
            height_max: v.hauteur_max,
        }
    }
}

impl From<&DefaultDimensions> for DefaultDimensionsV1 {
    fn from(d: &DefaultDimensions) -> Self {
        DefaultDimensionsV1 {
            largeur_min: d.width_min,
            largeur_max: d.width_max,
            hauteur_min: d.height_min,
            hauteur_max: d.height_max,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductRowV1 {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub specifications: Option<SpecificationsV1>,
    pub default_dimensions: Option<DefaultDimensionsV1>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProductRowV1 {
    pub fn into_domain(self) -> Product {
        let unrecognized_type = ProductType::from_tag(&self.product_type)
            .is_none()
            .then(|| self.product_type.clone());
        Product {
            id: self.id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            product_type: ProductType::from_tag_or_window(&self.product_type),
            unrecognized_type,
            specifications: self.specifications.unwrap_or_default().into(),
            default_dimensions: self.default_dimensions.unwrap_or_default().into(),
            created_at: stamp(self.created_at),
            updated_at: stamp(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductInsertV1 {
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub product_type: &'static str,
    pub specifications: SpecificationsV1,
    pub default_dimensions: DefaultDimensionsV1,
}

// --------------------------------------------------------------- projects

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRowV1 {
    pub id: ProjectId,
    pub client_id: ClientId,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub site_address_street: Option<String>,
    pub site_address_city: Option<String>,
    pub site_address_postal_code: Option<String>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub estimated_budget: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProjectRowV1 {
    /// The site address exists only when a street is stored.
    pub fn site_address(&self) -> Option<PostalAddress> {
        let street = self.site_address_street.as_deref().filter(|s| !s.is_empty())?;
        Some(PostalAddress::new(
            street,
            self.site_address_city.clone().unwrap_or_default(),
            self.site_address_postal_code.clone().unwrap_or_default(),
            DEFAULT_COUNTRY,
        ))
    }

    pub fn into_domain(self, client: Client, products: Vec<ProjectProduct>) -> Project {
        let site_address = self.site_address();
        Project {
            id: self.id,
            name: self.name,
            description: self.description.filter(|d| !d.is_empty()),
            client_id: self.client_id,
            client,
            products,
            status: ProjectStatus::from_db(self.status.as_deref()),
            site_address,
            planned_start: self.planned_start_date,
            planned_end: self.planned_end_date,
            estimated_budget: self.estimated_budget,
            notes: self.notes.filter(|n| !n.is_empty()),
            tags: self.tags,
            created_at: stamp(self.created_at),
            updated_at: stamp(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectInsertV1 {
    pub name: String,
    pub description: Option<String>,
    pub client_id: ClientId,
    pub status: &'static str,
    pub site_address_street: Option<String>,
    pub site_address_city: Option<String>,
    pub site_address_postal_code: Option<String>,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// `project_products.dimensions`. The mobile form stores decimals as typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionsV1 {
    #[serde(default)]
    pub largeur: f64,
    #[serde(default)]
    pub hauteur: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profondeur: Option<f64>,
}

impl From<DimensionsV1> for Dimensions {
    fn from(v: DimensionsV1) -> Self {
        Dimensions {
            width: v.largeur,
            height: v.hauteur,
            depth: v.profondeur,
        }
    }
}

impl From<&Dimensions> for DimensionsV1 {
    fn from(d: &Dimensions) -> Self {
        DimensionsV1 {
            largeur: d.width,
            hauteur: d.height,
            profondeur: d.depth,
        }
    }
}

/// `project_products.parameters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParametersV1 {
    #[serde(default)]
    pub materiau: String,
    #[serde(default)]
    pub couleur: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitrage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ouverture: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl From<ParametersV1> for Parameters {
    fn from(v: ParametersV1) -> Self {
        Parameters {
            material: v.materiau,
            color: v.couleur,
            glazing: v.vitrage,
            opening_system: v.ouverture,
            options: v.options,
        }
    }
}

impl From<&Parameters> for ParametersV1 {
    fn from(p: &Parameters) -> Self {
        ParametersV1 {
            materiau: p.material.clone(),
            couleur: p.color.clone(),
            vitrage: p.glazing.clone(),
            ouverture: p.opening_system.clone(),
            options: p.options.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectProductRowV1 {
    pub id: ProjectProductId,
    pub project_id: ProjectId,
    pub product_id: ProductId,
    pub quantity: Option<i64>,
    pub dimensions: Option<DimensionsV1>,
    pub parameters: Option<ParametersV1>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProjectProductRowV1 {
    pub fn into_domain(self, product: Product) -> ProjectProduct {
        let quantity = self
            .quantity
            .filter(|q| *q > 0)
            .and_then(|q| u32::try_from(q).ok())
            .unwrap_or(1);
        ProjectProduct {
            id: self.id,
            project_id: self.project_id,
            product_id: self.product_id,
            product,
            quantity,
            dimensions: self.dimensions.unwrap_or_default().into(),
            parameters: self.parameters.unwrap_or_default().into(),
            notes: self.notes.filter(|n| !n.is_empty()),
            status: ProjectProductStatus::from_db(self.status.as_deref()),
            created_at: stamp(self.created_at),
            updated_at: stamp(self.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectProductInsertV1 {
    pub project_id: ProjectId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub dimensions: DimensionsV1,
    pub parameters: ParametersV1,
    pub notes: Option<String>,
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn client_row() -> Value {
        json!({
            "id": "0190a5e2-7c3b-7d4e-8f00-000000000001",
            "first_name": "Claire",
            "last_name": "Fontaine",
            "email": "claire@fontaine.fr",
            "phone": "04 78 00 00 00",
            "company": null,
            "address_street": "8 quai Saint-Vincent",
            "address_city": "Lyon",
            "address_postal_code": "69001",
            "address_country": null,
            "created_at": "2024-03-01T09:30:00+00:00",
            "updated_at": null
        })
    }

    #[test]
    fn client_row_fills_country_and_empty_projects() {
        let row: ClientRowV1 = decode("client", row(client_row())).unwrap();
        let client = row.into_domain();
        assert_eq!(client.address.country, "France");
        assert!(client.project_ids.is_empty());
        assert_eq!(client.company, None);
        assert_eq!(client.updated_at, DateTime::<Utc>::default());
    }

    #[test]
    fn client_row_missing_required_column_is_a_schema_error() {
        let mut value = client_row();
        value.as_object_mut().unwrap().remove("last_name");
        let err = decode::<ClientRowV1>("client", row(value)).unwrap_err();
        assert!(matches!(err, ServiceError::Schema { entity: "client", .. }));
    }

    #[test]
    fn client_row_with_wrong_type_is_a_schema_error() {
        let mut value = client_row();
        value["phone"] = json!(478000000);
        assert!(decode::<ClientRowV1>("client", row(value)).is_err());
    }

    #[test]
    fn product_row_reads_french_json_keys() {
        let value = json!({
            "id": "0190a5e2-7c3b-7d4e-8f00-000000000002",
            "category_id": "0190a5e2-7c3b-7d4e-8f00-000000000003",
            "name": "Volet battant bois",
            "description": "",
            "type": "volet",
            "specifications": { "materiaux": ["Bois"], "couleurs": ["Chêne"], "systemeOuverture": ["Battant"] },
            "default_dimensions": { "largeurMin": 400, "largeurMax": 1600 },
            "created_at": "2024-03-01T09:30:00Z",
            "updated_at": "2024-03-01T09:30:00Z"
        });
        let product = decode::<ProductRowV1>("product", row(value)).unwrap().into_domain();

        assert_eq!(product.product_type, ProductType::Shutter);
        assert_eq!(product.specifications.materials, vec!["Bois".to_string()]);
        assert_eq!(product.specifications.glazing_types, None);
        assert_eq!(
            product.specifications.opening_systems,
            Some(vec!["Battant".to_string()])
        );
        assert_eq!(product.default_dimensions.width_max, 1600.0);
        assert_eq!(product.default_dimensions.height_max, 0.0);
        assert_eq!(product.unrecognized_type, None);
    }

    #[test]
    fn unknown_product_type_reads_as_window() {
        let value = json!({
            "id": "0190a5e2-7c3b-7d4e-8f00-000000000002",
            "category_id": "0190a5e2-7c3b-7d4e-8f00-000000000003",
            "name": "Véranda",
            "description": "",
            "type": "veranda",
            "specifications": null,
            "default_dimensions": null,
            "created_at": null,
            "updated_at": null
        });
        let product = decode::<ProductRowV1>("product", row(value)).unwrap().into_domain();
        assert_eq!(product.product_type, ProductType::Window);
        assert_eq!(product.unrecognized_type.as_deref(), Some("veranda"));
        assert_eq!(product.type_label(), "veranda");
        assert_eq!(product.default_dimensions, DefaultDimensions::default());
    }

    #[test]
    fn site_address_requires_a_street() {
        let base = json!({
            "id": "0190a5e2-7c3b-7d4e-8f00-000000000004",
            "client_id": "0190a5e2-7c3b-7d4e-8f00-000000000001",
            "name": "Rénovation maison",
            "description": null,
            "status": "in_progress",
            "site_address_street": null,
            "site_address_city": "Villeurbanne",
            "site_address_postal_code": null,
            "planned_start_date": "2024-05-02",
            "planned_end_date": null,
            "notes": null,
            "tags": ["urgent"],
            "created_at": null,
            "updated_at": null
        });
        let project: ProjectRowV1 = decode("project", row(base.clone())).unwrap();
        assert_eq!(project.site_address(), None);

        let mut with_street = base;
        with_street["site_address_street"] = json!("14 avenue Roger Salengro");
        let project: ProjectRowV1 = decode("project", row(with_street)).unwrap();
        let site = project.site_address().unwrap();
        assert_eq!(site.city, "Villeurbanne");
        assert_eq!(site.postal_code, "");
        assert_eq!(site.country, "France");
        assert_eq!(project.planned_start_date, NaiveDate::from_ymd_opt(2024, 5, 2));
    }

    #[test]
    fn project_product_defaults_quantity_and_dimensions() {
        let value = json!({
            "id": "0190a5e2-7c3b-7d4e-8f00-000000000005",
            "project_id": "0190a5e2-7c3b-7d4e-8f00-000000000004",
            "product_id": "0190a5e2-7c3b-7d4e-8f00-000000000002",
            "quantity": null,
            "dimensions": null,
            "parameters": { "materiau": "PVC", "couleur": "Blanc", "options": ["Oscillo-battant"] },
            "notes": "",
            "status": null,
            "created_at": null,
            "updated_at": null
        });
        let pp: ProjectProductRowV1 = decode("project product", row(value)).unwrap();
        assert_eq!(pp.quantity, None);

        let product = decode::<ProductRowV1>(
            "product",
            row(json!({
                "id": "0190a5e2-7c3b-7d4e-8f00-000000000002",
                "category_id": "0190a5e2-7c3b-7d4e-8f00-000000000003",
                "name": "Fenêtre",
                "description": "",
                "type": "fenetre",
                "specifications": null,
                "default_dimensions": null,
                "created_at": null,
                "updated_at": null
            })),
        )
        .unwrap()
        .into_domain();

        let pp = pp.into_domain(product);
        assert_eq!(pp.quantity, 1);
        assert_eq!(pp.dimensions, Dimensions::default());
        assert_eq!(pp.parameters.options, vec!["Oscillo-battant".to_string()]);
        assert_eq!(pp.notes, None);
        assert_eq!(pp.status, ProjectProductStatus::Draft);
    }

    #[test]
    fn fractional_measurements_decode_unchanged() {
        let value = json!({
            "id": "0190a5e2-7c3b-7d4e-8f00-000000000005",
            "project_id": "0190a5e2-7c3b-7d4e-8f00-000000000004",
            "product_id": "0190a5e2-7c3b-7d4e-8f00-000000000002",
            "quantity": 2,
            "dimensions": { "largeur": 1200.5, "hauteur": 1350, "profondeur": 70.25 },
            "parameters": { "materiau": "Aluminium", "couleur": "Noir" },
            "notes": null,
            "status": "validated",
            "created_at": null,
            "updated_at": null
        });
        let pp: ProjectProductRowV1 = decode("project product", row(value)).unwrap();
        let dims = Dimensions::from(pp.dimensions.unwrap());
        assert_eq!(dims.width, 1200.5);
        assert_eq!(dims.height, 1350.0);
        assert_eq!(dims.depth, Some(70.25));
    }

    #[test]
    fn write_payloads_keep_french_keys() {
        let dims = DimensionsV1::from(&Dimensions {
            width: 900.5,
            height: 2100.0,
            depth: None,
        });
        assert_eq!(
            serde_json::to_value(dims).unwrap(),
            json!({ "largeur": 900.5, "hauteur": 2100.0 })
        );
    }
}
