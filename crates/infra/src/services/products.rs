use std::sync::Arc;

use serde_json::Value;

use menuiserie_core::{CategoryId, ProductId};
use menuiserie_products::{NewCategory, NewProduct, Product, ProductCategory, ProductPatch};

use super::rows::{
    CategoryInsertV1, CategoryRowV1, DefaultDimensionsV1, ProductInsertV1, ProductRowV1,
    SpecificationsV1, decode, encode,
};
use super::{ServiceError, ServiceResult, StoreContext, now_stamp};
use crate::store::{DataStore, Direction, Query, Row, Table};

const PRODUCT: &str = "product";
const CATEGORY: &str = "category";
const SEARCH_COLUMNS: [&str; 3] = ["name", "description", "type"];

/// Catalog access: categories and products.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn DataStore>,
}

fn to_json<T: serde::Serialize>(entity: &'static str, value: &T) -> ServiceResult<Value> {
    serde_json::to_value(value).map_err(|e| ServiceError::Schema {
        entity,
        message: e.to_string(),
    })
}

impl ProductService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    fn map_products(rows: Vec<Row>) -> ServiceResult<Vec<Product>> {
        rows.into_iter()
            .map(|row| decode::<ProductRowV1>(PRODUCT, row).map(ProductRowV1::into_domain))
            .collect()
    }

    fn map_categories(rows: Vec<Row>) -> ServiceResult<Vec<ProductCategory>> {
        rows.into_iter()
            .map(|row| decode::<CategoryRowV1>(CATEGORY, row).map(CategoryRowV1::into_domain))
            .collect()
    }

    // ------------------------------------------------------------ categories

    /// All categories, alphabetical.
    pub async fn list_categories(&self) -> ServiceResult<Vec<ProductCategory>> {
        let query = Query::from(Table::ProductCategories).order_by("name", Direction::Asc);
        let rows = self
            .store
            .select(&query)
            .await
            .context("failed to load categories")?;
        Self::map_categories(rows)
    }

    pub async fn get_category(&self, id: CategoryId) -> ServiceResult<Option<ProductCategory>> {
        let query = Query::from(Table::ProductCategories).eq("id", id).limit(1);
        let rows = self
            .store
            .select(&query)
            .await
            .context("failed to load category")?;
        Ok(Self::map_categories(rows)?.into_iter().next())
    }

    pub async fn create_category(&self, new: NewCategory) -> ServiceResult<ProductCategory> {
        let payload = CategoryInsertV1 {
            name: new.name,
            description: Some(new.description).filter(|d| !d.trim().is_empty()),
        };
        let row = self
            .store
            .insert(Table::ProductCategories, encode(CATEGORY, &payload)?)
            .await
            .context("failed to create category")?;

        let category = decode::<CategoryRowV1>(CATEGORY, row)?.into_domain();
        tracing::info!(category_id = %category.id, "category created");
        Ok(category)
    }

    // -------------------------------------------------------------- products

    /// All products, newest first.
    pub async fn list(&self) -> ServiceResult<Vec<Product>> {
        let query = Query::from(Table::Products).order_by("created_at", Direction::Desc);
        let rows = self
            .store
            .select(&query)
            .await
            .context("failed to load products")?;
        Self::map_products(rows)
    }

    /// Products of one category, alphabetical.
    pub async fn list_by_category(&self, category_id: CategoryId) -> ServiceResult<Vec<Product>> {
        let query = Query::from(Table::Products)
            .eq("category_id", category_id)
            .order_by("name", Direction::Asc);
        let rows = self
            .store
            .select(&query)
            .await
            .context("failed to load category products")?;
        Self::map_products(rows)
    }

    pub async fn get(&self, id: ProductId) -> ServiceResult<Option<Product>> {
        let query = Query::from(Table::Products).eq("id", id).limit(1);
        let rows = self
            .store
            .select(&query)
            .await
            .context("failed to load product")?;
        Ok(Self::map_products(rows)?.into_iter().next())
    }

    /// Fetch several products at once. Unknown ids are skipped.
    pub async fn get_many(&self, ids: &[ProductId]) -> ServiceResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::from(Table::Products).is_in("id", ids.iter());
        let rows = self
            .store
            .select(&query)
            .await
            .context("failed to load products")?;
        Self::map_products(rows)
    }

    /// Products whose name, description or type tag contains `term`.
    pub async fn search(&self, term: &str) -> ServiceResult<Vec<Product>> {
        let query = Query::from(Table::Products)
            .search(&SEARCH_COLUMNS, term.trim())
            .order_by("name", Direction::Asc);
        let rows = self
            .store
            .select(&query)
            .await
            .context("failed to search products")?;
        Self::map_products(rows)
    }

    pub async fn create(&self, new: NewProduct) -> ServiceResult<Product> {
        let payload = ProductInsertV1 {
            category_id: new.category_id,
            name: new.name,
            description: new.description,
            product_type: new.product_type.tag(),
            specifications: SpecificationsV1::from(&new.specifications),
            default_dimensions: DefaultDimensionsV1::from(&new.default_dimensions),
        };
        let row = self
            .store
            .insert(Table::Products, encode(PRODUCT, &payload)?)
            .await
            .context("failed to create product")?;

        let product = decode::<ProductRowV1>(PRODUCT, row)?.into_domain();
        tracing::info!(product_id = %product.id, product_type = %product.product_type, "product created");
        Ok(product)
    }

    pub async fn update(&self, id: ProductId, patch: ProductPatch) -> ServiceResult<Product> {
        let mut row = Row::new();
        if let Some(v) = patch.category_id {
            row.insert("category_id".into(), Value::String(v.to_string()));
        }
        if let Some(v) = patch.name {
            row.insert("name".into(), Value::String(v));
        }
        if let Some(v) = patch.description {
            row.insert("description".into(), Value::String(v));
        }
        if let Some(v) = patch.product_type {
            row.insert("type".into(), Value::String(v.tag().to_string()));
        }
        if let Some(v) = &patch.specifications {
            row.insert(
                "specifications".into(),
                to_json(PRODUCT, &SpecificationsV1::from(v))?,
            );
        }
        if let Some(v) = &patch.default_dimensions {
            row.insert(
                "default_dimensions".into(),
                to_json(PRODUCT, &DefaultDimensionsV1::from(v))?,
            );
        }
        row.insert("updated_at".into(), now_stamp());

        let row = self
            .store
            .update(Table::Products, *id.as_uuid(), row)
            .await
            .context("failed to update product")?;

        tracing::info!(product_id = %id, "product updated");
        Ok(decode::<ProductRowV1>(PRODUCT, row)?.into_domain())
    }

    pub async fn delete(&self, id: ProductId) -> ServiceResult<()> {
        self.store
            .delete(Table::Products, *id.as_uuid())
            .await
            .context("failed to delete product")?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}
