use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use menuiserie_clients::Client;
use menuiserie_core::{ClientId, ProductId, ProjectId, ProjectProductId, index_by_id};
use menuiserie_products::Product;
use menuiserie_projects::{
    NewProject, NewProjectProduct, ProductConfiguration, Project, ProjectPatch, ProjectProduct,
    ProjectProductStatus,
};

use super::products::ProductService;
use super::rows::{
    ClientRowV1, DimensionsV1, ParametersV1, ProjectInsertV1, ProjectProductInsertV1,
    ProjectProductRowV1, ProjectRowV1, decode, encode,
};
use super::{ServiceError, ServiceResult, StoreContext, now_stamp};
use crate::store::{DataStore, Direction, Query, Row, Table};

const PROJECT: &str = "project";
const PROJECT_PRODUCT: &str = "project product";
const SEARCH_COLUMNS: [&str; 3] = ["name", "description", "notes"];

fn opt_string(value: Option<String>) -> Value {
    value
        .filter(|v| !v.trim().is_empty())
        .map_or(Value::Null, Value::String)
}

/// Projects with their client and configured products.
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn DataStore>,
    products: ProductService,
}

impl ProjectService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            products: ProductService::new(store.clone()),
            store,
        }
    }

    async fn select(&self, query: Query, context: &'static str) -> ServiceResult<Vec<Project>> {
        let rows = self.store.select(&query).await.context(context)?;
        let rows = rows
            .into_iter()
            .map(|row| decode::<ProjectRowV1>(PROJECT, row))
            .collect::<ServiceResult<Vec<_>>>()?;
        self.assemble(rows).await
    }

    /// Embed clients and configured products, keeping the order of `rows`.
    async fn assemble(&self, rows: Vec<ProjectRowV1>) -> ServiceResult<Vec<Project>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let client_ids: HashSet<ClientId> = rows.iter().map(|r| r.client_id).collect();
        let client_rows = self
            .store
            .select(&Query::from(Table::Clients).is_in("id", client_ids.iter()))
            .await
            .context("failed to load project clients")?;
        let clients: HashMap<ClientId, Client> = index_by_id(
            client_rows
                .into_iter()
                .map(|row| decode::<ClientRowV1>("client", row).map(ClientRowV1::into_domain))
                .collect::<ServiceResult<Vec<_>>>()?,
        );

        let project_ids: Vec<ProjectId> = rows.iter().map(|r| r.id).collect();
        let mut configured = self.load_products(&project_ids).await?;

        rows.into_iter()
            .map(|row| {
                let client = clients.get(&row.client_id).cloned().ok_or_else(|| {
                    ServiceError::Schema {
                        entity: PROJECT,
                        message: format!("client {} of project {} not found", row.client_id, row.id),
                    }
                })?;
                let products = configured.remove(&row.id).unwrap_or_default();
                Ok(row.into_domain(client, products))
            })
            .collect()
    }

    /// Configured products of several projects, oldest first per project.
    async fn load_products(
        &self,
        project_ids: &[ProjectId],
    ) -> ServiceResult<HashMap<ProjectId, Vec<ProjectProduct>>> {
        let rows = self
            .store
            .select(
                &Query::from(Table::ProjectProducts)
                    .is_in("project_id", project_ids.iter())
                    .order_by("created_at", Direction::Asc),
            )
            .await
            .context("failed to load project products")?;
        let rows = rows
            .into_iter()
            .map(|row| decode::<ProjectProductRowV1>(PROJECT_PRODUCT, row))
            .collect::<ServiceResult<Vec<_>>>()?;

        let product_ids: Vec<ProductId> = rows
            .iter()
            .map(|r| r.product_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let catalog: HashMap<ProductId, Product> =
            index_by_id(self.products.get_many(&product_ids).await?);

        let mut by_project: HashMap<ProjectId, Vec<ProjectProduct>> = HashMap::new();
        for row in rows {
            let Some(product) = catalog.get(&row.product_id).cloned() else {
                tracing::warn!(
                    project_product_id = %row.id,
                    product_id = %row.product_id,
                    "catalog product missing; skipping configured product"
                );
                continue;
            };
            by_project
                .entry(row.project_id)
                .or_default()
                .push(row.into_domain(product));
        }
        Ok(by_project)
    }

    /// All projects, newest first.
    pub async fn list(&self) -> ServiceResult<Vec<Project>> {
        let query = Query::from(Table::Projects).order_by("created_at", Direction::Desc);
        self.select(query, "failed to load projects").await
    }

    pub async fn list_by_client(&self, client_id: ClientId) -> ServiceResult<Vec<Project>> {
        let query = Query::from(Table::Projects)
            .eq("client_id", client_id)
            .order_by("created_at", Direction::Desc);
        self.select(query, "failed to load client projects").await
    }

    pub async fn get(&self, id: ProjectId) -> ServiceResult<Option<Project>> {
        let query = Query::from(Table::Projects).eq("id", id).limit(1);
        Ok(self
            .select(query, "failed to load project")
            .await?
            .into_iter()
            .next())
    }

    /// Projects whose name, description or notes contain `term`.
    pub async fn search(&self, term: &str) -> ServiceResult<Vec<Project>> {
        let query = Query::from(Table::Projects)
            .search(&SEARCH_COLUMNS, term.trim())
            .order_by("created_at", Direction::Desc);
        self.select(query, "failed to search projects").await
    }

    pub async fn create(&self, new: NewProject) -> ServiceResult<Project> {
        let site = new.site_address;
        let payload = ProjectInsertV1 {
            name: new.name,
            description: new.description.filter(|d| !d.trim().is_empty()),
            client_id: new.client_id,
            status: new.status.as_db(),
            site_address_street: site.as_ref().map(|a| a.street.clone()),
            site_address_city: site.as_ref().map(|a| a.city.clone()),
            site_address_postal_code: site.as_ref().map(|a| a.postal_code.clone()),
            planned_start_date: new.planned_start,
            planned_end_date: new.planned_end,
            notes: new.notes.filter(|n| !n.trim().is_empty()),
            tags: new.tags,
        };
        let row = self
            .store
            .insert(Table::Projects, encode(PROJECT, &payload)?)
            .await
            .context("failed to create project")?;

        let row = decode::<ProjectRowV1>(PROJECT, row)?;
        let project = self
            .assemble(vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Schema {
                entity: PROJECT,
                message: "created project could not be read back".to_string(),
            })?;
        tracing::info!(project_id = %project.id, client_id = %project.client_id, "project created");
        Ok(project)
    }

    /// Apply `patch`. Any status may replace any other.
    pub async fn update(&self, id: ProjectId, patch: ProjectPatch) -> ServiceResult<Project> {
        let mut row = Row::new();
        if let Some(v) = patch.name {
            row.insert("name".into(), Value::String(v));
        }
        if let Some(v) = patch.description {
            row.insert("description".into(), opt_string(v));
        }
        if let Some(v) = patch.client_id {
            row.insert("client_id".into(), Value::String(v.to_string()));
        }
        if let Some(v) = patch.status {
            row.insert("status".into(), Value::String(v.as_db().to_string()));
        }
        match patch.site_address {
            Some(Some(site)) => {
                row.insert("site_address_street".into(), Value::String(site.street));
                row.insert("site_address_city".into(), Value::String(site.city));
                row.insert("site_address_postal_code".into(), Value::String(site.postal_code));
            }
            Some(None) => {
                for column in [
                    "site_address_street",
                    "site_address_city",
                    "site_address_postal_code",
                ] {
                    row.insert(column.into(), Value::Null);
                }
            }
            None => {}
        }
        if let Some(v) = patch.planned_start {
            row.insert(
                "planned_start_date".into(),
                v.map_or(Value::Null, |d| Value::String(d.to_string())),
            );
        }
        if let Some(v) = patch.planned_end {
            row.insert(
                "planned_end_date".into(),
                v.map_or(Value::Null, |d| Value::String(d.to_string())),
            );
        }
        if let Some(v) = patch.notes {
            row.insert("notes".into(), opt_string(v));
        }
        if let Some(v) = patch.tags {
            row.insert(
                "tags".into(),
                v.map_or(Value::Null, |tags| {
                    Value::Array(tags.into_iter().map(Value::String).collect())
                }),
            );
        }
        row.insert("updated_at".into(), now_stamp());

        let row = self
            .store
            .update(Table::Projects, *id.as_uuid(), row)
            .await
            .context("failed to update project")?;
        let row = decode::<ProjectRowV1>(PROJECT, row)?;

        tracing::info!(project_id = %id, "project updated");
        self.assemble(vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Missing {
                entity: PROJECT,
                id: id.to_string(),
            })
    }

    /// Delete the project, then its configured products.
    ///
    /// The project row goes first, in one request. The hosted store cascades
    /// to `project_products`, so the sweep that follows finds nothing there.
    /// Stores without the cascade get the sweep; rows it fails to remove only
    /// point at a project that no longer exists and are logged.
    pub async fn delete(&self, id: ProjectId) -> ServiceResult<()> {
        self.store
            .delete(Table::Projects, *id.as_uuid())
            .await
            .context("failed to delete project")?;
        tracing::info!(project_id = %id, "project deleted");

        if let Err(err) = self.sweep_products(id).await {
            tracing::warn!(project_id = %id, error = %err, "configured products left behind");
        }
        Ok(())
    }

    async fn sweep_products(&self, project_id: ProjectId) -> ServiceResult<()> {
        let configured = self
            .store
            .select(&Query::from(Table::ProjectProducts).eq("project_id", project_id))
            .await
            .context("failed to list configured products")?;
        for row in configured {
            let row = decode::<ProjectProductRowV1>(PROJECT_PRODUCT, row)?;
            self.store
                .delete(Table::ProjectProducts, *row.id.as_uuid())
                .await
                .context("failed to delete configured product")?;
        }
        Ok(())
    }

    // ---------------------------------------------------- configured products

    /// Configured products of one project, oldest first.
    pub async fn list_products(&self, project_id: ProjectId) -> ServiceResult<Vec<ProjectProduct>> {
        Ok(self
            .load_products(&[project_id])
            .await?
            .remove(&project_id)
            .unwrap_or_default())
    }

    /// Measure `product_id` into `project_id`.
    ///
    /// The configuration goes through the dimension ruleset first; a rejected
    /// configuration is never written.
    pub async fn add_product(
        &self,
        project_id: ProjectId,
        product_id: ProductId,
        config: ProductConfiguration,
    ) -> ServiceResult<ProjectProduct> {
        let project_exists = !self
            .store
            .select(&Query::from(Table::Projects).eq("id", project_id).limit(1))
            .await
            .context("failed to add product to project")?
            .is_empty();
        if !project_exists {
            return Err(ServiceError::Missing {
                entity: PROJECT,
                id: project_id.to_string(),
            });
        }

        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or_else(|| ServiceError::Missing {
                entity: "product",
                id: product_id.to_string(),
            })?;

        let new = NewProjectProduct::configure(project_id, &product, config)?;
        let payload = ProjectProductInsertV1 {
            project_id: new.project_id(),
            product_id: new.product_id(),
            quantity: new.quantity(),
            dimensions: DimensionsV1::from(new.dimensions()),
            parameters: ParametersV1::from(new.parameters()),
            notes: new.notes().map(str::to_string),
            status: new.status().as_db(),
        };
        let row = self
            .store
            .insert(Table::ProjectProducts, encode(PROJECT_PRODUCT, &payload)?)
            .await
            .context("failed to add product to project")?;

        let configured = decode::<ProjectProductRowV1>(PROJECT_PRODUCT, row)?.into_domain(product);
        tracing::info!(
            project_id = %project_id,
            project_product_id = %configured.id,
            width = configured.dimensions.width,
            height = configured.dimensions.height,
            "product added to project"
        );
        Ok(configured)
    }

    pub async fn set_product_status(
        &self,
        id: ProjectProductId,
        status: ProjectProductStatus,
    ) -> ServiceResult<ProjectProduct> {
        let mut patch = Row::new();
        patch.insert("status".into(), Value::String(status.as_db().to_string()));
        patch.insert("updated_at".into(), now_stamp());

        let row = self
            .store
            .update(Table::ProjectProducts, *id.as_uuid(), patch)
            .await
            .context("failed to update project product")?;
        let row = decode::<ProjectProductRowV1>(PROJECT_PRODUCT, row)?;

        let product = self
            .products
            .get(row.product_id)
            .await?
            .ok_or_else(|| ServiceError::Missing {
                entity: "product",
                id: row.product_id.to_string(),
            })?;
        tracing::info!(project_product_id = %id, status = status.as_db(), "project product status changed");
        Ok(row.into_domain(product))
    }

    pub async fn remove_product(&self, id: ProjectProductId) -> ServiceResult<()> {
        self.store
            .delete(Table::ProjectProducts, *id.as_uuid())
            .await
            .context("failed to remove product from project")?;
        tracing::info!(project_product_id = %id, "product removed from project");
        Ok(())
    }
}
