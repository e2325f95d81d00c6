//! Mutation entry points.
//!
//! Each handle performs the write through its service and, once it succeeded,
//! announces it on the bus so mounted resources reload.

use std::sync::Arc;

use menuiserie_clients::{Client, ClientPatch, NewClient};
use menuiserie_core::{ClientId, ProductId, ProjectId, ProjectProductId};
use menuiserie_events::{EntityKind, EventBus};
use menuiserie_infra::{ClientService, ProductService, ProjectService, ServiceError};
use menuiserie_products::{NewCategory, NewProduct, Product, ProductCategory, ProductPatch};
use menuiserie_projects::{
    NewProject, ProductConfiguration, Project, ProjectPatch, ProjectProduct, ProjectProductStatus,
};

#[derive(Clone)]
pub struct ClientsHandle {
    service: ClientService,
    bus: Arc<EventBus>,
}

impl ClientsHandle {
    pub fn new(service: ClientService, bus: Arc<EventBus>) -> Self {
        Self { service, bus }
    }

    pub async fn create(&self, new: NewClient) -> Result<Client, ServiceError> {
        let client = self.service.create(new).await?;
        self.bus.entity(EntityKind::Client).created(&client);
        Ok(client)
    }

    pub async fn update(&self, id: ClientId, patch: ClientPatch) -> Result<Client, ServiceError> {
        let client = self.service.update(id, patch).await?;
        self.bus.entity(EntityKind::Client).updated(&client);
        Ok(client)
    }

    pub async fn delete(&self, id: ClientId) -> Result<(), ServiceError> {
        self.service.delete(id).await?;
        self.bus.entity(EntityKind::Client).deleted(&id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct ProductsHandle {
    service: ProductService,
    bus: Arc<EventBus>,
}

impl ProductsHandle {
    pub fn new(service: ProductService, bus: Arc<EventBus>) -> Self {
        Self { service, bus }
    }

    pub async fn create(&self, new: NewProduct) -> Result<Product, ServiceError> {
        let product = self.service.create(new).await?;
        self.bus.entity(EntityKind::Product).created(&product);
        Ok(product)
    }

    pub async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, ServiceError> {
        let product = self.service.update(id, patch).await?;
        self.bus.entity(EntityKind::Product).updated(&product);
        Ok(product)
    }

    pub async fn delete(&self, id: ProductId) -> Result<(), ServiceError> {
        self.service.delete(id).await?;
        self.bus.entity(EntityKind::Product).deleted(&id);
        Ok(())
    }

    /// Categories have no events of their own; the catalog is refreshed.
    pub async fn create_category(&self, new: NewCategory) -> Result<ProductCategory, ServiceError> {
        let category = self.service.create_category(new).await?;
        self.bus.entity(EntityKind::Product).refresh();
        Ok(category)
    }
}

#[derive(Clone)]
pub struct ProjectsHandle {
    service: ProjectService,
    bus: Arc<EventBus>,
}

impl ProjectsHandle {
    pub fn new(service: ProjectService, bus: Arc<EventBus>) -> Self {
        Self { service, bus }
    }

    pub async fn create(&self, new: NewProject) -> Result<Project, ServiceError> {
        let project = self.service.create(new).await?;
        self.bus.entity(EntityKind::Project).created(&project);
        Ok(project)
    }

    pub async fn update(&self, id: ProjectId, patch: ProjectPatch) -> Result<Project, ServiceError> {
        let project = self.service.update(id, patch).await?;
        self.bus.entity(EntityKind::Project).updated(&project);
        Ok(project)
    }

    pub async fn delete(&self, id: ProjectId) -> Result<(), ServiceError> {
        self.service.delete(id).await?;
        self.bus.entity(EntityKind::Project).deleted(&id);
        Ok(())
    }

    /// Configure a catalog product into a project.
    ///
    /// A configuration refused by the dimension ruleset comes back as
    /// [`ServiceError::Rejected`]; nothing is written or published then.
    pub async fn add_product(
        &self,
        project_id: ProjectId,
        product_id: ProductId,
        config: ProductConfiguration,
    ) -> Result<ProjectProduct, ServiceError> {
        let configured = self
            .service
            .add_product(project_id, product_id, config)
            .await?;
        self.bus.entity(EntityKind::Project).updated(&configured);
        Ok(configured)
    }

    pub async fn set_product_status(
        &self,
        id: ProjectProductId,
        status: ProjectProductStatus,
    ) -> Result<ProjectProduct, ServiceError> {
        let configured = self.service.set_product_status(id, status).await?;
        self.bus.entity(EntityKind::Project).updated(&configured);
        Ok(configured)
    }

    pub async fn remove_product(&self, id: ProjectProductId) -> Result<(), ServiceError> {
        self.service.remove_product(id).await?;
        self.bus.entity(EntityKind::Project).refresh();
        Ok(())
    }
}
