use std::sync::Arc;

use menuiserie_clients::Client;
use menuiserie_core::{CategoryId, ClientId, ProductId, ProjectId};
use menuiserie_events::{Change, EntityKind, EventBus, EventName};
use menuiserie_infra::{
    ClientService, Config, DataStore, PostgrestStore, ProductService, ProjectService, StoreError,
};
use menuiserie_products::{Product, ProductCategory};
use menuiserie_projects::Project;

use crate::handles::{ClientsHandle, ProductsHandle, ProjectsHandle};
use crate::loaders::{
    AllCategories, AllClients, AllProducts, AllProjects, ClientById, ClientSearch, ProductById,
    ProductsByCategory, ProjectById, ProjectsByClient,
};
use crate::resource::Resource;

/// Services and the event bus, shared by every screen.
#[derive(Clone)]
pub struct AppContext {
    pub bus: Arc<EventBus>,
    pub clients: ClientService,
    pub products: ProductService,
    pub projects: ProjectService,
}

impl AppContext {
    pub fn new(store: Arc<dyn DataStore>, bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            clients: ClientService::new(store.clone()),
            products: ProductService::new(store.clone()),
            projects: ProjectService::new(store),
        }
    }

    /// Context talking to the hosted store described by `config`.
    pub fn connect(config: &Config) -> Result<Self, StoreError> {
        let store = PostgrestStore::new(config)?;
        tracing::info!(url = %config.supabase_url, "data store configured");
        Ok(Self::new(Arc::new(store), Arc::new(EventBus::new())))
    }

    pub fn client_handle(&self) -> ClientsHandle {
        ClientsHandle::new(self.clients.clone(), self.bus.clone())
    }

    pub fn product_handle(&self) -> ProductsHandle {
        ProductsHandle::new(self.products.clone(), self.bus.clone())
    }

    pub fn project_handle(&self) -> ProjectsHandle {
        ProjectsHandle::new(self.projects.clone(), self.bus.clone())
    }

    // Resources. Each one loads on mount and reloads on every change event of
    // its entity.

    pub async fn watch_clients(&self) -> Resource<Vec<Client>> {
        let loader = Arc::new(AllClients(self.clients.clone()));
        Resource::mount(loader, &self.bus, &EventName::all_for(EntityKind::Client)).await
    }

    pub async fn watch_client(&self, id: ClientId) -> Resource<Option<Client>> {
        let loader = Arc::new(ClientById(self.clients.clone(), id));
        Resource::mount(loader, &self.bus, &EventName::all_for(EntityKind::Client)).await
    }

    pub async fn watch_client_search(&self, term: impl Into<String>) -> Resource<Vec<Client>> {
        let loader = Arc::new(ClientSearch(self.clients.clone(), term.into()));
        Resource::mount(loader, &self.bus, &EventName::all_for(EntityKind::Client)).await
    }

    pub async fn watch_products(&self) -> Resource<Vec<Product>> {
        let loader = Arc::new(AllProducts(self.products.clone()));
        Resource::mount(loader, &self.bus, &EventName::all_for(EntityKind::Product)).await
    }

    pub async fn watch_product(&self, id: ProductId) -> Resource<Option<Product>> {
        let loader = Arc::new(ProductById(self.products.clone(), id));
        Resource::mount(loader, &self.bus, &EventName::all_for(EntityKind::Product)).await
    }

    pub async fn watch_products_by_category(&self, id: CategoryId) -> Resource<Vec<Product>> {
        let loader = Arc::new(ProductsByCategory(self.products.clone(), id));
        Resource::mount(loader, &self.bus, &EventName::all_for(EntityKind::Product)).await
    }

    pub async fn watch_categories(&self) -> Resource<Vec<ProductCategory>> {
        let loader = Arc::new(AllCategories(self.products.clone()));
        let refresh = EventName::new(EntityKind::Product, Change::Refresh);
        Resource::mount(loader, &self.bus, &[refresh]).await
    }

    pub async fn watch_projects(&self) -> Resource<Vec<Project>> {
        let loader = Arc::new(AllProjects(self.projects.clone()));
        Resource::mount(loader, &self.bus, &EventName::all_for(EntityKind::Project)).await
    }

    pub async fn watch_project(&self, id: ProjectId) -> Resource<Option<Project>> {
        let loader = Arc::new(ProjectById(self.projects.clone(), id));
        Resource::mount(loader, &self.bus, &EventName::all_for(EntityKind::Project)).await
    }

    pub async fn watch_projects_by_client(&self, id: ClientId) -> Resource<Vec<Project>> {
        let loader = Arc::new(ProjectsByClient(self.projects.clone(), id));
        Resource::mount(loader, &self.bus, &EventName::all_for(EntityKind::Project)).await
    }
}
