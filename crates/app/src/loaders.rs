//! Loaders backing the stock resources.

use menuiserie_clients::Client;
use menuiserie_core::{CategoryId, ClientId, ProductId, ProjectId};
use menuiserie_infra::{ClientService, ProductService, ProjectService, ServiceError};
use menuiserie_products::{Product, ProductCategory};
use menuiserie_projects::Project;

use crate::resource::Loader;

pub struct AllClients(pub ClientService);

#[async_trait::async_trait]
impl Loader<Vec<Client>> for AllClients {
    async fn load(&self) -> Result<Vec<Client>, ServiceError> {
        self.0.list().await
    }
}

pub struct ClientById(pub ClientService, pub ClientId);

#[async_trait::async_trait]
impl Loader<Option<Client>> for ClientById {
    async fn load(&self) -> Result<Option<Client>, ServiceError> {
        self.0.get(self.1).await
    }
}

/// An empty term lists every client.
pub struct ClientSearch(pub ClientService, pub String);

#[async_trait::async_trait]
impl Loader<Vec<Client>> for ClientSearch {
    async fn load(&self) -> Result<Vec<Client>, ServiceError> {
        if self.1.trim().is_empty() {
            self.0.list().await
        } else {
            self.0.search(&self.1).await
        }
    }
}

pub struct AllProducts(pub ProductService);

#[async_trait::async_trait]
impl Loader<Vec<Product>> for AllProducts {
    async fn load(&self) -> Result<Vec<Product>, ServiceError> {
        self.0.list().await
    }
}

pub struct ProductById(pub ProductService, pub ProductId);

#[async_trait::async_trait]
impl Loader<Option<Product>> for ProductById {
    async fn load(&self) -> Result<Option<Product>, ServiceError> {
        self.0.get(self.1).await
    }
}

pub struct ProductsByCategory(pub ProductService, pub CategoryId);

#[async_trait::async_trait]
impl Loader<Vec<Product>> for ProductsByCategory {
    async fn load(&self) -> Result<Vec<Product>, ServiceError> {
        self.0.list_by_category(self.1).await
    }
}

pub struct AllCategories(pub ProductService);

#[async_trait::async_trait]
impl Loader<Vec<ProductCategory>> for AllCategories {
    async fn load(&self) -> Result<Vec<ProductCategory>, ServiceError> {
        self.0.list_categories().await
    }
}

pub struct AllProjects(pub ProjectService);

#[async_trait::async_trait]
impl Loader<Vec<Project>> for AllProjects {
    async fn load(&self) -> Result<Vec<Project>, ServiceError> {
        self.0.list().await
    }
}

pub struct ProjectById(pub ProjectService, pub ProjectId);

#[async_trait::async_trait]
impl Loader<Option<Project>> for ProjectById {
    async fn load(&self) -> Result<Option<Project>, ServiceError> {
        self.0.get(self.1).await
    }
}

pub struct ProjectsByClient(pub ProjectService, pub ClientId);

#[async_trait::async_trait]
impl Loader<Vec<Project>> for ProjectsByClient {
    async fn load(&self) -> Result<Vec<Project>, ServiceError> {
        self.0.list_by_client(self.1).await
    }
}
