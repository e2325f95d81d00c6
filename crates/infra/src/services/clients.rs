use std::sync::Arc;

use serde_json::Value;

use menuiserie_clients::{Client, ClientPatch, NewClient};
use menuiserie_core::ClientId;

use super::rows::{ClientInsertV1, ClientRowV1, decode, encode};
use super::{ServiceResult, StoreContext, now_stamp};
use crate::store::{DataStore, Direction, Query, Row, Table};

const ENTITY: &str = "client";
const SEARCH_COLUMNS: [&str; 4] = ["last_name", "first_name", "company", "email"];

/// Clients table access.
#[derive(Clone)]
pub struct ClientService {
    store: Arc<dyn DataStore>,
}

impl ClientService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    fn map(rows: Vec<Row>) -> ServiceResult<Vec<Client>> {
        rows.into_iter()
            .map(|row| decode::<ClientRowV1>(ENTITY, row).map(ClientRowV1::into_domain))
            .collect()
    }

    /// All clients, newest first.
    pub async fn list(&self) -> ServiceResult<Vec<Client>> {
        let query = Query::from(Table::Clients).order_by("created_at", Direction::Desc);
        let rows = self
            .store
            .select(&query)
            .await
            .context("failed to load clients")?;
        Self::map(rows)
    }

    pub async fn get(&self, id: ClientId) -> ServiceResult<Option<Client>> {
        let query = Query::from(Table::Clients).eq("id", id).limit(1);
        let rows = self
            .store
            .select(&query)
            .await
            .context("failed to load client")?;
        Ok(Self::map(rows)?.into_iter().next())
    }

    /// Clients whose last name, first name, company or email contains `term`.
    pub async fn search(&self, term: &str) -> ServiceResult<Vec<Client>> {
        let query = Query::from(Table::Clients)
            .search(&SEARCH_COLUMNS, term.trim())
            .order_by("created_at", Direction::Desc);
        let rows = self
            .store
            .select(&query)
            .await
            .context("failed to search clients")?;
        Self::map(rows)
    }

    pub async fn create(&self, new: NewClient) -> ServiceResult<Client> {
        let payload = ClientInsertV1 {
            first_name: new.first_name.unwrap_or_default(),
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            company: new.company.filter(|c| !c.trim().is_empty()),
            address_street: new.address.street,
            address_city: new.address.city,
            address_postal_code: new.address.postal_code,
            address_country: new.address.country,
        };
        let row = self
            .store
            .insert(Table::Clients, encode(ENTITY, &payload)?)
            .await
            .context("failed to create client")?;

        let client = decode::<ClientRowV1>(ENTITY, row)?.into_domain();
        tracing::info!(client_id = %client.id, "client created");
        Ok(client)
    }

    /// Apply `patch`; untouched fields keep their stored value.
    pub async fn update(&self, id: ClientId, patch: ClientPatch) -> ServiceResult<Client> {
        let mut row = Row::new();
        if let Some(v) = patch.last_name {
            row.insert("last_name".into(), Value::String(v));
        }
        if let Some(v) = patch.first_name {
            row.insert("first_name".into(), Value::String(v));
        }
        if let Some(company) = patch.company {
            let company = company.filter(|c| !c.trim().is_empty());
            row.insert("company".into(), company.map_or(Value::Null, Value::String));
        }
        if let Some(v) = patch.email {
            row.insert("email".into(), Value::String(v));
        }
        if let Some(v) = patch.phone {
            row.insert("phone".into(), Value::String(v));
        }
        if let Some(address) = patch.address {
            row.insert("address_street".into(), Value::String(address.street));
            row.insert("address_city".into(), Value::String(address.city));
            row.insert("address_postal_code".into(), Value::String(address.postal_code));
            row.insert("address_country".into(), Value::String(address.country));
        }
        row.insert("updated_at".into(), now_stamp());

        let row = self
            .store
            .update(Table::Clients, *id.as_uuid(), row)
            .await
            .context("failed to update client")?;

        tracing::info!(client_id = %id, "client updated");
        Ok(decode::<ClientRowV1>(ENTITY, row)?.into_domain())
    }

    pub async fn delete(&self, id: ClientId) -> ServiceResult<()> {
        self.store
            .delete(Table::Clients, *id.as_uuid())
            .await
            .context("failed to delete client")?;
        tracing::info!(client_id = %id, "client deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use crate::store::{InMemoryStore, StoreError};
    use menuiserie_core::PostalAddress;

    fn service() -> ClientService {
        ClientService::new(Arc::new(InMemoryStore::new()))
    }

    fn new_client(last_name: &str, company: Option<&str>) -> NewClient {
        NewClient {
            last_name: last_name.to_string(),
            first_name: Some("Jean".to_string()),
            company: company.map(str::to_string),
            email: format!("{}@example.fr", last_name.to_lowercase()),
            phone: "06 00 00 00 00".to_string(),
            address: PostalAddress::new("1 rue de la Paix", "Paris", "75002", "France"),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let service = service();
        let created = service.create(new_client("Girard", None)).await.unwrap();

        let fetched = service.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.first_name, "Jean");
        assert_eq!(fetched.address.country, "France");
    }

    #[tokio::test]
    async fn get_of_unknown_id_is_none() {
        assert_eq!(service().get(ClientId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let service = service();
        service.create(new_client("Blanc", None)).await.unwrap();
        service.create(new_client("Noir", None)).await.unwrap();

        let names: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.last_name)
            .collect();
        assert_eq!(names, vec!["Noir".to_string(), "Blanc".to_string()]);
    }

    #[tokio::test]
    async fn search_matches_company_case_insensitively() {
        let service = service();
        service
            .create(new_client("Faure", Some("Menuiserie Faure & Fils")))
            .await
            .unwrap();
        service.create(new_client("Garnier", None)).await.unwrap();

        let hits = service.search("menuiserie").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].last_name, "Faure");
    }

    #[tokio::test]
    async fn update_changes_only_given_fields_and_can_clear_company() {
        let service = service();
        let created = service
            .create(new_client("Chevalier", Some("Chevalier SARL")))
            .await
            .unwrap();

        let updated = service
            .update(
                created.id,
                ClientPatch {
                    phone: Some("07 11 22 33 44".to_string()),
                    company: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.phone, "07 11 22 33 44");
        assert_eq!(updated.company, None);
        assert_eq!(updated.last_name, "Chevalier");
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_of_unknown_client_reports_the_operation() {
        let err = service()
            .update(ClientId::new(), ClientPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Store {
                context: "failed to update client",
                source: StoreError::NotFound { .. }
            }
        ));
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let service = service();
        let created = service.create(new_client("Lambert", None)).await.unwrap();
        service.delete(created.id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }
}
