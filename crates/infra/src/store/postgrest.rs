use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;

use super::{DataStore, Query, Row, StoreError, Table};

/// Row store backed by the hosted PostgREST endpoint (`{url}/rest/v1`).
#[derive(Clone)]
pub struct PostgrestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl core::fmt::Debug for PostgrestStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PostgrestStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

impl PostgrestStore {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: format!("{}/rest/v1", config.supabase_url),
            api_key: config.supabase_anon_key.clone(),
        })
    }

    pub fn table_url(&self, table: Table) -> String {
        format!("{}/{}", self.base_url, table.as_str())
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(api_error(status.as_u16(), &body))
    }

    async fn rows(response: Response) -> Result<Vec<Row>, StoreError> {
        let value: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        decode_rows(value)
    }
}

fn api_error(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => {
            let mut message = err.message.unwrap_or_else(|| body.to_string());
            if let Some(details) = err.details.filter(|d| !d.is_empty()) {
                message = format!("{message} ({details})");
            }
            StoreError::Api {
                status,
                code: err.code,
                message,
            }
        }
        Err(_) => StoreError::Api {
            status,
            code: None,
            message: body.to_string(),
        },
    }
}

fn decode_rows(value: Value) -> Result<Vec<Row>, StoreError> {
    let Value::Array(items) = value else {
        return Err(StoreError::Decode("expected a JSON array of rows".to_string()));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(row) => Ok(row),
            other => Err(StoreError::Decode(format!("expected a row object, got {other}"))),
        })
        .collect()
}

#[async_trait::async_trait]
impl DataStore for PostgrestStore {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(table = %query.table, params = ?query.to_params(), "select");
        let request = self
            .request(Method::GET, query.table)
            .query(&query.to_params());
        Self::rows(self.send(request).await?).await
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        tracing::debug!(%table, "insert");
        let request = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&row);
        Self::rows(self.send(request).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError> {
        tracing::debug!(%table, %id, "update");
        let request = self
            .request(Method::PATCH, table)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&patch);
        Self::rows(self.send(request).await?)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound { table, id })
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        tracing::debug!(%table, %id, "delete");
        let request = self
            .request(Method::DELETE, table)
            .query(&[("id", format!("eq.{id}"))]);
        self.send(request).await?;
        Ok(())
    }
}
