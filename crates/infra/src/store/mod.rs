//! Row store abstraction.
//!
//! The hosted database is reached through a PostgREST-style API: rows are flat
//! JSON objects keyed in snake_case, queried per table with equality filters,
//! an OR of case-insensitive pattern matches, one ordering and a limit.

mod in_memory;
mod postgrest;

pub use in_memory::InMemoryStore;
pub use postgrest::PostgrestStore;

use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// One stored row.
pub type Row = Map<String, Value>;

/// Tables of the hosted schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Clients,
    ProductCategories,
    Products,
    Projects,
    ProjectProducts,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Clients,
        Table::ProductCategories,
        Table::Products,
        Table::Projects,
        Table::ProjectProducts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Clients => "clients",
            Table::ProductCategories => "product_categories",
            Table::Products => "products",
            Table::Projects => "projects",
            Table::ProjectProducts => "project_products",
        }
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: &'static str, value: String },
    In { column: &'static str, values: Vec<String> },
}

/// Case-insensitive substring match on any of `columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    pub columns: Vec<&'static str>,
    pub term: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub direction: Direction,
}

/// A row selection against one table.
///
/// ```
/// use menuiserie_infra::store::{Direction, Query, Table};
///
/// let query = Query::from(Table::Clients)
///     .search(&["last_name", "email"], "martin")
///     .order_by("created_at", Direction::Desc)
///     .limit(5);
/// assert_eq!(query.table, Table::Clients);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub search: Option<Search>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            search: None,
            order: None,
            limit: None,
        }
    }

    pub fn eq(mut self, column: &'static str, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq {
            column,
            value: value.to_string(),
        });
        self
    }

    pub fn is_in<I, V>(mut self, column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.filters.push(Filter::In {
            column,
            values: values.into_iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn search(mut self, columns: &[&'static str], term: impl Into<String>) -> Self {
        self.search = Some(Search {
            columns: columns.to_vec(),
            term: term.into(),
        });
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.order = Some(Order { column, direction });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query-string pairs in PostgREST syntax.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];

        for filter in &self.filters {
            match filter {
                Filter::Eq { column, value } => {
                    params.push((column.to_string(), format!("eq.{value}")));
                }
                Filter::In { column, values } => {
                    let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
                    params.push((column.to_string(), format!("in.({})", quoted.join(","))));
                }
            }
        }

        if let Some(search) = &self.search {
            let pattern = quote(&format!("*{}*", search.term));
            let clauses: Vec<String> = search
                .columns
                .iter()
                .map(|column| format!("{column}.ilike.{pattern}"))
                .collect();
            params.push(("or".to_string(), format!("({})", clauses.join(","))));
        }

        if let Some(order) = &self.order {
            let dir = match order.direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            params.push(("order".to_string(), format!("{}.{dir}", order.column)));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}

/// Values containing PostgREST delimiters must be double-quoted.
fn quote(value: &str) -> String {
    if value.contains([',', '(', ')', '"', '\\', ':']) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),

    #[error("store error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("unreadable response: {0}")]
    Decode(String),

    #[error("no row with id {id} in {table}")]
    NotFound { table: Table, id: Uuid },

    #[error("store lock poisoned")]
    Poisoned,
}

/// Async row store.
///
/// `insert` and `update` return the row as stored, including the generated
/// `id` and timestamps. `delete` of an absent row is not an error.
#[async_trait::async_trait]
pub trait DataStore: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError>;

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_follow_postgrest_syntax() {
        let id = Uuid::nil();
        let params = Query::from(Table::ProjectProducts)
            .eq("project_id", id)
            .order_by("created_at", Direction::Asc)
            .limit(2)
            .to_params();

        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("project_id".to_string(), format!("eq.{id}")),
                ("order".to_string(), "created_at.asc".to_string()),
                ("limit".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn search_becomes_an_or_of_ilike() {
        let params = Query::from(Table::Clients)
            .search(&["last_name", "company"], "dupont")
            .to_params();
        assert!(params.contains(&(
            "or".to_string(),
            "(last_name.ilike.*dupont*,company.ilike.*dupont*)".to_string()
        )));
    }

    #[test]
    fn search_terms_with_delimiters_are_quoted() {
        let params = Query::from(Table::Projects)
            .search(&["name"], "lot (A), bis")
            .to_params();
        assert!(params.contains(&(
            "or".to_string(),
            "(name.ilike.\"*lot (A), bis*\")".to_string()
        )));
    }

    #[test]
    fn in_filter_lists_values() {
        let params = Query::from(Table::Clients)
            .is_in("id", ["a", "b"])
            .to_params();
        assert!(params.contains(&("id".to_string(), "in.(a,b)".to_string())));
    }
}
