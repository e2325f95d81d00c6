use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{DataStore, Direction, Filter, Query, Row, StoreError, Table};

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<Table, Vec<Row>>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps, so creation order is observable even
    /// when two inserts land in the same clock tick.
    fn next_stamp(&mut self) -> String {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

/// In-memory row store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held in `table`.
    pub fn row_count(&self, table: Table) -> usize {
        self.tables
            .read()
            .map(|t| t.rows.get(&table).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

fn id_of(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn matches(row: &Row, query: &Query) -> bool {
    let filters_ok = query.filters.iter().all(|filter| match filter {
        Filter::Eq { column, value } => {
            row.get(*column).and_then(text_of).as_deref() == Some(value.as_str())
        }
        Filter::In { column, values } => row
            .get(*column)
            .and_then(text_of)
            .is_some_and(|v| values.contains(&v)),
    });
    if !filters_ok {
        return false;
    }

    match &query.search {
        None => true,
        Some(search) => {
            let needle = search.term.to_lowercase();
            search.columns.iter().any(|column| {
                row.get(*column)
                    .and_then(text_of)
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            })
        }
    }
}

/// Nulls sort last, like PostgreSQL's default for ascending order.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait::async_trait]
impl DataStore for InMemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;

        let mut rows: Vec<Row> = tables
            .rows
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| matches(r, query)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(order.column), b.get(order.column));
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert(&self, table: Table, mut row: Row) -> Result<Row, StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;

        if id_of(&row).is_none() {
            row.insert("id".to_string(), Value::String(Uuid::now_v7().to_string()));
        }
        let stamp = tables.next_stamp();
        row.entry("created_at")
            .or_insert_with(|| Value::String(stamp.clone()));
        row.entry("updated_at").or_insert(Value::String(stamp));

        tables.rows.entry(table).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        let stamp = tables.next_stamp();
        let key = id.to_string();

        let row = tables
            .rows
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| id_of(r) == Some(key.as_str())))
            .ok_or(StoreError::NotFound { table, id })?;

        let touched = patch.contains_key("updated_at");
        for (column, value) in patch {
            row.insert(column, value);
        }
        if !touched {
            row.insert("updated_at".to_string(), Value::String(stamp));
        }

        Ok(row.clone())
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        let key = id.to_string();
        if let Some(rows) = tables.rows.get_mut(&table) {
            rows.retain(|r| id_of(r) != Some(key.as_str()));
        }
        Ok(())
    }
}
