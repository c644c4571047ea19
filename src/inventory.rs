//! Fuel inventory API
//!
//! A plain (non-federated) schema exposing the fuel inventory as a bounded,
//! cursor-paginated list.

use std::cmp::Ordering;
use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema, SimpleObject, ID};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::pagination::{Connection, PaginationInput};

pub type EnergySchema = Schema<InventoryQuery, EmptyMutation, EmptySubscription>;

/// One row of the inventory table
#[derive(SimpleObject, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelInventory {
    pub id: ID,
    #[graphql(name = "type")]
    #[serde(rename = "type")]
    pub fuel_type: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
}

impl FuelInventory {
    pub fn new(id: impl Into<String>, fuel_type: &str, quantity: f64, price: f64) -> Self {
        Self {
            id: ID(id.into()),
            fuel_type: Some(fuel_type.to_string()),
            quantity: Some(quantity),
            price: Some(price),
        }
    }
}

/// Source of inventory rows
///
/// Implementations must return rows in a stable order so that offset cursors
/// stay meaningful between pages. Rows are ordered by id: integer ids
/// numerically, as `ORDER BY id` does on an integer column, and anything
/// else lexically after them.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn page(&self, pagination: &PaginationInput) -> crate::Result<Connection<FuelInventory>>;
}

/// Fixed inventory held in memory, ordered by id
#[derive(Debug, Clone)]
pub struct InMemoryInventory {
    rows: Arc<Vec<FuelInventory>>,
}

impl InMemoryInventory {
    pub fn new(mut rows: Vec<FuelInventory>) -> Self {
        rows.sort_by(|a, b| compare_ids(a.id.as_str(), b.id.as_str()));
        Self { rows: Arc::new(rows) }
    }
}

/// Integer ids sort numerically ahead of any other id, which sort as strings
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

impl Default for InMemoryInventory {
    fn default() -> Self {
        Self::new(seed_inventory())
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventory {
    async fn page(&self, pagination: &PaginationInput) -> crate::Result<Connection<FuelInventory>> {
        let total = self.rows.len() as u64;
        let window = pagination.window(total)?;

        let start = window.offset as usize;
        let end = start + window.limit as usize;
        let rows = self.rows[start..end].to_vec();

        Ok(Connection::from_window(rows, window, total))
    }
}

/// Inventory served when no database is configured
pub fn seed_inventory() -> Vec<FuelInventory> {
    vec![
        FuelInventory::new("1", "Diesel", 12_500.0, 3.89),
        FuelInventory::new("2", "Unleaded 87", 20_000.0, 3.29),
        FuelInventory::new("3", "Premium 93", 8_000.0, 3.99),
        FuelInventory::new("4", "Jet A", 45_000.0, 5.12),
        FuelInventory::new("5", "Kerosene", 2_750.0, 4.45),
    ]
}

pub struct InventoryQuery;

#[Object(name = "Query")]
impl InventoryQuery {
    /// Inventory rows, at most one page per call
    async fn get_inventory(
        &self,
        ctx: &Context<'_>,
        pagination: Option<PaginationInput>,
    ) -> async_graphql::Result<Connection<FuelInventory>> {
        let store = ctx.data::<Arc<dyn InventoryStore>>()?;
        let pagination = pagination.unwrap_or_default();

        let page = store.page(&pagination).await.map_err(|err| {
            tracing::warn!(error = %err, "inventory page failed");
            err
        })?;

        tracing::debug!(rows = page.edges.len(), "inventory page served");
        Ok(page)
    }
}

/// Build the energy API schema around an inventory store
pub fn build_schema(store: Arc<dyn InventoryStore>, introspection: bool) -> EnergySchema {
    let builder = Schema::build(InventoryQuery, EmptyMutation, EmptySubscription).data(store);

    if introspection {
        builder.finish()
    } else {
        builder.disable_introspection().finish()
    }
}
