use std::sync::Arc;

use anyhow::Context;
use energy_subgraphs::{inventory, server, telemetry, InMemoryInventory, InventoryStore, ServerConfig};

const SERVICE: &str = "energy-api";

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(service = SERVICE, error = ?err, "failed to start server");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();
    telemetry::init(config.as_ref().map(|c| c.log_format).unwrap_or_default());
    let config = config.context("invalid configuration")?;

    let store = inventory_store(&config)?;
    let schema = inventory::build_schema(store, config.introspection);
    let app = server::router(schema);

    server::serve(&config, app, SERVICE)
        .await
        .context("energy api terminated")
}

#[cfg(feature = "postgres")]
fn inventory_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn InventoryStore>> {
    match &config.database_url {
        Some(url) => {
            tracing::info!(max_connections = config.database_max_connections, "using postgres inventory");
            let store = energy_subgraphs::PostgresInventory::connect_lazy(url, config.database_max_connections)
                .context("invalid DATABASE_URL")?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; serving in-memory inventory");
            Ok(Arc::new(InMemoryInventory::default()))
        }
    }
}

#[cfg(not(feature = "postgres"))]
fn inventory_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn InventoryStore>> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL set but built without the postgres feature; ignoring it");
    }
    Ok(Arc::new(InMemoryInventory::default()))
}
