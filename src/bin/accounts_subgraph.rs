use anyhow::Context;
use energy_subgraphs::{accounts, server, telemetry, AccountsCatalog, ServerConfig};

const SERVICE: &str = "accounts-subgraph";

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

    let catalog = AccountsCatalog::seeded().context("invalid customer catalog")?;
    let schema = accounts::build_schema(catalog, config.introspection);
    let app = server::router(schema);

    server::serve(&config, app, SERVICE)
        .await
        .context("accounts subgraph terminated")
}
