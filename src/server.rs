//! HTTP surface shared by both servers

use async_graphql::{ObjectType, Schema, SubscriptionType};
use axum::{
    extract::Extension,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::auth::graphql_handler;
use crate::config::ServerConfig;
use crate::SubgraphError;

/// Path polled by load balancers and the federation gateway
pub const HEALTH_PATH: &str = "/.well-known/apollo/server-health";

/// Router serving `schema` over GraphQL-over-HTTP
///
/// GraphQL is accepted at both `/` and `/graphql`.
pub fn router<Query, Mutation, Subscription>(schema: Schema<Query, Mutation, Subscription>) -> Router
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    Router::new()
        .route("/", post(graphql_handler::<Query, Mutation, Subscription>))
        .route("/graphql", post(graphql_handler::<Query, Mutation, Subscription>))
        .route(HEALTH_PATH, get(health))
        .layer(Extension(schema))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "pass" }))
}

/// Bind the configured address and serve `app` until SIGINT/SIGTERM
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve(config: &ServerConfig, app: Router, service: &str) -> crate::Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| SubgraphError::Startup(format!("failed to bind {}: {}", addr, e)))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| SubgraphError::Startup(e.to_string()))?;
    tracing::info!(service, url = %format!("http://{}/", local_addr), "server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SubgraphError::Startup(format!("server error: {}", e)))?;

    tracing::info!(service, "server stopped");
    Ok(())
}

/// Resolves when the process receives SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT received: shutting down..."),
        _ = terminate => tracing::info!("SIGTERM received: shutting down..."),
    }
}
