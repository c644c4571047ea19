//! GraphQL request context extraction
//!
//! Provides helpers for:
//! - Extracting the calling principal from HTTP headers
//! - Reading it back inside resolvers
//! - A standard Axum handler for GraphQL endpoints that wires both together

use async_graphql::{Context, ObjectType, Request, Response, Schema, SubscriptionType, ID};
use axum::{extract::Extension, http::HeaderMap, Json};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the id of the calling user
pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity of the caller attached to a GraphQL request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: ID,
}

/// Extract the principal from the x-user-id header
///
/// Missing, non-UTF-8 or blank values mean "no principal".
pub fn extract_principal(headers: &HeaderMap) -> Option<Principal> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Principal { user_id: ID::from(s) })
}

/// Standard GraphQL handler with principal injection
///
/// Runs every request inside a `graphql_request` span tagged with a fresh
/// request id.
///
/// # Example
///
/// ```rust,no_run
/// use async_graphql::{EmptyMutation, EmptySubscription};
/// use axum::{routing::post, Extension, Router};
/// use energy_subgraphs::accounts::{self, AccountsQuery};
/// use energy_subgraphs::auth::graphql_handler;
///
/// # fn main() -> energy_subgraphs::Result<()> {
/// let schema = accounts::build_schema(accounts::AccountsCatalog::seeded()?, true);
/// let app: Router = Router::new()
///     .route("/graphql", post(graphql_handler::<AccountsQuery, EmptyMutation, EmptySubscription>))
///     .layer(Extension(schema));
/// # Ok(())
/// # }
/// ```
pub async fn graphql_handler<Query, Mutation, Subscription>(
    Extension(schema): Extension<Schema<Query, Mutation, Subscription>>,
    headers: HeaderMap,
    req: Json<Request>,
) -> Json<Response>
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    let mut request = req.0;
    let principal = extract_principal(&headers);

    let span = tracing::info_span!(
        "graphql_request",
        request_id = %Uuid::new_v4(),
        operation = request.operation_name.as_deref().unwrap_or("anonymous"),
        principal = principal.as_ref().map(|p| p.user_id.as_str()).unwrap_or("-"),
    );

    if let Some(principal) = principal {
        request = request.data(principal);
    }

    let response = schema.execute(request).instrument(span.clone()).await;

    span.in_scope(|| {
        if response.errors.is_empty() {
            tracing::info!("graphql request completed");
        } else {
            tracing::warn!(errors = response.errors.len(), "graphql request completed with errors");
        }
    });

    Json(response)
}

/// Get the principal from GraphQL context
///
/// # Example
///
/// ```rust,no_run
/// use async_graphql::Context;
/// use energy_subgraphs::auth::{get_principal, Principal};
///
/// fn resolver<'a>(ctx: &'a Context<'_>) -> Option<&'a Principal> {
///     get_principal(ctx)
/// }
/// ```
pub fn get_principal<'a>(ctx: &'a Context<'_>) -> Option<&'a Principal> {
    ctx.data_opt::<Principal>()
}
