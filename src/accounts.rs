//! Accounts subgraph
//!
//! Owns the `User` entity (federated on `id`) and answers customer lookups
//! against a read-only catalog. Nothing here mutates shared state, so
//! requests never need to coordinate with each other.

use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema, ID};

use crate::auth::get_principal;
use crate::federation::{EntityResolver, UserReference, UserReferenceResolver};
use crate::repository::{InMemoryRepository, Repository};
use crate::types::{Customer, User};

pub type AccountsSchema = Schema<AccountsQuery, EmptyMutation, EmptySubscription>;

/// Id of the user returned by `me` when no known principal is attached
pub const DEFAULT_USER_ID: &str = "USER-1";

/// Stores backing the accounts schema
#[derive(Clone)]
pub struct AccountsCatalog {
    pub users: Arc<dyn Repository<User>>,
    pub customers: Arc<dyn Repository<Customer>>,
}

impl AccountsCatalog {
    pub fn new(users: Arc<dyn Repository<User>>, customers: Arc<dyn Repository<Customer>>) -> Self {
        Self { users, customers }
    }

    /// In-memory catalog with the demo users and customers
    pub fn seeded() -> crate::Result<Self> {
        Ok(Self::new(
            Arc::new(InMemoryRepository::from_records(seed_users())),
            Arc::new(InMemoryRepository::from_records(seed_customers()?)),
        ))
    }
}

/// Placeholder identity for callers without a recognised principal
pub fn default_user() -> User {
    User {
        id: ID::from(DEFAULT_USER_ID),
        email: Some("demo.user@example.com".to_string()),
        name: Some("Demo User".to_string()),
        username: Some("demo-user".to_string()),
    }
}

pub fn seed_users() -> Vec<User> {
    vec![
        User {
            id: ID::from("1"),
            email: Some("demo@example.com".to_string()),
            name: None,
            username: Some("demo-user".to_string()),
        },
        default_user(),
    ]
}

type CustomerRecord = (&'static str, &'static str, &'static str, Option<f64>);

const SEED_CUSTOMERS: &[CustomerRecord] = &[
    ("CUST-1001", "Acme Logistics", "ACTIVE", Some(100_000.0)),
    ("CUST-2001", "Global Retail Corp", "ON_HOLD", Some(25_000.0)),
];

pub fn seed_customers() -> crate::Result<Vec<Customer>> {
    customers_from(SEED_CUSTOMERS)
}

/// Build every record or fail on the first invalid one
fn customers_from(records: &[CustomerRecord]) -> crate::Result<Vec<Customer>> {
    records
        .iter()
        .map(|&(id, name, status, limit)| Customer::new(id, name, status, limit))
        .collect()
}

pub struct AccountsQuery;

#[Object(name = "Query")]
impl AccountsQuery {
    /// The calling user
    ///
    /// Never fails: without a known principal this is the default user.
    async fn me(&self, ctx: &Context<'_>) -> Option<User> {
        let Some(principal) = get_principal(ctx) else {
            return Some(default_user());
        };

        let lookup = match ctx.data::<AccountsCatalog>() {
            Ok(catalog) => catalog.users.lookup(&principal.user_id).await,
            Err(err) => {
                tracing::error!(error = ?err, "accounts catalog missing from schema data");
                return Some(default_user());
            }
        };

        match lookup {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::debug!(principal = %principal.user_id.as_str(), "unknown principal, using default user");
                Some(default_user())
            }
            Err(err) => {
                tracing::warn!(error = %err, "user lookup failed, using default user");
                Some(default_user())
            }
        }
    }

    /// Customer by exact id, null when there is no such customer
    async fn customer(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<Customer>> {
        let catalog = ctx.data::<AccountsCatalog>()?;
        Ok(catalog.customers.lookup(&id).await?)
    }

    #[graphql(entity)]
    async fn find_user_by_id(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<User>> {
        let resolver = ctx.data::<UserReferenceResolver>()?;
        Ok(resolver.resolve_reference(&UserReference { id }).await?)
    }
}

/// Build the federated accounts schema
pub fn build_schema(catalog: AccountsCatalog, introspection: bool) -> AccountsSchema {
    let resolver = UserReferenceResolver::new(catalog.users.clone());
    let builder = Schema::build(AccountsQuery, EmptyMutation, EmptySubscription)
        .enable_federation()
        .data(catalog)
        .data(resolver);

    if introspection {
        builder.finish()
    } else {
        builder.disable_introspection().finish()
    }
}
