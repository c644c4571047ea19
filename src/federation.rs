//! Apollo Federation v2 utilities

use std::sync::Arc;

use async_graphql::dataloader::DataLoader;
use async_graphql::{ObjectType, Schema, SDLExportOptions, SubscriptionType, ID};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repository::{Repository, RepositoryLoader};
use crate::types::User;

/// Entity resolver trait for Apollo Federation
///
/// Resolution must be a pure function of the reference: the gateway is free
/// to ask for the same entity several times while it stitches a response.
#[async_trait]
pub trait EntityResolver: Send + Sync {
    /// Key fields sent by the gateway
    type Reference: Send + Sync;
    /// Fully populated entity
    type Entity: Send;

    /// Resolve entity by key, `None` when the key is unknown
    async fn resolve_reference(&self, reference: &Self::Reference) -> crate::Result<Option<Self::Entity>>;
}

/// `{ id }` representation of a `User` owned by this subgraph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserReference {
    pub id: ID,
}

impl From<ID> for UserReference {
    fn from(id: ID) -> Self {
        Self { id }
    }
}

/// Resolves `User` references through a batching loader
pub struct UserReferenceResolver {
    loader: DataLoader<RepositoryLoader<User>>,
}

impl UserReferenceResolver {
    pub fn new(users: Arc<dyn Repository<User>>) -> Self {
        Self {
            loader: DataLoader::new(RepositoryLoader::new(users), tokio::spawn),
        }
    }
}

#[async_trait]
impl EntityResolver for UserReferenceResolver {
    type Reference = UserReference;
    type Entity = User;

    async fn resolve_reference(&self, reference: &UserReference) -> crate::Result<Option<User>> {
        let user = self.loader.load_one(reference.id.clone()).await?;
        if user.is_none() {
            tracing::debug!(id = %reference.id.as_str(), "unknown user reference");
        }
        Ok(user)
    }
}

/// Export the subgraph SDL the way a federation gateway consumes it
///
/// Includes the `@link` header and `@key` directives, and leaves out the
/// `_entities`/`_service` plumbing fields.
pub fn subgraph_sdl<Query, Mutation, Subscription>(schema: &Schema<Query, Mutation, Subscription>) -> String
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    schema.sdl_with_options(SDLExportOptions::new().federation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    fn resolver() -> UserReferenceResolver {
        let users = InMemoryRepository::from_records(vec![User {
            id: ID::from("1"),
            email: Some("demo@example.com".to_string()),
            name: None,
            username: Some("demo-user".to_string()),
        }]);
        UserReferenceResolver::new(Arc::new(users))
    }

    #[tokio::test]
    async fn test_resolve_known_reference() {
        let resolver = resolver();
        let user = resolver
            .resolve_reference(&UserReference::from(ID::from("1")))
            .await
            .unwrap()
            .expect("user 1 exists");
        assert_eq!(user.username.as_deref(), Some("demo-user"));
    }

    #[tokio::test]
    async fn test_resolve_unknown_reference_is_none() {
        let resolver = resolver();
        let user = resolver
            .resolve_reference(&UserReference::from(ID::from("404")))
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_resolve_reference_is_idempotent() {
        let resolver = resolver();
        let reference = UserReference::from(ID::from("1"));

        let first = resolver.resolve_reference(&reference).await.unwrap();
        let second = resolver.resolve_reference(&reference).await.unwrap();
        let third = resolver.resolve_reference(&reference).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[test]
    fn test_reference_deserializes_from_representation() {
        let reference: UserReference = serde_json::from_str(r#"{"id":"1"}"#).unwrap();
        assert_eq!(reference.id, ID::from("1"));
    }
}
