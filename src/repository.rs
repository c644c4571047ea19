//! Read-only keyed lookups
//!
//! Resolvers never touch storage directly: they go through a [`Repository`],
//! which maps an id to an entity or to nothing. An absent key is a normal
//! outcome (`Ok(None)`), errors are reserved for the backing store failing.

use async_graphql::dataloader::Loader;
use async_graphql::ID;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::SubgraphError;

/// Entities addressable by an opaque id
pub trait Keyed {
    fn key(&self) -> &ID;
}

/// Keyed read-only lookup
#[async_trait]
pub trait Repository<V>: Send + Sync
where
    V: Send + Sync + Clone + 'static,
{
    /// Look up a single entity by exact id match
    async fn lookup(&self, id: &ID) -> crate::Result<Option<V>>;

    /// Look up several entities at once
    ///
    /// Ids with no match are simply missing from the returned map.
    /// Implementations backed by a remote store should override this with a
    /// single round trip.
    async fn lookup_many(&self, ids: &[ID]) -> crate::Result<HashMap<ID, V>> {
        let mut found = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(value) = self.lookup(id).await? {
                found.insert(id.clone(), value);
            }
        }
        Ok(found)
    }
}

/// Immutable in-memory catalog
///
/// Built once at startup and shared between requests; there is no way to
/// mutate it afterwards.
#[derive(Debug)]
pub struct InMemoryRepository<V> {
    entries: Arc<HashMap<ID, V>>,
}

impl<V> InMemoryRepository<V>
where
    V: Keyed,
{
    /// Create a catalog from records; a later record wins on duplicate ids
    pub fn from_records(records: impl IntoIterator<Item = V>) -> Self {
        let entries = records
            .into_iter()
            .map(|record| (record.key().clone(), record))
            .collect();

        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Clone for InMemoryRepository<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

#[async_trait]
impl<V> Repository<V> for InMemoryRepository<V>
where
    V: Keyed + Send + Sync + Clone + 'static,
{
    async fn lookup(&self, id: &ID) -> crate::Result<Option<V>> {
        Ok(self.entries.get(id).cloned())
    }

    async fn lookup_many(&self, ids: &[ID]) -> crate::Result<HashMap<ID, V>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.entries.get(id).map(|v| (id.clone(), v.clone())))
            .collect())
    }
}

/// Adapter that lets a [`Repository`] back an `async_graphql` [`DataLoader`]
///
/// Concurrent lookups issued while one request executes are coalesced into a
/// single [`Repository::lookup_many`] call.
///
/// [`DataLoader`]: async_graphql::dataloader::DataLoader
pub struct RepositoryLoader<V>
where
    V: Send + Sync + Clone + 'static,
{
    repository: Arc<dyn Repository<V>>,
}

impl<V> RepositoryLoader<V>
where
    V: Send + Sync + Clone + 'static,
{
    pub fn new(repository: Arc<dyn Repository<V>>) -> Self {
        Self { repository }
    }
}

impl<V> Loader<ID> for RepositoryLoader<V>
where
    V: Send + Sync + Clone + 'static,
{
    type Value = V;
    type Error = SubgraphError;

    async fn load(&self, keys: &[ID]) -> Result<HashMap<ID, Self::Value>, Self::Error> {
        tracing::debug!(batch_size = keys.len(), "loading entity batch");
        self.repository.lookup_many(keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::dataloader::DataLoader;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: ID,
        label: String,
    }

    impl Keyed for Item {
        fn key(&self) -> &ID {
            &self.id
        }
    }

    fn item(id: &str) -> Item {
        Item {
            id: ID::from(id),
            label: format!("value-{}", id),
        }
    }

    /// Counts how often the batch path is taken
    struct CountingRepository {
        inner: InMemoryRepository<Item>,
        batches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Repository<Item> for CountingRepository {
        async fn lookup(&self, id: &ID) -> crate::Result<Option<Item>> {
            self.inner.lookup(id).await
        }

        async fn lookup_many(&self, ids: &[ID]) -> crate::Result<HashMap<ID, Item>> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup_many(ids).await
        }
    }

    #[tokio::test]
    async fn test_lookup_hit_and_miss() {
        let repo = InMemoryRepository::from_records(vec![item("key1")]);

        let hit = repo.lookup(&ID::from("key1")).await.unwrap();
        assert_eq!(hit, Some(item("key1")));

        let miss = repo.lookup(&ID::from("nope")).await.unwrap();
        assert_eq!(miss, None);
    }

    #[tokio::test]
    async fn test_lookup_many_skips_unknown_ids() {
        let repo = InMemoryRepository::from_records(vec![item("key1"), item("key2")]);

        let ids = vec![ID::from("key1"), ID::from("missing"), ID::from("key2")];
        let results = repo.lookup_many(&ids).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results.get(&ID::from("key1")), Some(&item("key1")));
        assert!(!results.contains_key(&ID::from("missing")));
    }

    #[tokio::test]
    async fn test_default_lookup_many_uses_lookup() {
        struct SingleOnly;

        #[async_trait]
        impl Repository<Item> for SingleOnly {
            async fn lookup(&self, id: &ID) -> crate::Result<Option<Item>> {
                Ok((id.as_str() != "missing").then(|| item(id.as_str())))
            }
        }

        let ids = vec![ID::from("a"), ID::from("missing")];
        let results = SingleOnly.lookup_many(&ids).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.get(&ID::from("a")), Some(&item("a")));
    }

    #[tokio::test]
    async fn test_duplicate_ids_keep_last_record() {
        let mut replacement = item("key1");
        replacement.label = "replacement".to_string();
        let repo = InMemoryRepository::from_records(vec![item("key1"), replacement.clone()]);

        assert_eq!(repo.len(), 1);
        let found = repo.lookup(&ID::from("key1")).await.unwrap();
        assert_eq!(found, Some(replacement));
    }

    #[tokio::test]
    async fn test_loader_batches_concurrent_lookups() {
        let batches = Arc::new(AtomicUsize::new(0));
        let repo = CountingRepository {
            inner: InMemoryRepository::from_records(vec![item("key1"), item("key2")]),
            batches: batches.clone(),
        };
        let loader = DataLoader::new(RepositoryLoader::new(Arc::new(repo)), tokio::spawn);

        let (a, b, c) = tokio::join!(
            loader.load_one(ID::from("key1")),
            loader.load_one(ID::from("key2")),
            loader.load_one(ID::from("missing")),
        );

        assert_eq!(a.unwrap(), Some(item("key1")));
        assert_eq!(b.unwrap(), Some(item("key2")));
        assert_eq!(c.unwrap(), None);
        assert_eq!(batches.load(Ordering::SeqCst), 1);
    }
}
