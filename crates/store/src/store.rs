//! Entity store contract.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use shoestock_core::Entity;

/// Storage-level error.
///
/// `UniqueViolation` carries the id of the record already holding the
/// natural key, so a racing duplicate insert resolves to a retrievable
/// conflict instead of a second record. Everything else is fatal for the
/// current operation; callers do not retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record under the given id.
    #[error("record not found")]
    NotFound,

    /// Another record already holds the natural key.
    #[error("natural key already in use by {existing}")]
    UniqueViolation { existing: Uuid },

    /// Underlying storage failure.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// What the store needs to know about a catalog entity type.
pub trait CatalogEntity: Entity + Clone + Send + Sync + 'static {
    /// Equality filter over one or more fields. Fields left unset match
    /// every record.
    type Filter: Send + Sync;

    /// Natural key driving duplicate detection, distinct from the id.
    type Key: Eq + Send;

    fn natural_key(&self) -> Self::Key;

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Stable list ordering for browse views. Types listed in insertion
    /// order compare `Equal` here and rely on the sort being stable.
    fn list_order(a: &Self, b: &Self) -> std::cmp::Ordering;
}

/// Uniform persistence interface for one entity type.
///
/// Reads are snapshot-consistent at call time; there is no cross-call
/// transaction guarantee, and no mutation has side effects beyond the
/// named record.
#[async_trait]
pub trait EntityStore<T: CatalogEntity>: Send + Sync {
    async fn find_by_id(&self, id: T::Id) -> Result<Option<T>, StoreError>;

    /// First record matching the filter, in insertion order. Used for
    /// duplicate and dependency checks.
    async fn find_one(&self, filter: &T::Filter) -> Result<Option<T>, StoreError>;

    /// All matching records, stably sorted by [`CatalogEntity::list_order`].
    /// Unbounded; result sets are in-memory friendly by design.
    async fn find_many(&self, filter: Option<&T::Filter>) -> Result<Vec<T>, StoreError>;

    /// Sorted distinct projection of one field across all records.
    async fn distinct_values<V, F>(&self, extract: F) -> Result<Vec<V>, StoreError>
    where
        V: Ord + Send,
        F: Fn(&T) -> V + Send + Sync;

    async fn count(&self, filter: Option<&T::Filter>) -> Result<usize, StoreError>;

    /// Insert a new record. The natural key must be free; the id has been
    /// assigned by the caller and is stored as-is.
    async fn insert(&self, entity: T) -> Result<T, StoreError>;

    /// Replace the mutable fields of the record under `id`. The caller
    /// supplies the replacement with the immutable id already set.
    async fn update_by_id(&self, id: T::Id, entity: T) -> Result<T, StoreError>;

    async fn delete_by_id(&self, id: T::Id) -> Result<(), StoreError>;
}

#[async_trait]
impl<T, S> EntityStore<T> for Arc<S>
where
    T: CatalogEntity,
    S: EntityStore<T> + ?Sized,
{
    async fn find_by_id(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_one(&self, filter: &T::Filter) -> Result<Option<T>, StoreError> {
        (**self).find_one(filter).await
    }

    async fn find_many(&self, filter: Option<&T::Filter>) -> Result<Vec<T>, StoreError> {
        (**self).find_many(filter).await
    }

    async fn distinct_values<V, F>(&self, extract: F) -> Result<Vec<V>, StoreError>
    where
        V: Ord + Send,
        F: Fn(&T) -> V + Send + Sync,
    {
        (**self).distinct_values(extract).await
    }

    async fn count(&self, filter: Option<&T::Filter>) -> Result<usize, StoreError> {
        (**self).count(filter).await
    }

    async fn insert(&self, entity: T) -> Result<T, StoreError> {
        (**self).insert(entity).await
    }

    async fn update_by_id(&self, id: T::Id, entity: T) -> Result<T, StoreError> {
        (**self).update_by_id(id, entity).await
    }

    async fn delete_by_id(&self, id: T::Id) -> Result<(), StoreError> {
        (**self).delete_by_id(id).await
    }
}
