//! In-memory entity store for tests, seeding, and dev runs.

use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::store::{CatalogEntity, EntityStore, StoreError};

/// Guarded map plus an insertion log for stable insertion-order listing.
///
/// The natural-key uniqueness check runs under the write lock, so the store
/// itself is the source of truth for duplicate detection; workflow-level
/// `find_one` checks are a best-effort fast path.
#[derive(Debug)]
pub struct InMemoryStore<T: CatalogEntity> {
    inner: RwLock<Records<T>>,
}

#[derive(Debug)]
struct Records<T: CatalogEntity> {
    by_id: HashMap<T::Id, T>,
    order: Vec<T::Id>,
}

impl<T: CatalogEntity> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Records {
                by_id: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records<T>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records<T>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }
}

impl<T: CatalogEntity> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CatalogEntity> Records<T> {
    fn in_insertion_order(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}

#[async_trait]
impl<T: CatalogEntity> EntityStore<T> for InMemoryStore<T> {
    async fn find_by_id(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        Ok(self.read()?.by_id.get(&id).cloned())
    }

    async fn find_one(&self, filter: &T::Filter) -> Result<Option<T>, StoreError> {
        let records = self.read()?;
        Ok(records
            .in_insertion_order()
            .find(|record| record.matches(filter))
            .cloned())
    }

    async fn find_many(&self, filter: Option<&T::Filter>) -> Result<Vec<T>, StoreError> {
        let mut matched: Vec<T> = {
            let records = self.read()?;
            records
                .in_insertion_order()
                .filter(|record| filter.is_none_or(|f| record.matches(f)))
                .cloned()
                .collect()
        };
        // Stable sort: ties keep insertion order.
        matched.sort_by(T::list_order);
        Ok(matched)
    }

    async fn distinct_values<V, F>(&self, extract: F) -> Result<Vec<V>, StoreError>
    where
        V: Ord + Send,
        F: Fn(&T) -> V + Send + Sync,
    {
        let records = self.read()?;
        let distinct: BTreeSet<V> = records.by_id.values().map(&extract).collect();
        Ok(distinct.into_iter().collect())
    }

    async fn count(&self, filter: Option<&T::Filter>) -> Result<usize, StoreError> {
        let records = self.read()?;
        Ok(records
            .by_id
            .values()
            .filter(|record| filter.is_none_or(|f| record.matches(f)))
            .count())
    }

    async fn insert(&self, entity: T) -> Result<T, StoreError> {
        let mut records = self.write()?;
        let key = entity.natural_key();
        // Linear scan; result sets are in-memory friendly by contract.
        if let Some(existing) = records.by_id.values().find(|r| r.natural_key() == key) {
            return Err(StoreError::UniqueViolation {
                existing: existing.id().into(),
            });
        }
        let id = entity.id();
        records.by_id.insert(id, entity.clone());
        records.order.push(id);
        Ok(entity)
    }

    async fn update_by_id(&self, id: T::Id, entity: T) -> Result<T, StoreError> {
        debug_assert!(entity.id() == id, "replacement must carry the target id");
        let mut records = self.write()?;
        match records.by_id.get_mut(&id) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_by_id(&self, id: T::Id) -> Result<(), StoreError> {
        let mut records = self.write()?;
        if records.by_id.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        records.order.retain(|existing| *existing != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoestock_core::{BrandId, Entity};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Label {
        id: BrandId,
        name: String,
        shelf: u32,
    }

    #[derive(Debug, Default)]
    struct LabelFilter {
        shelf: Option<u32>,
    }

    impl Entity for Label {
        type Id = BrandId;

        fn id(&self) -> BrandId {
            self.id
        }

        fn path(&self) -> String {
            format!("/labels/{}", self.id)
        }
    }

    impl CatalogEntity for Label {
        type Filter = LabelFilter;
        type Key = String;

        fn natural_key(&self) -> String {
            self.name.clone()
        }

        fn matches(&self, filter: &LabelFilter) -> bool {
            filter.shelf.is_none_or(|shelf| shelf == self.shelf)
        }

        fn list_order(a: &Self, b: &Self) -> std::cmp::Ordering {
            a.name.cmp(&b.name)
        }
    }

    fn label(name: &str, shelf: u32) -> Label {
        Label {
            id: BrandId::new(),
            name: name.to_string(),
            shelf,
        }
    }

    #[tokio::test]
    async fn insert_then_find_by_id() {
        let store = InMemoryStore::new();
        let saved = store.insert(label("alpha", 1)).await.unwrap();
        let found = store.find_by_id(saved.id).await.unwrap();
        assert_eq!(found, Some(saved));
    }

    #[tokio::test]
    async fn duplicate_natural_key_reports_existing_id() {
        let store = InMemoryStore::new();
        let first = store.insert(label("alpha", 1)).await.unwrap();
        let err = store.insert(label("alpha", 2)).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::UniqueViolation {
                existing: first.id.into()
            }
        );
        assert_eq!(store.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn find_many_sorts_and_filters() {
        let store = InMemoryStore::new();
        store.insert(label("zeta", 1)).await.unwrap();
        store.insert(label("alpha", 2)).await.unwrap();
        store.insert(label("mid", 1)).await.unwrap();

        let all = store.find_many(None).await.unwrap();
        let names: Vec<&str> = all.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);

        let shelf_one = LabelFilter { shelf: Some(1) };
        let filtered = store.find_many(Some(&shelf_one)).await.unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[tokio::test]
    async fn distinct_values_are_sorted_and_deduplicated() {
        let store = InMemoryStore::new();
        store.insert(label("a", 3)).await.unwrap();
        store.insert(label("b", 1)).await.unwrap();
        store.insert(label("c", 3)).await.unwrap();

        let shelves = store.distinct_values(|l| l.shelf).await.unwrap();
        assert_eq!(shelves, vec![1, 3]);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_rejects_unknown_id() {
        let store = InMemoryStore::new();
        let saved = store.insert(label("alpha", 1)).await.unwrap();

        let mut replacement = saved.clone();
        replacement.shelf = 9;
        let updated = store.update_by_id(saved.id, replacement).await.unwrap();
        assert_eq!(updated.shelf, 9);

        let missing = label("ghost", 0);
        let err = store.update_by_id(missing.id, missing).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }

    #[tokio::test]
    async fn delete_removes_record_and_frees_natural_key() {
        let store = InMemoryStore::new();
        let saved = store.insert(label("alpha", 1)).await.unwrap();
        store.delete_by_id(saved.id).await.unwrap();
        assert_eq!(store.find_by_id(saved.id).await.unwrap(), None);
        // Key is free again after deletion.
        store.insert(label("alpha", 2)).await.unwrap();

        let err = store.delete_by_id(saved.id).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }
}
