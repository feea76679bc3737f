//! Generic per-entity-type cache store

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::scope::Scope;

/// Identifier of a single cached entity: a unique name, or a positional id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKey {
    Name(String),
    Id(i64),
}

impl ItemKey {
    pub fn name(name: impl Into<String>) -> Self {
        ItemKey::Name(name.into())
    }

    /// Header-token form of the identifier.
    pub fn token(&self) -> String {
        match self {
            ItemKey::Name(name) => name.clone(),
            ItemKey::Id(id) => id.to_string(),
        }
    }
}

/// Transaction + scope prefix every entry is keyed under. `None` scope is
/// the configuration root (top-level entities).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryKey {
    transaction_id: String,
    scope: Option<Scope>,
}

impl EntryKey {
    fn new(transaction_id: &str, scope: Option<&Scope>) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            scope: scope.cloned(),
        }
    }
}

struct Store<T> {
    collections: HashMap<EntryKey, Vec<T>>,
    singles: HashMap<(EntryKey, ItemKey), T>,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            collections: HashMap::new(),
            singles: HashMap::new(),
        }
    }
}

/// Cached views of one entity type, keyed by transaction and scope
///
/// All mutation happens inside one short critical section per call; callers
/// never hold the lock across an engine invocation. When constructed
/// disabled, every get is a miss and every set or invalidation a no-op.
pub struct EntityCache<T> {
    enabled: bool,
    inner: RwLock<Store<T>>,
}

impl<T: Clone> EntityCache<T> {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            inner: RwLock::new(Store::default()),
        }
    }

    /// Cached collection for a scope, if present.
    pub fn get(&self, scope: Option<&Scope>, transaction_id: &str) -> Option<Vec<T>> {
        if !self.enabled {
            return None;
        }
        self.inner
            .read()
            .collections
            .get(&EntryKey::new(transaction_id, scope))
            .cloned()
    }

    /// Cached single entity for a scope, if present.
    pub fn get_one(
        &self,
        item: &ItemKey,
        scope: Option<&Scope>,
        transaction_id: &str,
    ) -> Option<T> {
        if !self.enabled {
            return None;
        }
        self.inner
            .read()
            .singles
            .get(&(EntryKey::new(transaction_id, scope), item.clone()))
            .cloned()
    }

    /// Store a whole collection for a scope.
    pub fn set_all(&self, scope: Option<&Scope>, transaction_id: &str, items: &[T]) {
        if !self.enabled {
            return;
        }
        self.inner
            .write()
            .collections
            .insert(EntryKey::new(transaction_id, scope), items.to_vec());
    }

    /// Store a single entity for a scope.
    pub fn set(&self, item: ItemKey, scope: Option<&Scope>, transaction_id: &str, value: &T) {
        if !self.enabled {
            return;
        }
        self.inner
            .write()
            .singles
            .insert((EntryKey::new(transaction_id, scope), item), value.clone());
    }

    /// Drop every entry for a scope within a transaction in one pass:
    /// the collection and all singles.
    pub fn invalidate_scope(&self, transaction_id: &str, scope: Option<&Scope>) {
        if !self.enabled {
            return;
        }
        let key = EntryKey::new(transaction_id, scope);
        let mut store = self.inner.write();
        store.collections.remove(&key);
        store.singles.retain(|(entry, _), _| *entry != key);
    }

    /// Drop the root collection and one named root entry, leaving other
    /// root entries untouched.
    pub fn invalidate_item(&self, transaction_id: &str, item: &ItemKey) {
        if !self.enabled {
            return;
        }
        let key = EntryKey::new(transaction_id, None);
        let mut store = self.inner.write();
        store.collections.remove(&key);
        store.singles.remove(&(key, item.clone()));
    }

    /// Drop everything cached for a transaction.
    pub fn invalidate_transaction(&self, transaction_id: &str) {
        if !self.enabled {
            return;
        }
        let mut store = self.inner.write();
        store
            .collections
            .retain(|entry, _| entry.transaction_id != transaction_id);
        store
            .singles
            .retain(|(entry, _), _| entry.transaction_id != transaction_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(name: &str) -> Scope {
        Scope::backend(name)
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let cache: EntityCache<u32> = EntityCache::new(true);
        let b1 = scope("b1");

        cache.set_all(Some(&b1), "", &[1, 2, 3]);
        cache.set(ItemKey::Id(2), Some(&b1), "", &2);

        assert_eq!(cache.get(Some(&b1), ""), Some(vec![1, 2, 3]));
        assert_eq!(cache.get_one(&ItemKey::Id(2), Some(&b1), ""), Some(2));
        assert_eq!(cache.get(Some(&scope("b2")), ""), None);
    }

    #[test]
    fn test_invalidate_scope_drops_collection_and_singles() {
        let cache: EntityCache<u32> = EntityCache::new(true);
        let b1 = scope("b1");
        let b2 = scope("b2");

        cache.set_all(Some(&b1), "", &[1]);
        cache.set(ItemKey::Id(1), Some(&b1), "", &1);
        cache.set_all(Some(&b2), "", &[9]);

        cache.invalidate_scope("", Some(&b1));

        assert_eq!(cache.get(Some(&b1), ""), None);
        assert_eq!(cache.get_one(&ItemKey::Id(1), Some(&b1), ""), None);
        // sibling scope untouched
        assert_eq!(cache.get(Some(&b2), ""), Some(vec![9]));
    }

    #[test]
    fn test_transactions_never_share_entries() {
        let cache: EntityCache<u32> = EntityCache::new(true);
        let b1 = scope("b1");

        cache.set_all(Some(&b1), "t1", &[1]);
        cache.set_all(Some(&b1), "t2", &[2]);

        cache.invalidate_scope("t1", Some(&b1));

        assert_eq!(cache.get(Some(&b1), "t1"), None);
        assert_eq!(cache.get(Some(&b1), "t2"), Some(vec![2]));
    }

    #[test]
    fn test_invalidate_item_leaves_other_root_entries() {
        let cache: EntityCache<u32> = EntityCache::new(true);

        cache.set_all(None, "", &[1, 2]);
        cache.set(ItemKey::name("f1"), None, "", &1);
        cache.set(ItemKey::name("f2"), None, "", &2);

        cache.invalidate_item("", &ItemKey::name("f1"));

        assert_eq!(cache.get(None, ""), None);
        assert_eq!(cache.get_one(&ItemKey::name("f1"), None, ""), None);
        assert_eq!(cache.get_one(&ItemKey::name("f2"), None, ""), Some(2));
    }

    #[test]
    fn test_disabled_cache_is_inert() {
        let cache: EntityCache<u32> = EntityCache::new(false);
        let b1 = scope("b1");

        cache.set_all(Some(&b1), "", &[1]);
        cache.set(ItemKey::Id(1), Some(&b1), "", &1);

        assert_eq!(cache.get(Some(&b1), ""), None);
        assert_eq!(cache.get_one(&ItemKey::Id(1), Some(&b1), ""), None);
        // invalidation on a disabled cache is a no-op, not an error
        cache.invalidate_scope("", Some(&b1));
        cache.invalidate_transaction("");
    }
}
