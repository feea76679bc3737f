//! Cache aggregate over every entity type

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

use bosun_models::{
    Backend, BackendSwitchingRule, Frontend, Listener, Server, Site, TcpContentRule,
};

use crate::cache::store::{EntityCache, ItemKey};
use crate::scope::Scope;

/// The transaction-scoped configuration cache
///
/// One store per entity type (request and response tcp content rules are
/// kept apart, since response rules never carry a frontend scope), plus the
/// last known configuration version per transaction. The engine offers no
/// change feed, so invalidation is deliberately coarse: any mutation under
/// a scope drops every cached view for that scope.
///
/// The enabled flag is fixed at construction and injected wherever the
/// cache is needed; there is no process-wide singleton. A disabled cache
/// never reports a hit and never errors.
pub struct ConfigCache {
    enabled: bool,
    versions: RwLock<HashMap<String, i64>>,
    pub sites: EntityCache<Site>,
    pub frontends: EntityCache<Frontend>,
    pub backends: EntityCache<Backend>,
    pub servers: EntityCache<Server>,
    pub listeners: EntityCache<Listener>,
    pub backend_switching_rules: EntityCache<BackendSwitchingRule>,
    pub tcp_request_rules: EntityCache<TcpContentRule>,
    pub tcp_response_rules: EntityCache<TcpContentRule>,
}

impl ConfigCache {
    /// Create a new cache
    pub fn new(enabled: bool) -> Self {
        if enabled {
            info!("Configuration cache enabled");
        } else {
            info!("Configuration cache disabled, every read goes to the engine");
        }

        Self {
            enabled,
            versions: RwLock::new(HashMap::new()),
            sites: EntityCache::new(enabled),
            frontends: EntityCache::new(enabled),
            backends: EntityCache::new(enabled),
            servers: EntityCache::new(enabled),
            listeners: EntityCache::new(enabled),
            backend_switching_rules: EntityCache::new(enabled),
            tcp_request_rules: EntityCache::new(enabled),
            tcp_response_rules: EntityCache::new(enabled),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Last known configuration version for a transaction, if any.
    pub fn version(&self, transaction_id: &str) -> Option<i64> {
        if !self.enabled {
            return None;
        }
        self.versions.read().get(transaction_id).copied()
    }

    /// Record the configuration version a transaction's entries were read at.
    pub fn set_version(&self, transaction_id: &str, version: i64) {
        if !self.enabled {
            return;
        }
        self.versions
            .write()
            .insert(transaction_id.to_string(), version);
    }

    /// Drop every cached view nested under a scope within a transaction:
    /// all entity types, collections and singles alike.
    pub fn invalidate_parent(&self, transaction_id: &str, scope: &Scope) {
        debug!(
            "Invalidating {} {} for transaction {:?}",
            scope.parent, scope.name, transaction_id
        );
        self.servers.invalidate_scope(transaction_id, Some(scope));
        self.listeners.invalidate_scope(transaction_id, Some(scope));
        self.backend_switching_rules
            .invalidate_scope(transaction_id, Some(scope));
        self.tcp_request_rules
            .invalidate_scope(transaction_id, Some(scope));
        self.tcp_response_rules
            .invalidate_scope(transaction_id, Some(scope));
    }

    /// Drop the cached frontend views for one frontend name and everything
    /// scoped under it, leaving sibling frontends' scopes untouched.
    pub fn invalidate_frontend(&self, transaction_id: &str, name: &str) {
        self.frontends
            .invalidate_item(transaction_id, &ItemKey::name(name));
        self.invalidate_parent(transaction_id, &Scope::frontend(name));
    }

    /// Drop the cached backend views for one backend name and everything
    /// scoped under it, leaving sibling backends' scopes untouched.
    pub fn invalidate_backend(&self, transaction_id: &str, name: &str) {
        self.backends
            .invalidate_item(transaction_id, &ItemKey::name(name));
        self.invalidate_parent(transaction_id, &Scope::backend(name));
    }

    /// Drop the cached site views for one site name.
    pub fn invalidate_site(&self, transaction_id: &str, name: &str) {
        self.sites
            .invalidate_item(transaction_id, &ItemKey::name(name));
    }

    /// Drop everything the cache holds for a transaction, version included.
    pub fn invalidate_transaction(&self, transaction_id: &str) {
        debug!("Dropping cache state for transaction {:?}", transaction_id);
        self.sites.invalidate_transaction(transaction_id);
        self.frontends.invalidate_transaction(transaction_id);
        self.backends.invalidate_transaction(transaction_id);
        self.servers.invalidate_transaction(transaction_id);
        self.listeners.invalidate_transaction(transaction_id);
        self.backend_switching_rules
            .invalidate_transaction(transaction_id);
        self.tcp_request_rules.invalidate_transaction(transaction_id);
        self.tcp_response_rules
            .invalidate_transaction(transaction_id);
        if self.enabled {
            self.versions.write().remove(transaction_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(name: &str) -> Server {
        Server {
            name: name.to_string(),
            address: "10.0.0.1".to_string(),
            ..Default::default()
        }
    }

    fn frontend(name: &str) -> Frontend {
        Frontend {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_invalidate_parent_drops_every_nested_type() {
        let cache = ConfigCache::new(true);
        let b1 = Scope::backend("b1");

        cache.servers.set_all(Some(&b1), "", &[server("s1")]);
        cache
            .tcp_response_rules
            .set_all(Some(&b1), "", &[TcpContentRule::default()]);
        cache
            .servers
            .set(ItemKey::name("s1"), Some(&b1), "", &server("s1"));

        cache.invalidate_parent("", &b1);

        assert!(cache.servers.get(Some(&b1), "").is_none());
        assert!(cache.tcp_response_rules.get(Some(&b1), "").is_none());
        assert!(cache
            .servers
            .get_one(&ItemKey::name("s1"), Some(&b1), "")
            .is_none());
    }

    #[test]
    fn test_invalidate_frontend_leaves_siblings() {
        let cache = ConfigCache::new(true);
        let f1 = Scope::frontend("f1");
        let f2 = Scope::frontend("f2");

        cache.frontends.set_all(None, "", &[frontend("f1"), frontend("f2")]);
        cache
            .frontends
            .set(ItemKey::name("f2"), None, "", &frontend("f2"));
        cache
            .backend_switching_rules
            .set_all(Some(&f1), "", &[BackendSwitchingRule::default()]);
        cache
            .backend_switching_rules
            .set_all(Some(&f2), "", &[BackendSwitchingRule::default()]);

        cache.invalidate_frontend("", "f1");

        assert!(cache.frontends.get(None, "").is_none());
        assert!(cache.backend_switching_rules.get(Some(&f1), "").is_none());
        // sibling scope and sibling single survive
        assert!(cache.backend_switching_rules.get(Some(&f2), "").is_some());
        assert!(cache
            .frontends
            .get_one(&ItemKey::name("f2"), None, "")
            .is_some());
    }

    #[test]
    fn test_invalidation_is_transaction_local() {
        let cache = ConfigCache::new(true);
        let b1 = Scope::backend("b1");

        cache.servers.set_all(Some(&b1), "t1", &[server("s1")]);
        cache.servers.set_all(Some(&b1), "t2", &[server("s1")]);

        cache.invalidate_parent("t1", &b1);

        assert!(cache.servers.get(Some(&b1), "t1").is_none());
        assert!(cache.servers.get(Some(&b1), "t2").is_some());
    }

    #[test]
    fn test_version_tracking_per_transaction() {
        let cache = ConfigCache::new(true);

        cache.set_version("", 4);
        cache.set_version("t1", 9);

        assert_eq!(cache.version(""), Some(4));
        assert_eq!(cache.version("t1"), Some(9));
        assert_eq!(cache.version("t2"), None);

        cache.invalidate_transaction("t1");
        assert_eq!(cache.version("t1"), None);
        assert_eq!(cache.version(""), Some(4));
    }

    #[test]
    fn test_disabled_cache_reports_nothing() {
        let cache = ConfigCache::new(false);
        let b1 = Scope::backend("b1");

        cache.servers.set_all(Some(&b1), "", &[server("s1")]);
        cache.set_version("", 3);

        assert!(!cache.enabled());
        assert!(cache.servers.get(Some(&b1), "").is_none());
        assert_eq!(cache.version(""), None);
    }
}
