//! Configuration CRUD client
//!
//! Cache-aside orchestration over the engine: reads consult the cache and
//! fall back to an engine dump plus the record parser, writes validate,
//! invoke the engine with an optimistic-concurrency token and invalidate
//! the affected scope. One file per entity type; every type follows the
//! same call shapes through the generic helpers below.

mod backend;
mod backend_switching_rule;
mod frontend;
mod listener;
mod server;
mod site;
mod tcp_content_rule;
mod transaction;

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use bosun_engine::ConfigEngine;
use bosun_models::EngineObject;

use crate::cache::{ConfigCache, EntityCache, ItemKey};
use crate::error::ClientError;
use crate::parse;
use crate::scope::Scope;

/// A payload paired with the configuration version it was read at.
///
/// The pair is one atomic unit: the version is the one that was current
/// when the payload was fetched or cached, never a fresher one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Versioned<T> {
    pub version: i64,
    pub data: T,
}

/// Optimistic-concurrency token for mutating calls
///
/// Exactly one of a transaction id (checked against the transaction's
/// baseline) or an explicit configuration version (checked against the live
/// configuration) must accompany every write.
#[derive(Debug, Clone, Copy)]
pub enum WriteToken<'a> {
    Transaction(&'a str),
    Version(i64),
}

impl<'a> WriteToken<'a> {
    /// Enforce the exactly-one contract at the orchestration boundary,
    /// before any engine call.
    pub fn resolve(
        transaction_id: Option<&'a str>,
        version: Option<i64>,
    ) -> Result<Self, ClientError> {
        match (transaction_id, version) {
            (Some(id), None) => Ok(WriteToken::Transaction(id)),
            (None, Some(version)) => Ok(WriteToken::Version(version)),
            (Some(_), Some(_)) => Err(ClientError::Validation(
                "both a transaction id and a version were supplied".to_string(),
            )),
            (None, None) => Err(ClientError::Validation(
                "one of transaction id or version is required".to_string(),
            )),
        }
    }

    fn transaction_id(self) -> Option<&'a str> {
        match self {
            WriteToken::Transaction(id) => Some(id),
            WriteToken::Version(_) => None,
        }
    }

    /// Cache key of the view this write goes against: the transaction, or
    /// the global view for an immediate versioned write.
    fn cache_key(self) -> &'a str {
        match self {
            WriteToken::Transaction(id) => id,
            WriteToken::Version(_) => "",
        }
    }
}

/// Transactional CRUD client over the engine-owned configuration
pub struct ConfigClient {
    engine: Arc<dyn ConfigEngine>,
    cache: ConfigCache,
    use_validation: bool,
}

impl ConfigClient {
    /// Create a new client
    pub fn new(engine: Arc<dyn ConfigEngine>, cache: ConfigCache, use_validation: bool) -> Self {
        Self {
            engine,
            cache,
            use_validation,
        }
    }

    // ==================== Generic Read Path ====================

    /// Collection read: cache hit, or engine dump + parse + populate.
    async fn fetch_collection<T: EngineObject>(
        &self,
        store: &EntityCache<T>,
        scope: Option<&Scope>,
        transaction_id: Option<&str>,
        action: &str,
        args: &[&str],
    ) -> Result<Versioned<Vec<T>>, ClientError> {
        let view = transaction_id.unwrap_or_default();
        if let Some(data) = store.get(scope, view)
            && let Some(version) = self.cache.version(view)
        {
            debug!("Cache hit for {} ({} items)", action, data.len());
            return Ok(Versioned { version, data });
        }

        let raw = self.engine.run(action, transaction_id, args).await?;
        let data = parse::parse_collection::<T>(&raw);
        let version = self.engine.current_version(transaction_id).await?;

        store.set_all(scope, view, &data);
        self.cache.set_version(view, version);
        Ok(Versioned { version, data })
    }

    /// Single-entity read: cache hit, or engine show + inflate + populate.
    /// An empty show output is a not-found, never an empty entity.
    async fn fetch_one<T: EngineObject>(
        &self,
        store: &EntityCache<T>,
        kind: &str,
        item: ItemKey,
        scope: Option<&Scope>,
        transaction_id: Option<&str>,
        action: &str,
        args: &[&str],
    ) -> Result<Versioned<T>, ClientError> {
        let view = transaction_id.unwrap_or_default();
        if let Some(data) = store.get_one(&item, scope, view)
            && let Some(version) = self.cache.version(view)
        {
            debug!("Cache hit for {} {}", kind, item.token());
            return Ok(Versioned { version, data });
        }

        let raw = self.engine.run(action, transaction_id, args).await?;
        if raw.trim().is_empty() {
            return Err(ClientError::NotFound(format!("{} {}", kind, item.token())));
        }

        let mut data = T::default();
        data.apply_header_token(&item.token());
        parse::apply_record_fields(&raw, &mut data);
        let version = self.engine.current_version(transaction_id).await?;

        store.set(item, scope, view, &data);
        self.cache.set_version(view, version);
        Ok(Versioned { version, data })
    }

    // ==================== Generic Write Path ====================

    fn validate_payload<T: EngineObject>(&self, data: &T) -> Result<(), ClientError> {
        if self.use_validation {
            data.validate()?;
        }
        Ok(())
    }

    /// Run a mutating engine action carrying the concurrency token.
    async fn execute_write(
        &self,
        action: &str,
        mut args: Vec<String>,
        token: WriteToken<'_>,
    ) -> Result<(), ClientError> {
        if let WriteToken::Version(version) = token {
            args.push("--version".to_string());
            args.push(version.to_string());
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.engine
            .run(action, token.transaction_id(), &arg_refs)
            .await?;
        Ok(())
    }
}

/// Append field assignments as `key value` argument pairs.
fn push_fields(args: &mut Vec<String>, fields: &[(&'static str, String)]) {
    for (key, value) in fields {
        args.push(key.to_string());
        args.push(value.clone());
    }
}

/// Append only what changed against the pre-image: new and updated keys
/// carry the new value, keys gone from the payload are sent with an empty
/// value so the engine clears them.
fn push_changed_fields(
    args: &mut Vec<String>,
    old: &[(&'static str, String)],
    new: &[(&'static str, String)],
) {
    for (key, value) in new {
        let unchanged = old.iter().any(|(k, v)| k == key && v == value);
        if !unchanged {
            args.push(key.to_string());
            args.push(value.clone());
        }
    }
    for (key, _) in old {
        if !new.iter().any(|(k, _)| k == key) {
            args.push(key.to_string());
            args.push(String::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bosun_engine::EngineError;
    use bosun_models::{Frontend, Mode, Server, TransactionStatus};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    use crate::scope::{ParentType, RuleType};

    /// Engine double: canned stdout per action, every invocation recorded.
    #[derive(Default)]
    struct ScriptedEngine {
        responses: Mutex<HashMap<String, String>>,
        calls: Mutex<Vec<String>>,
        version: Mutex<i64>,
    }

    impl ScriptedEngine {
        fn with_version(version: i64) -> Arc<Self> {
            let engine = Self::default();
            *engine.version.lock() = version;
            Arc::new(engine)
        }

        fn respond(&self, action: &str, output: &str) {
            self.responses
                .lock()
                .insert(action.to_string(), output.to_string());
        }

        fn set_version(&self, version: i64) {
            *self.version.lock() = version;
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        fn calls_for(&self, action: &str) -> usize {
            self.calls
                .lock()
                .iter()
                .filter(|call| call.starts_with(action))
                .count()
        }
    }

    #[async_trait]
    impl ConfigEngine for ScriptedEngine {
        async fn run(
            &self,
            action: &str,
            transaction_id: Option<&str>,
            args: &[&str],
        ) -> Result<String, EngineError> {
            self.calls.lock().push(format!(
                "{} tid={} {}",
                action,
                transaction_id.unwrap_or("-"),
                args.join(" ")
            ));
            Ok(self
                .responses
                .lock()
                .get(action)
                .cloned()
                .unwrap_or_default())
        }

        async fn current_version(
            &self,
            _transaction_id: Option<&str>,
        ) -> Result<i64, EngineError> {
            Ok(*self.version.lock())
        }
    }

    fn client(engine: Arc<ScriptedEngine>, cache_enabled: bool) -> ConfigClient {
        ConfigClient::new(engine, ConfigCache::new(cache_enabled), true)
    }

    fn server_payload(name: &str) -> Server {
        Server {
            name: name.to_string(),
            address: "10.0.0.4".to_string(),
            port: Some(8080),
            weight: Some(100),
            backup: false,
        }
    }

    const FRONTEND_DUMP: &str = "web\nmode http\n\nadmin\nmode http\nmaxconn 128\n\n";

    #[tokio::test]
    async fn test_collection_read_populates_cache() {
        let engine = ScriptedEngine::with_version(4);
        engine.respond("l7-service-dump", FRONTEND_DUMP);
        let client = client(engine.clone(), true);

        let first = client.list_frontends(None).await.unwrap();
        assert_eq!(first.version, 4);
        assert_eq!(first.data.len(), 2);
        assert_eq!(first.data[0].name, "web");
        assert_eq!(first.data[1].max_connections, Some(128));

        let second = client.list_frontends(None).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(engine.calls_for("l7-service-dump"), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_keeps_insertion_version() {
        let engine = ScriptedEngine::with_version(4);
        engine.respond("l7-service-dump", FRONTEND_DUMP);
        let client = client(engine.clone(), true);

        client.list_frontends(None).await.unwrap();
        engine.set_version(9);

        // the hit is paired with the version current at population time
        let hit = client.list_frontends(None).await.unwrap();
        assert_eq!(hit.version, 4);
    }

    #[tokio::test]
    async fn test_disabled_cache_invokes_engine_every_time() {
        let engine = ScriptedEngine::with_version(1);
        engine.respond("l7-service-dump", FRONTEND_DUMP);
        let client = client(engine.clone(), false);

        let first = client.list_frontends(None).await.unwrap();
        let second = client.list_frontends(None).await.unwrap();

        assert_eq!(engine.calls_for("l7-service-dump"), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_one_round_trips_through_cache() {
        let engine = ScriptedEngine::with_version(2);
        engine.respond("l7-farm-server-show", "srv1\nip 10.0.0.9\nport 8080\n");
        let client = client(engine.clone(), true);

        let first = client.get_server("srv1", "app", None).await.unwrap();
        assert_eq!(first.data.address, "10.0.0.9");

        let second = client.get_server("srv1", "app", None).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(engine.calls_for("l7-farm-server-show"), 1);
    }

    #[tokio::test]
    async fn test_get_one_empty_output_is_not_found() {
        let engine = ScriptedEngine::with_version(2);
        let client = client(engine, true);

        let err = client.get_backend("missing", None).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_invalidates_scope_and_skips_population() {
        let engine = ScriptedEngine::with_version(3);
        engine.respond("l7-farm-server-dump", "srv1\nip 10.0.0.4\n\n");
        let client = client(engine.clone(), true);

        client.list_servers("app", None).await.unwrap();
        assert_eq!(engine.calls_for("l7-farm-server-dump"), 1);

        client
            .create_server("app", &server_payload("srv2"), Some("t1"), None)
            .await
            .unwrap();

        // the transaction's view was dropped, the next read goes to the engine
        client.list_servers("app", Some("t1")).await.unwrap();
        assert_eq!(engine.calls_for("l7-farm-server-dump"), 2);
    }

    #[tokio::test]
    async fn test_writes_do_not_cross_transactions() {
        let engine = ScriptedEngine::with_version(3);
        engine.respond("l7-farm-server-dump", "srv1\nip 10.0.0.4\n\n");
        let client = client(engine.clone(), true);

        client.list_servers("app", Some("t1")).await.unwrap();
        client.list_servers("app", Some("t2")).await.unwrap();
        assert_eq!(engine.calls_for("l7-farm-server-dump"), 2);

        client
            .delete_server("srv1", "app", Some("t1"), None)
            .await
            .unwrap();

        // t2 still hits its cached view, t1 re-reads
        client.list_servers("app", Some("t2")).await.unwrap();
        assert_eq!(engine.calls_for("l7-farm-server-dump"), 2);
        client.list_servers("app", Some("t1")).await.unwrap();
        assert_eq!(engine.calls_for("l7-farm-server-dump"), 3);
    }

    #[tokio::test]
    async fn test_exactly_one_concurrency_token() {
        let engine = ScriptedEngine::with_version(1);
        let client = client(engine.clone(), true);

        let both = client
            .create_server("app", &server_payload("srv1"), Some("t1"), Some(7))
            .await
            .unwrap_err();
        assert!(matches!(both, ClientError::Validation(_)));

        let neither = client
            .create_server("app", &server_payload("srv1"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(neither, ClientError::Validation(_)));

        // rejected at the boundary, the engine was never invoked
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_payload_rejected_before_engine() {
        let engine = ScriptedEngine::with_version(1);
        let client = client(engine.clone(), true);

        let payload = Server {
            name: "srv1".to_string(),
            ..Default::default()
        };
        let err = client
            .create_server("app", &payload, Some("t1"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_response_rules_never_reach_cache_or_engine_under_frontend() {
        let engine = ScriptedEngine::with_version(1);
        let client = client(engine.clone(), true);

        let err = client
            .list_tcp_content_rules(ParentType::Frontend, "web", RuleType::Response, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert!(engine.calls().is_empty());
        let scope = Scope::frontend("web");
        assert!(client.cache.tcp_response_rules.get(Some(&scope), "").is_none());
    }

    #[tokio::test]
    async fn test_edit_diffs_against_the_pre_image() {
        let engine = ScriptedEngine::with_version(5);
        engine.respond(
            "l7-farm-server-show",
            "srv1\nip 10.0.0.4\nport 8080\nweight 100\n",
        );
        let client = client(engine.clone(), true);

        let mut payload = server_payload("srv1");
        payload.weight = Some(50);
        client
            .edit_server("srv1", "app", &payload, Some("t1"), None)
            .await
            .unwrap();

        let calls = engine.calls();
        // the pre-image was fetched before the update
        assert_eq!(engine.calls_for("l7-farm-server-show"), 1);
        let update = calls
            .iter()
            .find(|call| call.starts_with("l7-farm-server-update"))
            .unwrap();
        assert!(update.contains("weight 50"));
        assert!(!update.contains("ip"));
        assert!(!update.contains("port"));
    }

    #[tokio::test]
    async fn test_versioned_write_goes_against_the_global_view() {
        let engine = ScriptedEngine::with_version(6);
        engine.respond("l7-service-dump", FRONTEND_DUMP);
        let client = client(engine.clone(), true);

        client.list_frontends(None).await.unwrap();

        let payload = Frontend {
            name: "web".to_string(),
            mode: Some(Mode::Http),
            ..Default::default()
        };
        client.create_frontend(&payload, None, Some(6)).await.unwrap();

        let create = engine
            .calls()
            .iter()
            .find(|call| call.starts_with("l7-service-create"))
            .cloned()
            .unwrap();
        assert!(create.contains("tid=-"));
        assert!(create.contains("--version 6"));

        // the global view was invalidated
        client.list_frontends(None).await.unwrap();
        assert_eq!(engine.calls_for("l7-service-dump"), 2);
    }

    #[tokio::test]
    async fn test_commit_drops_transaction_and_global_views() {
        let engine = ScriptedEngine::with_version(7);
        engine.respond("l7-service-dump", FRONTEND_DUMP);
        let client = client(engine.clone(), true);

        let transaction = client.start_transaction(7).await.unwrap();
        assert_eq!(transaction.version, 7);

        client.list_frontends(None).await.unwrap();
        client.list_frontends(Some(&transaction.id)).await.unwrap();
        assert_eq!(engine.calls_for("l7-service-dump"), 2);

        engine.set_version(8);
        let version = client.commit_transaction(&transaction.id).await.unwrap();
        assert_eq!(version, 8);

        // the commit replaced the live configuration, both views re-read
        client.list_frontends(None).await.unwrap();
        assert_eq!(engine.calls_for("l7-service-dump"), 3);
    }

    #[tokio::test]
    async fn test_list_transactions_parses_and_filters() {
        let engine = ScriptedEngine::with_version(1);
        engine.respond(
            "transaction-list",
            "tx-1\nstatus in_progress\nversion 4\n\ntx-2\nstatus failed\nversion 3\n\n",
        );
        let client = client(engine, true);

        let all = client.list_transactions(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "tx-1");
        assert_eq!(all[0].version, 4);

        let failed = client
            .list_transactions(Some(TransactionStatus::Failed))
            .await
            .unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, "tx-2");
        assert_eq!(failed[0].status, TransactionStatus::Failed);
    }

    #[test]
    fn test_push_changed_fields() {
        let old = vec![
            ("ip", "10.0.0.4".to_string()),
            ("port", "8080".to_string()),
            ("weight", "100".to_string()),
        ];
        let new = vec![
            ("ip", "10.0.0.4".to_string()),
            ("port", "9090".to_string()),
        ];

        let mut args = Vec::new();
        push_changed_fields(&mut args, &old, &new);
        assert_eq!(args, vec!["port", "9090", "weight", ""]);
    }
}
