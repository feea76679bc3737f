//! Backend switching rule operations, scoped to a frontend
//!
//! Rule ids are positional within one dump; callers must treat them as
//! session-scoped, never as durable keys.

use bosun_models::{BackendSwitchingRule, EngineObject};

use crate::cache::ItemKey;
use crate::client::{push_changed_fields, push_fields, ConfigClient, Versioned, WriteToken};
use crate::error::ClientError;
use crate::scope::Scope;

impl ConfigClient {
    /// Configuration version and all switching rules configured in a
    /// frontend, in dump order.
    pub async fn list_backend_switching_rules(
        &self,
        frontend: &str,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Vec<BackendSwitchingRule>>, ClientError> {
        let scope = Scope::frontend(frontend);
        self.fetch_collection(
            &self.cache.backend_switching_rules,
            Some(&scope),
            transaction_id,
            "l7-service-usefarm-dump",
            &[frontend],
        )
        .await
    }

    /// Configuration version and one switching rule by id in a frontend.
    pub async fn get_backend_switching_rule(
        &self,
        id: i64,
        frontend: &str,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<BackendSwitchingRule>, ClientError> {
        let scope = Scope::frontend(frontend);
        let id_arg = id.to_string();
        self.fetch_one(
            &self.cache.backend_switching_rules,
            "backend switching rule",
            ItemKey::Id(id),
            Some(&scope),
            transaction_id,
            "l7-service-usefarm-show",
            &[frontend, &id_arg],
        )
        .await
    }

    /// Create a switching rule in a frontend. One of transaction id or
    /// version is mandatory.
    pub async fn create_backend_switching_rule(
        &self,
        frontend: &str,
        data: &BackendSwitchingRule,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let mut args = vec![frontend.to_string(), data.id.to_string()];
        push_fields(&mut args, &data.fields());
        self.execute_write("l7-service-usefarm-create", args, token)
            .await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::frontend(frontend));
        Ok(())
    }

    /// Edit a switching rule in a frontend. One of transaction id or
    /// version is mandatory.
    pub async fn edit_backend_switching_rule(
        &self,
        id: i64,
        frontend: &str,
        data: &BackendSwitchingRule,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let current = self
            .get_backend_switching_rule(id, frontend, transaction_id)
            .await?
            .data;
        let mut args = vec![frontend.to_string(), id.to_string()];
        push_changed_fields(&mut args, &current.fields(), &data.fields());
        self.execute_write("l7-service-usefarm-update", args, token)
            .await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::frontend(frontend));
        Ok(())
    }

    /// Delete a switching rule from a frontend. One of transaction id or
    /// version is mandatory.
    pub async fn delete_backend_switching_rule(
        &self,
        id: i64,
        frontend: &str,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.execute_write(
            "l7-service-usefarm-delete",
            vec![frontend.to_string(), id.to_string()],
            token,
        )
        .await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::frontend(frontend));
        Ok(())
    }
}
