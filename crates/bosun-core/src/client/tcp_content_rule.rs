//! Tcp content rule operations, scoped to a frontend or backend
//!
//! These rules carry the request/response axis on top of the parent scope.
//! Scope resolution happens before any cache lookup or engine call, so a
//! response rule can never be requested, cached or written under a
//! frontend. Rule ids are positional within one dump and session-scoped.

use bosun_models::{EngineObject, TcpContentRule};

use crate::cache::{EntityCache, ItemKey};
use crate::client::{push_changed_fields, push_fields, ConfigClient, Versioned, WriteToken};
use crate::error::ClientError;
use crate::scope::{rule_token, ParentType, RuleType, Scope};

impl ConfigClient {
    fn tcp_rule_store(&self, rule_type: RuleType) -> &EntityCache<TcpContentRule> {
        match rule_type {
            RuleType::Request => &self.cache.tcp_request_rules,
            RuleType::Response => &self.cache.tcp_response_rules,
        }
    }

    fn tcp_rule_action(
        parent: ParentType,
        rule_type: RuleType,
        operation: &str,
    ) -> Result<String, ClientError> {
        let rule = rule_token(rule_type, parent)?;
        Ok(format!("l7-{}-{}-{}", parent.engine_token(), rule, operation))
    }

    /// Configuration version and all tcp content rules of one type
    /// configured under a parent, in dump order.
    pub async fn list_tcp_content_rules(
        &self,
        parent: ParentType,
        parent_name: &str,
        rule_type: RuleType,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Vec<TcpContentRule>>, ClientError> {
        let action = Self::tcp_rule_action(parent, rule_type, "dump")?;
        let scope = Scope::new(parent, parent_name);
        self.fetch_collection(
            self.tcp_rule_store(rule_type),
            Some(&scope),
            transaction_id,
            &action,
            &[parent_name],
        )
        .await
    }

    /// Configuration version and one tcp content rule by id under a parent.
    pub async fn get_tcp_content_rule(
        &self,
        id: i64,
        parent: ParentType,
        parent_name: &str,
        rule_type: RuleType,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<TcpContentRule>, ClientError> {
        let action = Self::tcp_rule_action(parent, rule_type, "show")?;
        let scope = Scope::new(parent, parent_name);
        let id_arg = id.to_string();
        self.fetch_one(
            self.tcp_rule_store(rule_type),
            "tcp content rule",
            ItemKey::Id(id),
            Some(&scope),
            transaction_id,
            &action,
            &[parent_name, &id_arg],
        )
        .await
    }

    /// Create a tcp content rule under a parent. One of transaction id or
    /// version is mandatory.
    pub async fn create_tcp_content_rule(
        &self,
        parent: ParentType,
        parent_name: &str,
        rule_type: RuleType,
        data: &TcpContentRule,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let action = Self::tcp_rule_action(parent, rule_type, "create")?;
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let mut args = vec![parent_name.to_string(), data.id.to_string()];
        push_fields(&mut args, &data.fields());
        self.execute_write(&action, args, token).await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::new(parent, parent_name));
        Ok(())
    }

    /// Edit a tcp content rule under a parent. One of transaction id or
    /// version is mandatory.
    pub async fn edit_tcp_content_rule(
        &self,
        id: i64,
        parent: ParentType,
        parent_name: &str,
        rule_type: RuleType,
        data: &TcpContentRule,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let action = Self::tcp_rule_action(parent, rule_type, "update")?;
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let current = self
            .get_tcp_content_rule(id, parent, parent_name, rule_type, transaction_id)
            .await?
            .data;
        let mut args = vec![parent_name.to_string(), id.to_string()];
        push_changed_fields(&mut args, &current.fields(), &data.fields());
        self.execute_write(&action, args, token).await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::new(parent, parent_name));
        Ok(())
    }

    /// Delete a tcp content rule from a parent. One of transaction id or
    /// version is mandatory.
    pub async fn delete_tcp_content_rule(
        &self,
        id: i64,
        parent: ParentType,
        parent_name: &str,
        rule_type: RuleType,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let action = Self::tcp_rule_action(parent, rule_type, "delete")?;
        let token = WriteToken::resolve(transaction_id, version)?;
        self.execute_write(
            &action,
            vec![parent_name.to_string(), id.to_string()],
            token,
        )
        .await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::new(parent, parent_name));
        Ok(())
    }
}
