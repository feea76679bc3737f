//! Listener operations, scoped to a frontend

use bosun_models::{EngineObject, Listener};

use crate::cache::ItemKey;
use crate::client::{push_changed_fields, push_fields, ConfigClient, Versioned, WriteToken};
use crate::error::ClientError;
use crate::scope::Scope;

impl ConfigClient {
    /// Configuration version and all listeners configured in a frontend.
    pub async fn list_listeners(
        &self,
        frontend: &str,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Vec<Listener>>, ClientError> {
        let scope = Scope::frontend(frontend);
        self.fetch_collection(
            &self.cache.listeners,
            Some(&scope),
            transaction_id,
            "l7-service-bind-dump",
            &[frontend],
        )
        .await
    }

    /// Configuration version and one listener by name in a frontend.
    pub async fn get_listener(
        &self,
        name: &str,
        frontend: &str,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Listener>, ClientError> {
        let scope = Scope::frontend(frontend);
        self.fetch_one(
            &self.cache.listeners,
            "listener",
            ItemKey::name(name),
            Some(&scope),
            transaction_id,
            "l7-service-bind-show",
            &[frontend, name],
        )
        .await
    }

    /// Create a listener in a frontend. One of transaction id or version is
    /// mandatory.
    pub async fn create_listener(
        &self,
        frontend: &str,
        data: &Listener,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let mut args = vec![frontend.to_string(), data.name.clone()];
        push_fields(&mut args, &data.fields());
        self.execute_write("l7-service-bind-create", args, token)
            .await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::frontend(frontend));
        Ok(())
    }

    /// Edit a listener in a frontend. One of transaction id or version is
    /// mandatory.
    pub async fn edit_listener(
        &self,
        name: &str,
        frontend: &str,
        data: &Listener,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let current = self.get_listener(name, frontend, transaction_id).await?.data;
        let mut args = vec![frontend.to_string(), name.to_string()];
        push_changed_fields(&mut args, &current.fields(), &data.fields());
        self.execute_write("l7-service-bind-update", args, token)
            .await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::frontend(frontend));
        Ok(())
    }

    /// Delete a listener from a frontend. One of transaction id or version
    /// is mandatory.
    pub async fn delete_listener(
        &self,
        name: &str,
        frontend: &str,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.execute_write(
            "l7-service-bind-delete",
            vec![frontend.to_string(), name.to_string()],
            token,
        )
        .await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::frontend(frontend));
        Ok(())
    }
}
