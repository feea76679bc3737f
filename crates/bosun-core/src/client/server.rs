//! Server operations, scoped to a backend

use bosun_models::{EngineObject, Server};

use crate::cache::ItemKey;
use crate::client::{push_changed_fields, push_fields, ConfigClient, Versioned, WriteToken};
use crate::error::ClientError;
use crate::scope::Scope;

impl ConfigClient {
    /// Configuration version and all servers configured in a backend.
    pub async fn list_servers(
        &self,
        backend: &str,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Vec<Server>>, ClientError> {
        let scope = Scope::backend(backend);
        self.fetch_collection(
            &self.cache.servers,
            Some(&scope),
            transaction_id,
            "l7-farm-server-dump",
            &[backend],
        )
        .await
    }

    /// Configuration version and one server by name in a backend.
    pub async fn get_server(
        &self,
        name: &str,
        backend: &str,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Server>, ClientError> {
        let scope = Scope::backend(backend);
        self.fetch_one(
            &self.cache.servers,
            "server",
            ItemKey::name(name),
            Some(&scope),
            transaction_id,
            "l7-farm-server-show",
            &[backend, name],
        )
        .await
    }

    /// Create a server in a backend. One of transaction id or version is
    /// mandatory.
    pub async fn create_server(
        &self,
        backend: &str,
        data: &Server,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let mut args = vec![backend.to_string(), data.name.clone()];
        push_fields(&mut args, &data.fields());
        self.execute_write("l7-farm-server-create", args, token)
            .await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::backend(backend));
        Ok(())
    }

    /// Edit a server in a backend. One of transaction id or version is
    /// mandatory.
    pub async fn edit_server(
        &self,
        name: &str,
        backend: &str,
        data: &Server,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let current = self.get_server(name, backend, transaction_id).await?.data;
        let mut args = vec![backend.to_string(), name.to_string()];
        push_changed_fields(&mut args, &current.fields(), &data.fields());
        self.execute_write("l7-farm-server-update", args, token)
            .await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::backend(backend));
        Ok(())
    }

    /// Delete a server from a backend. One of transaction id or version is
    /// mandatory.
    pub async fn delete_server(
        &self,
        name: &str,
        backend: &str,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.execute_write(
            "l7-farm-server-delete",
            vec![backend.to_string(), name.to_string()],
            token,
        )
        .await?;

        self.cache
            .invalidate_parent(token.cache_key(), &Scope::backend(backend));
        Ok(())
    }
}
