//! Backend operations

use bosun_models::{Backend, EngineObject};

use crate::cache::ItemKey;
use crate::client::{push_changed_fields, push_fields, ConfigClient, Versioned, WriteToken};
use crate::error::ClientError;

impl ConfigClient {
    /// Configuration version and all configured backends.
    pub async fn list_backends(
        &self,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Vec<Backend>>, ClientError> {
        self.fetch_collection(
            &self.cache.backends,
            None,
            transaction_id,
            "l7-farm-dump",
            &[],
        )
        .await
    }

    /// Configuration version and one backend by name.
    pub async fn get_backend(
        &self,
        name: &str,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Backend>, ClientError> {
        self.fetch_one(
            &self.cache.backends,
            "backend",
            ItemKey::name(name),
            None,
            transaction_id,
            "l7-farm-show",
            &[name],
        )
        .await
    }

    /// Create a backend. One of transaction id or version is mandatory.
    pub async fn create_backend(
        &self,
        data: &Backend,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let mut args = vec![data.name.clone()];
        push_fields(&mut args, &data.fields());
        self.execute_write("l7-farm-create", args, token).await?;

        self.cache.invalidate_backend(token.cache_key(), &data.name);
        Ok(())
    }

    /// Edit a backend. One of transaction id or version is mandatory.
    pub async fn edit_backend(
        &self,
        name: &str,
        data: &Backend,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let current = self.get_backend(name, transaction_id).await?.data;
        let mut args = vec![name.to_string()];
        push_changed_fields(&mut args, &current.fields(), &data.fields());
        self.execute_write("l7-farm-update", args, token).await?;

        self.cache.invalidate_backend(token.cache_key(), name);
        Ok(())
    }

    /// Delete a backend and everything scoped under it. One of transaction
    /// id or version is mandatory.
    pub async fn delete_backend(
        &self,
        name: &str,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.execute_write("l7-farm-delete", vec![name.to_string()], token)
            .await?;

        self.cache.invalidate_backend(token.cache_key(), name);
        Ok(())
    }
}
