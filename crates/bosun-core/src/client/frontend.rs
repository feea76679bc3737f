//! Frontend operations

use bosun_models::{EngineObject, Frontend};

use crate::cache::ItemKey;
use crate::client::{push_changed_fields, push_fields, ConfigClient, Versioned, WriteToken};
use crate::error::ClientError;

impl ConfigClient {
    /// Configuration version and all configured frontends.
    pub async fn list_frontends(
        &self,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Vec<Frontend>>, ClientError> {
        self.fetch_collection(
            &self.cache.frontends,
            None,
            transaction_id,
            "l7-service-dump",
            &[],
        )
        .await
    }

    /// Configuration version and one frontend by name.
    pub async fn get_frontend(
        &self,
        name: &str,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Frontend>, ClientError> {
        self.fetch_one(
            &self.cache.frontends,
            "frontend",
            ItemKey::name(name),
            None,
            transaction_id,
            "l7-service-show",
            &[name],
        )
        .await
    }

    /// Create a frontend. One of transaction id or version is mandatory.
    pub async fn create_frontend(
        &self,
        data: &Frontend,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let mut args = vec![data.name.clone()];
        push_fields(&mut args, &data.fields());
        self.execute_write("l7-service-create", args, token).await?;

        self.cache.invalidate_frontend(token.cache_key(), &data.name);
        Ok(())
    }

    /// Edit a frontend. One of transaction id or version is mandatory.
    pub async fn edit_frontend(
        &self,
        name: &str,
        data: &Frontend,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let current = self.get_frontend(name, transaction_id).await?.data;
        let mut args = vec![name.to_string()];
        push_changed_fields(&mut args, &current.fields(), &data.fields());
        self.execute_write("l7-service-update", args, token).await?;

        self.cache.invalidate_frontend(token.cache_key(), name);
        Ok(())
    }

    /// Delete a frontend and everything scoped under it. One of transaction
    /// id or version is mandatory.
    pub async fn delete_frontend(
        &self,
        name: &str,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.execute_write("l7-service-delete", vec![name.to_string()], token)
            .await?;

        self.cache.invalidate_frontend(token.cache_key(), name);
        Ok(())
    }
}
