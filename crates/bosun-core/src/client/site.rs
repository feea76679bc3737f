//! Site operations

use bosun_models::{EngineObject, Site};

use crate::cache::ItemKey;
use crate::client::{push_changed_fields, push_fields, ConfigClient, Versioned, WriteToken};
use crate::error::ClientError;

impl ConfigClient {
    /// Configuration version and all configured sites.
    pub async fn list_sites(
        &self,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Vec<Site>>, ClientError> {
        self.fetch_collection(&self.cache.sites, None, transaction_id, "l7-site-dump", &[])
            .await
    }

    /// Configuration version and one site by name.
    pub async fn get_site(
        &self,
        name: &str,
        transaction_id: Option<&str>,
    ) -> Result<Versioned<Site>, ClientError> {
        self.fetch_one(
            &self.cache.sites,
            "site",
            ItemKey::name(name),
            None,
            transaction_id,
            "l7-site-show",
            &[name],
        )
        .await
    }

    /// Create a site. One of transaction id or version is mandatory.
    pub async fn create_site(
        &self,
        data: &Site,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let mut args = vec![data.name.clone()];
        push_fields(&mut args, &data.fields());
        self.execute_write("l7-site-create", args, token).await?;

        self.cache.invalidate_site(token.cache_key(), &data.name);
        Ok(())
    }

    /// Edit a site. One of transaction id or version is mandatory.
    pub async fn edit_site(
        &self,
        name: &str,
        data: &Site,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.validate_payload(data)?;

        let current = self.get_site(name, transaction_id).await?.data;
        let mut args = vec![name.to_string()];
        push_changed_fields(&mut args, &current.fields(), &data.fields());
        self.execute_write("l7-site-update", args, token).await?;

        self.cache.invalidate_site(token.cache_key(), name);
        Ok(())
    }

    /// Delete a site. One of transaction id or version is mandatory.
    pub async fn delete_site(
        &self,
        name: &str,
        transaction_id: Option<&str>,
        version: Option<i64>,
    ) -> Result<(), ClientError> {
        let token = WriteToken::resolve(transaction_id, version)?;
        self.execute_write("l7-site-delete", vec![name.to_string()], token)
            .await?;

        self.cache.invalidate_site(token.cache_key(), name);
        Ok(())
    }
}
