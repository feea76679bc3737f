//! Transaction and version operations
//!
//! Transactions live in the engine; the client wraps their lifecycle and
//! keeps the cache consistent with it. Transaction records are never
//! cached, they are not configuration entities.

use tracing::info;
use uuid::Uuid;

use bosun_models::{EngineObject, Transaction, TransactionStatus};

use crate::client::ConfigClient;
use crate::error::ClientError;
use crate::parse;

impl ConfigClient {
    /// Current configuration version, or a transaction's baseline version.
    pub async fn version(&self, transaction_id: Option<&str>) -> Result<i64, ClientError> {
        Ok(self.engine.current_version(transaction_id).await?)
    }

    /// All transactions known to the engine, optionally filtered by status.
    pub async fn list_transactions(
        &self,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<Transaction>, ClientError> {
        let raw = self.engine.run("transaction-list", None, &[]).await?;
        let mut transactions = parse::parse_collection::<Transaction>(&raw);
        if let Some(status) = status {
            transactions.retain(|transaction| transaction.status == status);
        }
        Ok(transactions)
    }

    /// One transaction by id.
    pub async fn get_transaction(&self, id: &str) -> Result<Transaction, ClientError> {
        let raw = self.engine.run("transaction-show", None, &[id]).await?;
        if raw.trim().is_empty() {
            return Err(ClientError::NotFound(format!("transaction {}", id)));
        }
        let mut transaction = Transaction::default();
        transaction.apply_header_token(id);
        parse::apply_record_fields(&raw, &mut transaction);
        Ok(transaction)
    }

    /// Open a transaction against a baseline configuration version.
    pub async fn start_transaction(&self, version: i64) -> Result<Transaction, ClientError> {
        let id = Uuid::new_v4().to_string();
        let version_arg = version.to_string();
        self.engine
            .run("transaction-begin", Some(&id), &["--version", &version_arg])
            .await?;

        self.cache.set_version(&id, version);
        info!("Started transaction {} at version {}", id, version);
        Ok(Transaction {
            id,
            status: TransactionStatus::InProgress,
            version,
        })
    }

    /// Commit a transaction, promoting its edits to a new configuration
    /// version. Returns that version.
    pub async fn commit_transaction(&self, id: &str) -> Result<i64, ClientError> {
        self.engine.run("transaction-commit", Some(id), &[]).await?;

        // the commit replaced both the transaction's view and the live one
        self.cache.invalidate_transaction(id);
        self.cache.invalidate_transaction("");

        let version = self.engine.current_version(None).await?;
        info!("Committed transaction {}, configuration is at {}", id, version);
        Ok(version)
    }

    /// Abandon a transaction, discarding its pending edits.
    pub async fn abort_transaction(&self, id: &str) -> Result<(), ClientError> {
        self.engine.run("transaction-abort", Some(id), &[]).await?;
        self.cache.invalidate_transaction(id);
        info!("Aborted transaction {}", id);
        Ok(())
    }
}
