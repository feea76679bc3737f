//! Engine invocation trait

use async_trait::async_trait;

use crate::error::EngineError;

/// Interface to the external control binary owning the authoritative
/// configuration.
///
/// Implementations are the only place where blocking I/O happens; callers
/// never hold internal locks across these calls. Retry policy, cancellation
/// and timeouts belong to implementations, never to callers.
#[async_trait]
pub trait ConfigEngine: Send + Sync {
    /// Run one engine action and return its raw text output.
    ///
    /// `transaction_id` scopes the action to a pending transaction; `None`
    /// applies it against the live configuration.
    async fn run(
        &self,
        action: &str,
        transaction_id: Option<&str>,
        args: &[&str],
    ) -> Result<String, EngineError>;

    /// Version of the committed configuration, or the baseline of the given
    /// transaction.
    async fn current_version(&self, transaction_id: Option<&str>) -> Result<i64, EngineError>;
}
