use crate::application_port::UserInfo;
use crate::domain_model::UserId;
use crate::domain_port::{StoreError, UserRecord};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("post count for {user_id} failed: {source}")]
    Downstream { user_id: UserId, source: StoreError },
    #[error("aggregation cancelled")]
    Cancelled,
    #[error("aggregation task failed: {0}")]
    Task(String),
}

#[async_trait::async_trait]
pub trait UserAggregator: Send + Sync {
    /// Enriches every user with its post total. All-or-nothing: the first
    /// failing count aborts the rest and is returned as the error.
    async fn aggregate(
        &self,
        users: Vec<UserRecord>,
        cancel: &CancellationToken,
    ) -> Result<Vec<UserInfo>, AggregationError>;
}
