use crate::application_port::AggregationError;
use crate::domain_model::{Page, UserId};
use crate::domain_port::{StoreError, UserRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("user not found")]
    UserNotFound,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Public projection of a user plus its derived post total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: UserId,
    pub username: String,
    pub nickname: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub post_total: i64,
}

impl UserInfo {
    pub fn from_record(record: UserRecord, post_total: i64) -> Self {
        UserInfo {
            user_id: record.user_id,
            username: record.username,
            nickname: record.nickname,
            email: record.email,
            phone: record.phone,
            created_at: record.created_at,
            updated_at: record.updated_at,
            post_total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub total_count: i64,
    pub has_more: bool,
    pub users: Vec<UserInfo>,
}

#[derive(Debug, Clone)]
pub struct UpdateUserInput {
    pub user_id: UserId,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, user_id: &UserId) -> Result<UserInfo, UserError>;
    async fn update_user(&self, request: UpdateUserInput) -> Result<UserInfo, UserError>;
    async fn delete_user(&self, user_id: &UserId) -> Result<(), UserError>;
    async fn list_users(
        &self,
        page: Page,
        cancel: &CancellationToken,
    ) -> Result<UserPage, UserError>;
}
