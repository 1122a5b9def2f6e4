use crate::domain_model::*;
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields that may be patched; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `StoreError::Duplicate` when the username is taken.
    async fn create(&self, user: &UserRecord) -> Result<(), StoreError>;

    async fn get_by_id(&self, user_id: &UserId) -> Result<Option<UserRecord>, StoreError>;

    async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn update_profile(
        &self,
        user_id: &UserId,
        patch: &ProfilePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Touches the password hash and `updated_at` only.
    async fn update_password(
        &self,
        user_id: &UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn delete(&self, user_id: &UserId) -> Result<(), StoreError>;

    /// Returns one page ordered by creation time plus the total row count.
    async fn list(&self, page: Page) -> Result<(Vec<UserRecord>, i64), StoreError>;
}
