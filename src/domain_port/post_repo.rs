use crate::domain_model::*;
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub post_id: PostId,
    pub owner_id: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait PostRepo: Send + Sync {
    async fn create(&self, post: &PostRecord) -> Result<(), StoreError>;

    async fn get_by_id(&self, post_id: &PostId) -> Result<Option<PostRecord>, StoreError>;

    async fn update_content(
        &self,
        post_id: &PostId,
        title: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn delete(&self, post_id: &PostId) -> Result<(), StoreError>;

    async fn list(&self, page: Page) -> Result<(Vec<PostRecord>, i64), StoreError>;

    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        page: Page,
    ) -> Result<(Vec<PostRecord>, i64), StoreError>;

    async fn count_by_owner(&self, owner_id: &UserId) -> Result<i64, StoreError>;
}
