use crate::domain_model::{Page, PostId, UserId};
use crate::domain_port::{PostRecord, StoreError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("post not found")]
    PostNotFound,
    #[error("post belongs to another user")]
    AccessDenied,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub owner_id: UserId,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct UpdatePostInput {
    pub actor: UserId,
    pub post_id: PostId,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub total_count: i64,
    pub has_more: bool,
    pub posts: Vec<PostRecord>,
}

#[async_trait::async_trait]
pub trait PostService: Send + Sync {
    async fn create_post(&self, request: CreatePostInput) -> Result<PostRecord, PostError>;
    async fn get_post(&self, post_id: &PostId) -> Result<PostRecord, PostError>;
    async fn update_post(&self, request: UpdatePostInput) -> Result<PostRecord, PostError>;
    async fn delete_post(&self, actor: &UserId, post_id: &PostId) -> Result<(), PostError>;
    async fn list_posts(&self, page: Page) -> Result<PostPage, PostError>;
    async fn list_posts_by_owner(&self, owner_id: &UserId, page: Page)
    -> Result<PostPage, PostError>;
}
