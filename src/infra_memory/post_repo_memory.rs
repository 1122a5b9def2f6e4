use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryPostRepo {
    posts: DashMap<PostId, PostRecord>,
}

impl MemoryPostRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn page_of(&self, owner_id: Option<&UserId>, page: Page) -> (Vec<PostRecord>, i64) {
        let mut matching: Vec<PostRecord> = self
            .posts
            .iter()
            .filter(|r| owner_id.is_none_or(|owner| &r.value().owner_id == owner))
            .map(|r| r.value().clone())
            .collect();
        // newest first
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.post_id.cmp(&a.post_id))
        });
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size() as usize)
            .collect();
        (items, total)
    }
}

#[async_trait::async_trait]
impl PostRepo for MemoryPostRepo {
    async fn create(&self, post: &PostRecord) -> Result<(), StoreError> {
        if self.posts.contains_key(&post.post_id) {
            return Err(StoreError::Duplicate(post.post_id.to_string()));
        }
        self.posts.insert(post.post_id.clone(), post.clone());
        Ok(())
    }

    async fn get_by_id(&self, post_id: &PostId) -> Result<Option<PostRecord>, StoreError> {
        Ok(self.posts.get(post_id).map(|r| r.value().clone()))
    }

    async fn update_content(
        &self,
        post_id: &PostId,
        title: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if let Some(mut post) = self.posts.get_mut(post_id) {
            post.title = title.to_string();
            post.content = content.to_string();
            post.updated_at = updated_at;
        }
        Ok(())
    }

    async fn delete(&self, post_id: &PostId) -> Result<(), StoreError> {
        self.posts.remove(post_id);
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<(Vec<PostRecord>, i64), StoreError> {
        Ok(self.page_of(None, page))
    }

    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        page: Page,
    ) -> Result<(Vec<PostRecord>, i64), StoreError> {
        Ok(self.page_of(Some(owner_id), page))
    }

    async fn count_by_owner(&self, owner_id: &UserId) -> Result<i64, StoreError> {
        let count = self
            .posts
            .iter()
            .filter(|r| &r.value().owner_id == owner_id)
            .count();
        Ok(count as i64)
    }
}
