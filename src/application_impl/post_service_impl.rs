use super::validation::validate_post;
use crate::application_port::*;
use crate::domain_model::{Page, PostId, UserId};
use crate::domain_port::{PostRecord, PostRepo};
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealPostService {
    post_repo: Arc<dyn PostRepo>,
}

impl RealPostService {
    pub fn new(post_repo: Arc<dyn PostRepo>) -> Self {
        RealPostService { post_repo }
    }

    async fn owned_post(&self, actor: &UserId, post_id: &PostId) -> Result<PostRecord, PostError> {
        let post = self
            .post_repo
            .get_by_id(post_id)
            .await?
            .ok_or(PostError::PostNotFound)?;
        if &post.owner_id != actor {
            warn!(%post_id, %actor, "post belongs to another user");
            return Err(PostError::AccessDenied);
        }
        Ok(post)
    }
}

#[async_trait::async_trait]
impl PostService for RealPostService {
    async fn create_post(&self, request: CreatePostInput) -> Result<PostRecord, PostError> {
        validate_post(&request.title, &request.content).map_err(PostError::Validation)?;

        let now = Utc::now();
        let post = PostRecord {
            post_id: PostId::generate(),
            owner_id: request.owner_id,
            title: request.title,
            content: request.content,
            created_at: now,
            updated_at: now,
        };
        self.post_repo.create(&post).await?;

        info!(post_id = %post.post_id, owner_id = %post.owner_id, "post created");
        Ok(post)
    }

    async fn get_post(&self, post_id: &PostId) -> Result<PostRecord, PostError> {
        self.post_repo
            .get_by_id(post_id)
            .await?
            .ok_or(PostError::PostNotFound)
    }

    async fn update_post(&self, request: UpdatePostInput) -> Result<PostRecord, PostError> {
        validate_post(&request.title, &request.content).map_err(PostError::Validation)?;

        let mut post = self.owned_post(&request.actor, &request.post_id).await?;
        post.title = request.title;
        post.content = request.content;
        post.updated_at = Utc::now();

        self.post_repo
            .update_content(&post.post_id, &post.title, &post.content, post.updated_at)
            .await?;
        Ok(post)
    }

    async fn delete_post(&self, actor: &UserId, post_id: &PostId) -> Result<(), PostError> {
        self.owned_post(actor, post_id).await?;
        self.post_repo.delete(post_id).await?;
        info!(%post_id, "post deleted");
        Ok(())
    }

    async fn list_posts(&self, page: Page) -> Result<PostPage, PostError> {
        let (posts, total_count) = self.post_repo.list(page).await?;
        Ok(PostPage {
            total_count,
            has_more: page.has_more(total_count),
            posts,
        })
    }

    async fn list_posts_by_owner(
        &self,
        owner_id: &UserId,
        page: Page,
    ) -> Result<PostPage, PostError> {
        let (posts, total_count) = self.post_repo.list_by_owner(owner_id, page).await?;
        Ok(PostPage {
            total_count,
            has_more: page.has_more(total_count),
            posts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryPostRepo;

    fn service() -> RealPostService {
        RealPostService::new(Arc::new(MemoryPostRepo::new()))
    }

    fn create(owner: &str, title: &str) -> CreatePostInput {
        CreatePostInput {
            owner_id: UserId::from(owner),
            title: title.to_string(),
            content: "hello world".to_string(),
        }
    }

    #[tokio::test]
    async fn owner_can_update_and_delete() {
        let service = service();
        let post = service.create_post(create("user-a", "first")).await.unwrap();

        let updated = service
            .update_post(UpdatePostInput {
                actor: UserId::from("user-a"),
                post_id: post.post_id.clone(),
                title: "renamed".to_string(),
                content: "new body".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(service.get_post(&post.post_id).await.unwrap().content, "new body");

        service
            .delete_post(&UserId::from("user-a"), &post.post_id)
            .await
            .unwrap();
        assert!(matches!(
            service.get_post(&post.post_id).await,
            Err(PostError::PostNotFound)
        ));
    }

    #[tokio::test]
    async fn others_cannot_touch_a_post() {
        let service = service();
        let post = service.create_post(create("user-a", "first")).await.unwrap();

        assert!(matches!(
            service.delete_post(&UserId::from("user-b"), &post.post_id).await,
            Err(PostError::AccessDenied)
        ));
        let update = UpdatePostInput {
            actor: UserId::from("user-b"),
            post_id: post.post_id.clone(),
            title: "mine".to_string(),
            content: "mine".to_string(),
        };
        assert!(matches!(
            service.update_post(update).await,
            Err(PostError::AccessDenied)
        ));
    }

    #[tokio::test]
    async fn listing_by_owner_pages() {
        let service = service();
        for i in 0..3 {
            service
                .create_post(create("user-a", &format!("a{i}")))
                .await
                .unwrap();
        }
        service.create_post(create("user-b", "b0")).await.unwrap();

        let page = service
            .list_posts_by_owner(&UserId::from("user-a"), Page::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.posts.len(), 2);
        assert!(page.has_more);
        assert!(page.posts.iter().all(|p| p.owner_id.as_str() == "user-a"));

        let all = service.list_posts(Page::default()).await.unwrap();
        assert_eq!(all.total_count, 4);
        assert!(!all.has_more);
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let service = service();
        assert!(matches!(
            service.create_post(create("user-a", "")).await,
            Err(PostError::Validation(_))
        ));
    }
}
