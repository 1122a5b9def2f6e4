use super::validation::*;
use crate::application_port::*;
use crate::domain_model::{Page, UserId};
use crate::domain_port::{PostRepo, ProfilePatch, UserRepo};
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
    post_repo: Arc<dyn PostRepo>,
    aggregator: Arc<dyn UserAggregator>,
}

impl RealUserService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        post_repo: Arc<dyn PostRepo>,
        aggregator: Arc<dyn UserAggregator>,
    ) -> RealUserService {
        RealUserService {
            user_repo,
            post_repo,
            aggregator,
        }
    }

    fn validate_patch(request: &UpdateUserInput) -> Result<(), UserError> {
        if let Some(nickname) = &request.nickname {
            validate_nickname(nickname).map_err(UserError::Validation)?;
        }
        if let Some(email) = &request.email {
            validate_email(email).map_err(UserError::Validation)?;
        }
        if let Some(phone) = &request.phone {
            validate_phone(phone).map_err(UserError::Validation)?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn get_user(&self, user_id: &UserId) -> Result<UserInfo, UserError> {
        let record = self
            .user_repo
            .get_by_id(user_id)
            .await?
            .ok_or(UserError::UserNotFound)?;
        let post_total = self.post_repo.count_by_owner(user_id).await?;
        Ok(UserInfo::from_record(record, post_total))
    }

    async fn update_user(&self, request: UpdateUserInput) -> Result<UserInfo, UserError> {
        Self::validate_patch(&request)?;

        if self.user_repo.get_by_id(&request.user_id).await?.is_none() {
            return Err(UserError::UserNotFound);
        }

        let patch = ProfilePatch {
            nickname: request.nickname,
            email: request.email,
            phone: request.phone,
        };
        self.user_repo
            .update_profile(&request.user_id, &patch, Utc::now())
            .await?;

        info!(user_id = %request.user_id, "profile updated");
        self.get_user(&request.user_id).await
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), UserError> {
        if self.user_repo.get_by_id(user_id).await?.is_none() {
            return Err(UserError::UserNotFound);
        }
        self.user_repo.delete(user_id).await?;
        info!(%user_id, "user deleted");
        Ok(())
    }

    async fn list_users(
        &self,
        page: Page,
        cancel: &CancellationToken,
    ) -> Result<UserPage, UserError> {
        let (records, total_count) = self.user_repo.list(page).await?;
        let users = self.aggregator.aggregate(records, cancel).await?;

        Ok(UserPage {
            total_count,
            has_more: page.has_more(total_count),
            users,
        })
    }
}
