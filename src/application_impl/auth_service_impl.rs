use super::validation::*;
use crate::application_port::*;
use crate::domain_model::{Principal, UserId};
use crate::domain_port::{UserRecord, UserRepo};
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealAuthService {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
}

impl RealAuthService {
    pub fn new(user_repo: Arc<dyn UserRepo>, credential_hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            user_repo,
            credential_hasher,
        }
    }

    fn validate_register(request: &RegisterInput) -> Result<(), AuthError> {
        validate_username(&request.username).map_err(AuthError::Validation)?;
        validate_password(&request.password).map_err(AuthError::Validation)?;
        if let Some(nickname) = &request.nickname {
            validate_nickname(nickname).map_err(AuthError::Validation)?;
        }
        if let Some(email) = &request.email {
            validate_email(email).map_err(AuthError::Validation)?;
        }
        if let Some(phone) = &request.phone {
            validate_phone(phone).map_err(AuthError::Validation)?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn register(&self, request: RegisterInput) -> Result<UserInfo, AuthError> {
        Self::validate_register(&request)?;

        if self
            .user_repo
            .get_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = self.credential_hasher.hash_password(&request.password).await?;
        let now = Utc::now();
        let record = UserRecord {
            user_id: UserId::generate(),
            nickname: request.nickname.unwrap_or_else(|| request.username.clone()),
            username: request.username,
            password_hash,
            email: request.email,
            phone: request.phone,
            created_at: now,
            updated_at: now,
        };
        // A concurrent registration can still win the race; the unique
        // index turns that into `StoreError::Duplicate`.
        self.user_repo.create(&record).await?;

        info!(user_id = %record.user_id, username = %record.username, "user registered");
        Ok(UserInfo::from_record(record, 0))
    }

    async fn login(&self, request: LoginInput) -> Result<Principal, AuthError> {
        let LoginInput { username, password } = request;

        let rec = self
            .user_repo
            .get_by_username(&username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let ok = self
            .credential_hasher
            .verify_password(&password, &rec.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::PasswordIncorrect);
        }

        debug!(user_id = %rec.user_id, "credentials verified");
        Ok(Principal::new(rec.user_id, rec.username))
    }

    async fn change_password(&self, request: ChangePasswordInput) -> Result<(), AuthError> {
        let ChangePasswordInput {
            user_id,
            old_password,
            new_password,
        } = request;

        validate_password(&new_password).map_err(AuthError::Validation)?;

        let rec = self
            .user_repo
            .get_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let ok = self
            .credential_hasher
            .verify_password(&old_password, &rec.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::PasswordIncorrect);
        }

        let password_hash = self.credential_hasher.hash_password(&new_password).await?;
        self.user_repo
            .update_password(&user_id, &password_hash, Utc::now())
            .await?;

        info!(%user_id, "password changed");
        Ok(())
    }
}
