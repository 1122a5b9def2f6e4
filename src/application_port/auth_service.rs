use crate::application_port::UserInfo;
use crate::domain_model::{Principal, UserId};
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("user not found")]
    UserNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("password incorrect")]
    PasswordIncorrect,
    #[error("token invalid")]
    InvalidToken,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate(_) => AuthError::UserAlreadyExists,
            StoreError::Backend(e) => AuthError::Store(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ChangePasswordInput {
    pub user_id: UserId,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

/// Stateless bearer token issuance and verification.
///
/// Verification is CPU-bound, so unlike the store ports this trait is
/// synchronous.
pub trait TokenCodec: Send + Sync {
    fn issue(&self, principal: &Principal) -> Result<IssuedToken, AuthError>;

    /// Every failure (malformed, wrong signature or algorithm, wrong
    /// issuer, outside the validity window) is `AuthError::InvalidToken`.
    fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, request: RegisterInput) -> Result<UserInfo, AuthError>;

    /// Verifies credentials only. Minting a token for the returned
    /// principal is the caller's job.
    async fn login(&self, request: LoginInput) -> Result<Principal, AuthError>;

    async fn change_password(&self, request: ChangePasswordInput) -> Result<(), AuthError>;
}
