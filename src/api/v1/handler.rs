use super::error::*;
use super::gate::RequestContext;
use crate::application_port::*;
use crate::domain_model::{Page, PageQuery, PostId, UserId};
use crate::logger::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const ROOT_USERNAME: &str = "root";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: ResponseCode,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            code: ResponseCode::Ok,
            message: ResponseCode::Ok.to_string(),
            data: Some(data),
        }
    }

    pub fn err(code: ResponseCode, message: impl Into<String>) -> Self {
        ApiResponse {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn empty() -> Self {
        ApiResponse {
            code: ResponseCode::Ok,
            message: ResponseCode::Ok.to_string(),
            data: None,
        }
    }
}

fn forbidden() -> ApiError {
    ApiError::new(ResponseCode::Forbidden)
}

// region: auth

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub async fn register(
    body: RegisterRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = RegisterInput {
        username: body.username,
        password: body.password,
        nickname: body.nickname,
        email: body.email,
        phone: body.phone,
    };
    let user = auth_service.register(input).await.map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: AccessToken,
    pub expires_at: DateTime<Utc>,
    pub user_id: UserId,
    pub username: String,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
    token_codec: Arc<dyn TokenCodec>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let login_input = LoginInput {
        username: body.username,
        password: body.password,
    };
    let principal = auth_service
        .login(login_input)
        .await
        .map_err(ApiError::from)?;
    let issued = token_codec.issue(&principal).map_err(ApiError::from)?;

    let response = LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user_id: principal.subject().clone(),
        username: principal.label().to_string(),
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub async fn change_password(
    user_id: String,
    ctx: RequestContext,
    body: ChangePasswordRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = UserId(user_id);
    let principal = ctx.principal().map_err(ApiError::from)?;
    if principal.subject() != &user_id {
        return Err(forbidden().into());
    }

    let input = ChangePasswordInput {
        user_id,
        old_password: body.old_password,
        new_password: body.new_password,
    };
    auth_service
        .change_password(input)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::<()>::empty()))
}

// endregion

// region: users

pub async fn list_users(
    ctx: RequestContext,
    query: PageQuery,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let page = Page::from(query);
    debug!(caller = ?ctx.subject(), ?page, "listing users");

    // Cancelled when warp drops this future, which tears down the
    // aggregation scope derived from it.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let users = user_service
        .list_users(page, &cancel)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(users)))
}

pub async fn get_user(
    user_id: String,
    _ctx: RequestContext,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = user_service
        .get_user(&UserId(user_id))
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub async fn update_user(
    user_id: String,
    ctx: RequestContext,
    body: UpdateUserRequest,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = UserId(user_id);
    let principal = ctx.principal().map_err(ApiError::from)?;
    if principal.subject() != &user_id {
        return Err(forbidden().into());
    }

    let input = UpdateUserInput {
        user_id,
        nickname: body.nickname,
        email: body.email,
        phone: body.phone,
    };
    let user = user_service
        .update_user(input)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

pub async fn delete_user(
    user_id: String,
    ctx: RequestContext,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = UserId(user_id);
    let principal = ctx.principal().map_err(ApiError::from)?;
    if principal.subject() != &user_id && principal.label() != ROOT_USERNAME {
        return Err(forbidden().into());
    }

    user_service
        .delete_user(&user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::<()>::empty()))
}

pub async fn list_user_posts(
    user_id: String,
    _ctx: RequestContext,
    query: PageQuery,
    post_service: Arc<dyn PostService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let posts = post_service
        .list_posts_by_owner(&UserId(user_id), Page::from(query))
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(posts)))
}

// endregion

// region: posts

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
}

pub async fn create_post(
    ctx: RequestContext,
    body: PostRequest,
    post_service: Arc<dyn PostService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let principal = ctx.principal().map_err(ApiError::from)?;
    let input = CreatePostInput {
        owner_id: principal.subject().clone(),
        title: body.title,
        content: body.content,
    };
    let post = post_service
        .create_post(input)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(post)))
}

pub async fn list_posts(
    _ctx: RequestContext,
    query: PageQuery,
    post_service: Arc<dyn PostService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let posts = post_service
        .list_posts(Page::from(query))
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(posts)))
}

pub async fn get_post(
    post_id: String,
    _ctx: RequestContext,
    post_service: Arc<dyn PostService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let post = post_service
        .get_post(&PostId(post_id))
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(post)))
}

pub async fn update_post(
    post_id: String,
    ctx: RequestContext,
    body: PostRequest,
    post_service: Arc<dyn PostService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let principal = ctx.principal().map_err(ApiError::from)?;
    let input = UpdatePostInput {
        actor: principal.subject().clone(),
        post_id: PostId(post_id),
        title: body.title,
        content: body.content,
    };
    let post = post_service
        .update_post(input)
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(post)))
}

pub async fn delete_post(
    post_id: String,
    ctx: RequestContext,
    post_service: Arc<dyn PostService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let principal = ctx.principal().map_err(ApiError::from)?;
    post_service
        .delete_post(principal.subject(), &PostId(post_id))
        .await
        .map_err(ApiError::from)?;

    Ok(warp::reply::json(&ApiResponse::<()>::empty()))
}

// endregion
