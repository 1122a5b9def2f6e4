use crate::api::v1::gate::NoPrincipal;
use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::logger::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{
    InvalidHeader, InvalidQuery, LengthRequired, MethodNotAllowed, MissingHeader, PayloadTooLarge,
    UnsupportedMediaType,
};
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let api_error = if let Some(e) = err.find::<ApiError>() {
        e.clone()
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        ApiError::new(ResponseCode::InvalidParams).with_message(e.to_string())
    } else if let Some(e) = err.find::<InvalidQuery>() {
        ApiError::new(ResponseCode::InvalidParams).with_message(e.to_string())
    } else if let Some(e) = err.find::<UnsupportedMediaType>() {
        ApiError::new(ResponseCode::InvalidParams).with_message(e.to_string())
    } else if let Some(e) = err.find::<PayloadTooLarge>() {
        ApiError::new(ResponseCode::InvalidParams).with_message(e.to_string())
    } else if let Some(e) = err.find::<LengthRequired>() {
        ApiError::new(ResponseCode::InvalidParams).with_message(e.to_string())
    } else if let Some(e) = err.find::<MissingHeader>() {
        ApiError::new(ResponseCode::InvalidParams).with_message(e.to_string())
    } else if let Some(e) = err.find::<InvalidHeader>() {
        ApiError::new(ResponseCode::InvalidParams).with_message(e.to_string())
    } else if err.find::<MethodNotAllowed>().is_some() {
        ApiError::new(ResponseCode::MethodNotAllowed)
    } else if err.is_not_found() {
        ApiError::new(ResponseCode::NotFound)
    } else {
        warn!("Unhandled rejection: {:?}", err);
        ApiError::new(ResponseCode::InternalError)
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(api_error.code, api_error.message));
    Ok(warp::reply::with_status(json, api_error.code.status()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseCode {
    #[error("success")]
    Ok,
    #[error("Invalid parameters")]
    InvalidParams,
    #[error("Missing or invalid credentials")]
    Unauthorized,
    #[error("Password incorrect")]
    PasswordIncorrect,
    #[error("Operation not permitted")]
    Forbidden,
    #[error("User not found")]
    UserNotFound,
    #[error("Post not found")]
    PostNotFound,
    #[error("Resource not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("Failed to aggregate user data")]
    AggregationFailed,
    #[error("Internal error")]
    InternalError,
}

impl ResponseCode {
    pub fn status(self) -> StatusCode {
        match self {
            ResponseCode::Ok => StatusCode::OK,
            ResponseCode::InvalidParams => StatusCode::BAD_REQUEST,
            ResponseCode::Unauthorized | ResponseCode::PasswordIncorrect => {
                StatusCode::UNAUTHORIZED
            }
            ResponseCode::Forbidden => StatusCode::FORBIDDEN,
            ResponseCode::UserNotFound | ResponseCode::PostNotFound | ResponseCode::NotFound => {
                StatusCode::NOT_FOUND
            }
            ResponseCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ResponseCode::UserAlreadyExists => StatusCode::CONFLICT,
            ResponseCode::AggregationFailed | ResponseCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Rejection carried through warp and rendered by [`recover_error`].
#[derive(Debug, Clone)]
pub struct ApiError {
    pub code: ResponseCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ResponseCode) -> Self {
        ApiError {
            code,
            message: code.to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Logs the detail; clients only see the generic message for `code`.
    pub fn internal<E: std::fmt::Display>(code: ResponseCode, error: E) -> Self {
        error!("Internal error: {}", error);
        ApiError::new(code)
    }
}

impl reject::Reject for ApiError {}

impl From<NoPrincipal> for ApiError {
    fn from(_: NoPrincipal) -> Self {
        ApiError::new(ResponseCode::Unauthorized)
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::UserNotFound => ApiError::new(ResponseCode::UserNotFound),
            AuthError::UserAlreadyExists => ApiError::new(ResponseCode::UserAlreadyExists),
            AuthError::PasswordIncorrect => ApiError::new(ResponseCode::PasswordIncorrect),
            AuthError::InvalidToken => ApiError::new(ResponseCode::Unauthorized),
            AuthError::Validation(m) => ApiError::new(ResponseCode::InvalidParams).with_message(m),
            AuthError::Store(e) => ApiError::internal(ResponseCode::InternalError, e),
            AuthError::InternalError(e) => ApiError::internal(ResponseCode::InternalError, e),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::UserNotFound => ApiError::new(ResponseCode::UserNotFound),
            UserError::Validation(m) => ApiError::new(ResponseCode::InvalidParams).with_message(m),
            UserError::Aggregation(e) => ApiError::from(e),
            UserError::Store(e) => ApiError::internal(ResponseCode::InternalError, e),
        }
    }
}

impl From<PostError> for ApiError {
    fn from(error: PostError) -> Self {
        match error {
            PostError::PostNotFound => ApiError::new(ResponseCode::PostNotFound),
            PostError::AccessDenied => ApiError::new(ResponseCode::Forbidden),
            PostError::Validation(m) => ApiError::new(ResponseCode::InvalidParams).with_message(m),
            PostError::Store(e) => ApiError::internal(ResponseCode::InternalError, e),
        }
    }
}

impl From<AggregationError> for ApiError {
    fn from(error: AggregationError) -> Self {
        ApiError::internal(ResponseCode::AggregationFailed, error)
    }
}
