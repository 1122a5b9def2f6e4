use super::error::*;
use crate::application_port::TokenCodec;
use crate::domain_model::{Principal, UserId};
use crate::logger::*;
use std::sync::Arc;
use warp::Filter;
use warp::http::header::AUTHORIZATION;
use warp::http::{HeaderMap, HeaderValue};

/// Per-request context. A principal is bound only after the bearer token
/// has been verified.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    principal: Option<Principal>,
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("request has no verified principal")]
pub struct NoPrincipal;

impl RequestContext {
    pub fn anonymous() -> Self {
        RequestContext::default()
    }

    pub fn principal(&self) -> Result<&Principal, NoPrincipal> {
        self.principal.as_ref().ok_or(NoPrincipal)
    }

    pub fn subject(&self) -> Option<&UserId> {
        self.principal.as_ref().map(Principal::subject)
    }

    pub fn label(&self) -> Option<&str> {
        self.principal.as_ref().map(Principal::label)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` value. Any
/// other shape, including extra whitespace or a lowercase scheme, is `None`.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if scheme != "Bearer" || token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

pub fn authenticate(
    codec: &dyn TokenCodec,
    ctx: &mut RequestContext,
    header: Option<&HeaderValue>,
) -> Result<(), ApiError> {
    let unauthorized = || ApiError::new(ResponseCode::Unauthorized);

    let header = header.filter(|h| !h.is_empty()).ok_or_else(unauthorized)?;
    // Opaque (non visible-ASCII) bytes can never form a bearer token.
    let header = header.to_str().map_err(|_| {
        debug!("rejecting non-ASCII authorization header");
        unauthorized()
    })?;
    let token = parse_bearer(header).ok_or_else(|| {
        debug!("rejecting malformed authorization header");
        unauthorized()
    })?;
    let principal = codec.verify(token).map_err(|e| {
        debug!("rejecting bearer token: {}", e);
        unauthorized()
    })?;

    ctx.principal = Some(principal);
    Ok(())
}

/// Filter guarding every protected route. The raw header map is read
/// instead of `warp::header::optional`, which rejects undecodable values
/// with its own rejection before the gate can answer 401.
pub fn with_principal(
    codec: Arc<dyn TokenCodec>,
) -> impl Filter<Extract = (RequestContext,), Error = warp::Rejection> + Clone {
    warp::header::headers_cloned().and_then(move |headers: HeaderMap| {
        let codec = codec.clone();
        async move {
            let mut ctx = RequestContext::anonymous();
            authenticate(codec.as_ref(), &mut ctx, headers.get(AUTHORIZATION))?;
            Ok::<_, warp::Rejection>(ctx)
        }
    })
}
