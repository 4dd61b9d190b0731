//! Caller identity.
//!
//! Authentication happens in front of this service; the authenticated user
//! id arrives in the `X-User-Id` header and is trusted as-is.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use rf_core::UserId;

use crate::error::ApiError;

pub const USER_HEADER: &str = "X-User-Id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub UserId);

impl Identity {
    pub fn from_request_headers(req: &HttpRequest) -> Result<Self, ApiError> {
        let raw = req
            .headers()
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        UserId::parse(raw).map(Identity).map_err(|_| ApiError::Unauthorized)
    }
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_request_headers(req))
    }
}
