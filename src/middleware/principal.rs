use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::core::AppError;

/// Header carrying the authenticated customer, set by the upstream gateway
pub const OWNER_REF_HEADER: &str = "X-Owner-Ref";

/// Customer the request acts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerPrincipal(pub String);

impl OwnerPrincipal {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for OwnerPrincipal {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let owner = req
            .headers()
            .get(OWNER_REF_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| OwnerPrincipal(s.to_string()))
            .ok_or_else(|| AppError::unauthorized(format!("Missing {} header", OWNER_REF_HEADER)));

        ready(owner)
    }
}
