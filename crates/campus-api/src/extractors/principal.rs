//! `Principal` extractor: builds the request context from gateway headers.
//!
//! Authentication happens upstream. The gateway forwards the verified
//! principal as `x-user-id` plus the cohort headers, and callers may bound
//! uploads and fan-out with `x-deadline-ms`.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use campus_core::error::AppError;
use campus_core::types::UserId;
use campus_service::RequestContext;

use crate::error::ApiError;

/// Header carrying the principal's id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the principal's department.
pub const DEPARTMENT_HEADER: &str = "x-user-department";
/// Header carrying the principal's academic year.
pub const YEAR_HEADER: &str = "x-user-year";
/// Header carrying the caller's deadline in milliseconds.
pub const DEADLINE_HEADER: &str = "x-deadline-ms";

/// The acting principal, available in handlers.
#[derive(Debug, Clone)]
pub struct Principal(pub RequestContext);

impl std::ops::Deref for Principal {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Parse `x-deadline-ms`, if present.
pub fn deadline_from(headers: &HeaderMap) -> Result<Option<Duration>, AppError> {
    header(headers, DEADLINE_HEADER)
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| AppError::validation(format!("Invalid {DEADLINE_HEADER}: {raw}")))
        })
        .transpose()
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = header(&parts.headers, USER_ID_HEADER)
            .ok_or_else(|| AppError::authentication(format!("Missing {USER_ID_HEADER} header")))?;
        let user_id = raw
            .parse::<UserId>()
            .map_err(|_| AppError::authentication(format!("Invalid {USER_ID_HEADER} header")))?;

        let mut ctx = RequestContext::new(user_id);
        ctx.department = header(&parts.headers, DEPARTMENT_HEADER).map(String::from);
        ctx.year = header(&parts.headers, YEAR_HEADER).map(String::from);
        ctx.deadline = deadline_from(&parts.headers)?;

        Ok(Principal(ctx))
    }
}
