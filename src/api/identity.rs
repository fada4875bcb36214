//! Caller identity extraction.
//!
//! Authentication happens upstream; requests arrive carrying the caller's
//! opaque user ID in the `X-User-Id` header. Handlers never interpret the
//! ID beyond equality checks against stored owner IDs.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::services::TradingError;

/// Header carrying the authenticated caller's user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller.
///
/// Add this as a handler argument to require an identity:
///
/// ```ignore
/// async fn my_handler(caller: CallerIdentity) -> ... {
///     let user_id = caller.user_id;
///     // ...
/// }
/// ```
#[derive(Debug)]
pub struct CallerIdentity {
    pub user_id: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = TradingError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                TradingError::Unauthorized("missing X-User-Id header".to_string())
            })?;

        Ok(CallerIdentity {
            user_id: user_id.to_string(),
        })
    }
}
