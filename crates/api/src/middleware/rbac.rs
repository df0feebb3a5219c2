//! Role-based access control (RBAC) extractors.
//!
//! These gate whole route groups by role. Per-listing ownership is checked
//! by the workflow itself.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use stayboard_core::error::CoreError;
use stayboard_core::roles::{ROLE_ADMIN, ROLE_MERCHANT};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `merchant` role. Rejects with 403 Forbidden otherwise.
///
/// Guards the "my listing" routes, which address the caller's own listing.
pub struct RequireMerchant(pub AuthUser);

impl FromRequestParts<AppState> for RequireMerchant {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_MERCHANT {
            return Err(AppError::Core(CoreError::Forbidden(
                "Merchant role required".into(),
            )));
        }
        Ok(RequireMerchant(user))
    }
}
