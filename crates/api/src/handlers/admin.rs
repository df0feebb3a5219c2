//! Handlers for the `/admin/listings` review surface.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stayboard_core::types::DbId;
use stayboard_db::models::listing::ListingFilter;
use stayboard_db::ListingWorkflow;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::ListingListParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/listings/{id}/reject`.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// Request body for `PUT /admin/listings/{id}/banner`.
#[derive(Debug, Deserialize)]
pub struct BannerRequest {
    pub is_banner: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/listings
///
/// Every listing matching the status/keyword filter, most recently updated
/// first, summarised in the editing view.
pub async fn list_listings(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListingListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = ListingFilter {
        status: params.status,
        keyword: params.keyword,
    };
    let page = ListingWorkflow::list(
        &state.pool,
        &admin.actor(),
        &filter,
        params.page,
        params.page_size,
    )
    .await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/admin/listings/{id}/approve
pub async fn approve(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingWorkflow::approve(&state.pool, &admin.actor(), listing_id).await?;
    Ok(Json(DataResponse { data: listing }))
}

/// POST /api/v1/admin/listings/{id}/reject
///
/// The reason is shown to the merchant and must not be blank.
pub async fn reject(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
    Json(input): Json<RejectRequest>,
) -> AppResult<impl IntoResponse> {
    let listing =
        ListingWorkflow::reject(&state.pool, &admin.actor(), listing_id, input.reason).await?;
    Ok(Json(DataResponse { data: listing }))
}

/// POST /api/v1/admin/listings/{id}/publish
pub async fn publish(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingWorkflow::publish(&state.pool, &admin.actor(), listing_id).await?;
    Ok(Json(DataResponse { data: listing }))
}

/// PUT /api/v1/admin/listings/{id}/banner
pub async fn set_banner(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
    Json(input): Json<BannerRequest>,
) -> AppResult<impl IntoResponse> {
    let listing =
        ListingWorkflow::set_banner(&state.pool, &admin.actor(), listing_id, input.is_banner)
            .await?;
    Ok(Json(DataResponse { data: listing }))
}
