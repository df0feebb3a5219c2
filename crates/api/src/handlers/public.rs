//! Unauthenticated storefront handlers. Only Published listings are visible.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use stayboard_core::types::DbId;
use stayboard_db::ListingWorkflow;

use crate::error::AppResult;
use crate::query::PublicListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/public/listings
pub async fn list_public(
    State(state): State<AppState>,
    Query(params): Query<PublicListParams>,
) -> AppResult<impl IntoResponse> {
    let page =
        ListingWorkflow::list_public(&state.pool, params.keyword, params.page, params.page_size)
            .await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/public/listings/{id}
pub async fn read_public(
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingWorkflow::read_public(&state.pool, listing_id).await?;
    Ok(Json(DataResponse { data: listing }))
}
