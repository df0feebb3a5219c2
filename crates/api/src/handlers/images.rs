//! Handlers for a listing's image groups (`/listings/{id}/images`).
//!
//! Mutations act on the draft generation. Published images change only when
//! an approval promotes the drafts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use stayboard_core::types::DbId;
use stayboard_db::models::image_asset::{AddImage, ReorderImages, SyncImages};
use stayboard_db::ListingWorkflow;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::ImageListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of image records a bulk operation touched.
#[derive(Debug, Serialize)]
pub struct AffectedCount {
    pub count: u64,
}

// ---------------------------------------------------------------------------
// GET /listings/{id}/images
// ---------------------------------------------------------------------------

/// List images, optionally narrowed to one group and one generation.
pub async fn list_images(
    user: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
    Query(params): Query<ImageListParams>,
) -> AppResult<impl IntoResponse> {
    let group = params.group()?;
    let generation = params.generation()?;
    let images = ListingWorkflow::list_images(
        &state.pool,
        &user.actor(),
        listing_id,
        group.as_ref(),
        generation,
    )
    .await?;
    Ok(Json(DataResponse { data: images }))
}

// ---------------------------------------------------------------------------
// POST /listings/{id}/images
// ---------------------------------------------------------------------------

pub async fn add_image(
    user: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
    Json(input): Json<AddImage>,
) -> AppResult<impl IntoResponse> {
    let image = ListingWorkflow::add_image(&state.pool, &user.actor(), listing_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: image })))
}

// ---------------------------------------------------------------------------
// PUT /listings/{id}/images/order
// ---------------------------------------------------------------------------

pub async fn reorder_images(
    user: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
    Json(input): Json<ReorderImages>,
) -> AppResult<impl IntoResponse> {
    let images =
        ListingWorkflow::reorder_images(&state.pool, &user.actor(), listing_id, &input).await?;
    Ok(Json(DataResponse { data: images }))
}

// ---------------------------------------------------------------------------
// PUT /listings/{id}/images/sync
// ---------------------------------------------------------------------------

/// Replace one group's draft set with exactly the given URLs, in order.
pub async fn sync_images(
    user: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
    Json(input): Json<SyncImages>,
) -> AppResult<impl IntoResponse> {
    let images =
        ListingWorkflow::sync_images(&state.pool, &user.actor(), listing_id, &input).await?;
    Ok(Json(DataResponse { data: images }))
}

// ---------------------------------------------------------------------------
// DELETE /listings/{id}/images/drafts
// ---------------------------------------------------------------------------

/// Drop draft images, of one group when `kind` is given, otherwise all.
pub async fn discard_draft_images(
    user: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
    Query(params): Query<ImageListParams>,
) -> AppResult<impl IntoResponse> {
    let group = params.group()?;
    let count = ListingWorkflow::discard_draft_images(
        &state.pool,
        &user.actor(),
        listing_id,
        group.as_ref(),
    )
    .await?;
    Ok(Json(DataResponse {
        data: AffectedCount { count },
    }))
}

// ---------------------------------------------------------------------------
// POST /listings/{id}/images/copy-to-draft
// ---------------------------------------------------------------------------

pub async fn copy_images_to_draft(
    user: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let count =
        ListingWorkflow::copy_images_to_draft(&state.pool, &user.actor(), listing_id).await?;
    Ok(Json(DataResponse {
        data: AffectedCount { count },
    }))
}

// ---------------------------------------------------------------------------
// DELETE /listings/{id}/images/{image_id}
// ---------------------------------------------------------------------------

pub async fn delete_image(
    user: AuthUser,
    State(state): State<AppState>,
    Path((listing_id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ListingWorkflow::delete_image(&state.pool, &user.actor(), listing_id, image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
