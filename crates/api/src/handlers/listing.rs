//! Handlers for the caller's own listing (`/listing/me`) and for
//! owner-or-admin operations on a listing by id.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stayboard_core::listing::ListingPatch;
use stayboard_core::types::DbId;
use stayboard_db::ListingWorkflow;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireMerchant;
use crate::query::ViewParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /listing/me/submit`.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    /// Free-text note for the reviewer.
    pub audit_info: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /listing/me
// ---------------------------------------------------------------------------

/// Return the caller's listing, creating an empty Draft on first use.
pub async fn create_or_get(
    RequireMerchant(user): RequireMerchant,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingWorkflow::create_or_get(&state.pool, &user.actor()).await?;
    Ok(Json(DataResponse { data: listing }))
}

// ---------------------------------------------------------------------------
// GET /listing/me
// ---------------------------------------------------------------------------

pub async fn read_own(
    RequireMerchant(user): RequireMerchant,
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingWorkflow::read_own(&state.pool, &user.actor(), params.mode()).await?;
    Ok(Json(DataResponse { data: listing }))
}

// ---------------------------------------------------------------------------
// PUT /listing/me
// ---------------------------------------------------------------------------

/// Write a sparse field patch. Omitted fields are left untouched.
pub async fn write_own(
    RequireMerchant(user): RequireMerchant,
    State(state): State<AppState>,
    Json(patch): Json<ListingPatch>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingWorkflow::write_own(&state.pool, &user.actor(), patch).await?;
    Ok(Json(DataResponse { data: listing }))
}

// ---------------------------------------------------------------------------
// POST /listing/me/edit
// ---------------------------------------------------------------------------

pub async fn begin_editing(
    RequireMerchant(user): RequireMerchant,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingWorkflow::begin_editing(&state.pool, &user.actor()).await?;
    Ok(Json(DataResponse { data: listing }))
}

// ---------------------------------------------------------------------------
// POST /listing/me/discard
// ---------------------------------------------------------------------------

pub async fn discard_changes(
    RequireMerchant(user): RequireMerchant,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingWorkflow::discard_changes(&state.pool, &user.actor()).await?;
    Ok(Json(DataResponse { data: listing }))
}

// ---------------------------------------------------------------------------
// POST /listing/me/submit
// ---------------------------------------------------------------------------

pub async fn submit_own(
    RequireMerchant(user): RequireMerchant,
    State(state): State<AppState>,
    Json(input): Json<SubmitRequest>,
) -> AppResult<impl IntoResponse> {
    let listing =
        ListingWorkflow::submit_own(&state.pool, &user.actor(), input.audit_info).await?;
    Ok(Json(DataResponse { data: listing }))
}

// ---------------------------------------------------------------------------
// POST /listing/me/cancel
// ---------------------------------------------------------------------------

pub async fn cancel_own(
    RequireMerchant(user): RequireMerchant,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingWorkflow::cancel_own(&state.pool, &user.actor()).await?;
    Ok(Json(DataResponse { data: listing }))
}

// ---------------------------------------------------------------------------
// GET /listings/{id}
// ---------------------------------------------------------------------------

/// Read a listing by id. Merchants may only read their own.
pub async fn read_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
    Query(params): Query<ViewParams>,
) -> AppResult<impl IntoResponse> {
    let listing =
        ListingWorkflow::read_by_id(&state.pool, &user.actor(), listing_id, params.mode())
            .await?;
    Ok(Json(DataResponse { data: listing }))
}

// ---------------------------------------------------------------------------
// POST /listings/{id}/take-offline
// ---------------------------------------------------------------------------

pub async fn take_offline(
    user: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingWorkflow::take_offline(&state.pool, &user.actor(), listing_id).await?;
    Ok(Json(DataResponse { data: listing }))
}

// ---------------------------------------------------------------------------
// POST /listings/{id}/restore
// ---------------------------------------------------------------------------

pub async fn restore(
    user: AuthUser,
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingWorkflow::restore(&state.pool, &user.actor(), listing_id).await?;
    Ok(Json(DataResponse { data: listing }))
}
