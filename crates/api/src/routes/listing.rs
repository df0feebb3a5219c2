//! Route definitions for listing lifecycle operations.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::listing;
use crate::state::AppState;

/// Caller's own listing, nested under `/listing/me`.
///
/// ```text
/// POST   /            create_or_get
/// GET    /            read_own
/// PUT    /            write_own
/// POST   /edit        begin_editing
/// POST   /discard     discard_changes
/// POST   /submit      submit_own
/// POST   /cancel      cancel_own
/// ```
pub fn own_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(listing::create_or_get)
                .get(listing::read_own)
                .put(listing::write_own),
        )
        .route("/edit", post(listing::begin_editing))
        .route("/discard", post(listing::discard_changes))
        .route("/submit", post(listing::submit_own))
        .route("/cancel", post(listing::cancel_own))
}

/// Listing by id, nested under `/listings`.
///
/// ```text
/// GET    /{id}                read_by_id
/// POST   /{id}/take-offline   take_offline
/// POST   /{id}/restore        restore
/// ```
pub fn by_id_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(listing::read_by_id))
        .route("/{id}/take-offline", post(listing::take_offline))
        .route("/{id}/restore", post(listing::restore))
}
