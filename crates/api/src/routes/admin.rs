//! Route definitions for listing review, nested under `/admin/listings`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// ```text
/// GET    /                    list_listings
/// POST   /{id}/approve        approve
/// POST   /{id}/reject         reject
/// POST   /{id}/publish        publish
/// PUT    /{id}/banner         set_banner
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::list_listings))
        .route("/{id}/approve", post(admin::approve))
        .route("/{id}/reject", post(admin::reject))
        .route("/{id}/publish", post(admin::publish))
        .route("/{id}/banner", put(admin::set_banner))
}
