//! Storefront routes, nested under `/public/listings`. No authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// ```text
/// GET    /                    list_public
/// GET    /{id}                read_public
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(public::list_public))
        .route("/{id}", get(public::read_public))
}
