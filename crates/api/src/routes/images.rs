//! Route definitions for listing image groups, merged into `/listings`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// ```text
/// GET    /{id}/images                     list_images
/// POST   /{id}/images                     add_image
/// PUT    /{id}/images/order               reorder_images
/// PUT    /{id}/images/sync                sync_images
/// DELETE /{id}/images/drafts              discard_draft_images
/// POST   /{id}/images/copy-to-draft       copy_images_to_draft
/// DELETE /{id}/images/{image_id}          delete_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/images",
            get(images::list_images).post(images::add_image),
        )
        .route("/{id}/images/order", put(images::reorder_images))
        .route("/{id}/images/sync", put(images::sync_images))
        .route("/{id}/images/drafts", delete(images::discard_draft_images))
        .route(
            "/{id}/images/copy-to-draft",
            post(images::copy_images_to_draft),
        )
        .route("/{id}/images/{image_id}", delete(images::delete_image))
}
