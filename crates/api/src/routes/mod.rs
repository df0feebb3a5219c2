pub mod admin;
pub mod health;
pub mod images;
pub mod listing;
pub mod public;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /listing/me                                  create-or-get (POST), read (GET), write (PUT)
/// /listing/me/edit                             begin editing (POST)
/// /listing/me/discard                          discard pending changes (POST)
/// /listing/me/submit                           submit for review (POST)
/// /listing/me/cancel                           cancel submission (POST)
///
/// /listings/{id}                               read (GET, owner or admin)
/// /listings/{id}/take-offline                  take offline (POST, owner or admin)
/// /listings/{id}/restore                       restore (POST, owner or admin)
/// /listings/{id}/images                        list, add (GET, POST)
/// /listings/{id}/images/order                  reorder drafts (PUT)
/// /listings/{id}/images/sync                   replace a group's drafts (PUT)
/// /listings/{id}/images/drafts                 discard drafts (DELETE)
/// /listings/{id}/images/copy-to-draft          copy published set to draft (POST)
/// /listings/{id}/images/{image_id}             delete a draft image (DELETE)
///
/// /admin/listings                              query (GET, admin only)
/// /admin/listings/{id}/approve                 approve (POST)
/// /admin/listings/{id}/reject                  reject (POST)
/// /admin/listings/{id}/publish                 publish (POST)
/// /admin/listings/{id}/banner                  set banner flag (PUT)
///
/// /public/listings                             storefront search (GET, no auth)
/// /public/listings/{id}                        published listing with images (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Merchant's own listing.
        .nest("/listing/me", listing::own_router())
        // Listing by id, plus its image groups.
        .nest(
            "/listings",
            listing::by_id_router().merge(images::router()),
        )
        // Review and storefront curation.
        .nest("/admin/listings", admin::router())
        // Storefront.
        .nest("/public/listings", public::router())
}
