//! Repository for the `listings` table.

use sqlx::types::Json;
use sqlx::PgPool;
use stayboard_core::images::ImageGeneration;
use stayboard_core::listing::{ListingState, ListingStatus};
use stayboard_core::overlay::ViewMode;
use stayboard_core::types::DbId;

use crate::models::listing::{ListingFilter, ListingOrder, ListingRow, ListingSummaryRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, status_id, fields, overlay, min_price, reject_reason, \
    audit_info, resume_status_id, is_banner, created_at, updated_at";

/// Same columns qualified with the `l` alias used by list queries.
const LIST_COLUMNS: &str = "l.id, l.owner_id, l.status_id, l.fields, l.overlay, l.min_price, \
    l.reject_reason, l.audit_info, l.resume_status_id, l.is_banner, l.created_at, l.updated_at";

/// Predicate shared by the list and count queries. `$1` is the optional
/// status id, `$2` the optional ILIKE pattern.
const LIST_FILTER: &str = "($1::smallint IS NULL OR l.status_id = $1) \
    AND ($2::text IS NULL \
         OR l.fields->>'name_local' ILIKE $2 \
         OR l.fields->>'name_intl' ILIKE $2 \
         OR l.fields->>'address' ILIKE $2)";

/// Escape LIKE metacharacters and wrap `keyword` for a substring match.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Provides lookup, locking, and persistence for listings.
pub struct ListingRepo;

impl ListingRepo {
    /// Return the owner's listing, creating an empty Draft when none exists.
    pub async fn create_or_get(pool: &PgPool, owner_id: DbId) -> Result<ListingRow, sqlx::Error> {
        sqlx::query(
            "INSERT INTO listings (owner_id, status_id) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_listings_owner_id DO NOTHING",
        )
        .bind(owner_id)
        .bind(ListingStatus::Draft.id())
        .execute(pool)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM listings WHERE owner_id = $1");
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ListingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE id = $1");
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Option<ListingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE owner_id = $1");
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a listing row for the rest of the transaction.
    pub async fn lock_by_id(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<ListingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Lock the owner's listing row for the rest of the transaction.
    pub async fn lock_by_owner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        owner_id: DbId,
    ) -> Result<Option<ListingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE owner_id = $1 FOR UPDATE");
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(owner_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Persist a lifecycle state. `min_price` is only rewritten when given.
    pub async fn save_state_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        state: &ListingState,
        min_price: Option<i64>,
    ) -> Result<ListingRow, sqlx::Error> {
        let query = format!(
            "UPDATE listings SET
                status_id = $2,
                fields = $3,
                overlay = $4,
                reject_reason = $5,
                audit_info = $6,
                resume_status_id = $7,
                is_banner = $8,
                min_price = COALESCE($9, min_price)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ListingRow>(&query)
            .bind(id)
            .bind(state.status.id())
            .bind(Json(&state.live))
            .bind(state.overlay.as_ref().map(Json))
            .bind(&state.reject_reason)
            .bind(&state.audit_info)
            .bind(state.resume_status.map(ListingStatus::id))
            .bind(state.is_banner)
            .bind(min_price)
            .fetch_one(&mut **tx)
            .await
    }

    /// One page of listings matching `filter`, each with its cover image,
    /// plus the total number of matches.
    ///
    /// The cover image is the first published main image. In the editing
    /// view it falls back to the first draft main image; the live view never
    /// shows unapproved images.
    pub async fn list(
        pool: &PgPool,
        filter: &ListingFilter,
        order: ListingOrder,
        view: ViewMode,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ListingSummaryRow>, i64), sqlx::Error> {
        let status_id = filter.status.map(ListingStatus::id);
        let pattern = filter
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(like_pattern);
        let fallback = match view {
            ViewMode::Editing => ImageGeneration::Draft,
            ViewMode::Live => ImageGeneration::Published,
        };

        let query = format!(
            "SELECT {LIST_COLUMNS},
                (SELECT i.url FROM image_assets i
                 WHERE i.listing_id = l.id AND i.kind = 'main'
                   AND i.generation_id IN ($5, $6)
                 ORDER BY CASE WHEN i.generation_id = $5 THEN 0 ELSE 1 END,
                          i.sort_order, i.id
                 LIMIT 1) AS cover_image
             FROM listings l
             WHERE {LIST_FILTER}
             ORDER BY {order}
             LIMIT $3 OFFSET $4",
            order = order.sql()
        );
        let rows = sqlx::query_as::<_, ListingSummaryRow>(&query)
            .bind(status_id)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .bind(ImageGeneration::Published.id())
            .bind(fallback.id())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM listings l WHERE {LIST_FILTER}");
        let (total,): (i64,) = sqlx::query_as(&count_query)
            .bind(status_id)
            .bind(&pattern)
            .fetch_one(pool)
            .await?;

        Ok((rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("sea"), "%sea%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }
}
