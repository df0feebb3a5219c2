//! Repository for the `image_assets` table.
//!
//! Images live in three generations per listing. Merchants only ever touch
//! the draft generation; approval promotes it wholesale.

use sqlx::PgPool;
use stayboard_core::error::CoreError;
use stayboard_core::images::{plan_reorder, plan_sync, validate_url, ImageGeneration, ImageGroup};
use stayboard_core::types::DbId;

use crate::error::WorkflowError;
use crate::models::image_asset::ImageAsset;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, listing_id, url, kind, room_type_tag, generation_id, sort_order, \
    created_by, updated_by, created_at, updated_at";

/// Group predicate. `$1` listing, `$2` kind, `$3` tag, `$4` generation.
const GROUP_FILTER: &str = "listing_id = $1 AND kind = $2 \
    AND room_type_tag IS NOT DISTINCT FROM $3 AND generation_id = $4";

type Tx<'c> = sqlx::Transaction<'c, sqlx::Postgres>;

/// Provides ordered group access and generation management for images.
pub struct ImageAssetRepo;

impl ImageAssetRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Images of one group and generation, in display order.
    pub async fn list(
        pool: &PgPool,
        listing_id: DbId,
        group: &ImageGroup,
        generation: ImageGeneration,
    ) -> Result<Vec<ImageAsset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM image_assets WHERE {GROUP_FILTER} ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, ImageAsset>(&query)
            .bind(listing_id)
            .bind(group.kind.as_str())
            .bind(&group.room_type_tag)
            .bind(generation.id())
            .fetch_all(pool)
            .await
    }

    /// Every image of a listing in one generation, grouped and ordered.
    pub async fn list_for_listing(
        pool: &PgPool,
        listing_id: DbId,
        generation: ImageGeneration,
    ) -> Result<Vec<ImageAsset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM image_assets \
             WHERE listing_id = $1 AND generation_id = $2 \
             ORDER BY kind, room_type_tag NULLS FIRST, sort_order, id"
        );
        sqlx::query_as::<_, ImageAsset>(&query)
            .bind(listing_id)
            .bind(generation.id())
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_listing_tx(
        tx: &mut Tx<'_>,
        listing_id: DbId,
        generation: ImageGeneration,
    ) -> Result<Vec<ImageAsset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM image_assets \
             WHERE listing_id = $1 AND generation_id = $2 \
             ORDER BY kind, room_type_tag NULLS FIRST, sort_order, id"
        );
        sqlx::query_as::<_, ImageAsset>(&query)
            .bind(listing_id)
            .bind(generation.id())
            .fetch_all(&mut **tx)
            .await
    }

    /// `true` when the draft set differs from the published set in any
    /// group, URL, or position.
    pub async fn drafts_differ_tx(tx: &mut Tx<'_>, listing_id: DbId) -> Result<bool, sqlx::Error> {
        let drafts = Self::list_for_listing_tx(tx, listing_id, ImageGeneration::Draft).await?;
        let published =
            Self::list_for_listing_tx(tx, listing_id, ImageGeneration::Published).await?;
        let key = |a: &ImageAsset| (a.kind.clone(), a.room_type_tag.clone(), a.url.clone());
        Ok(!drafts.iter().map(key).eq(published.iter().map(key)))
    }

    pub async fn find_by_id_tx(tx: &mut Tx<'_>, id: DbId) -> Result<Option<ImageAsset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM image_assets WHERE id = $1");
        sqlx::query_as::<_, ImageAsset>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// The draft copy of a published record: same group and URL, preferring
    /// the same position.
    pub async fn draft_counterpart_tx(
        tx: &mut Tx<'_>,
        published: &ImageAsset,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM image_assets
             WHERE listing_id = $1 AND kind = $2
               AND room_type_tag IS NOT DISTINCT FROM $3
               AND url = $4 AND generation_id = $5
             ORDER BY (sort_order = $6) DESC, sort_order, id
             LIMIT 1",
        )
        .bind(published.listing_id)
        .bind(&published.kind)
        .bind(&published.room_type_tag)
        .bind(&published.url)
        .bind(ImageGeneration::Draft.id())
        .bind(published.sort_order)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Count a listing's records in one generation.
    pub async fn count(
        pool: &PgPool,
        listing_id: DbId,
        generation: ImageGeneration,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM image_assets WHERE listing_id = $1 AND generation_id = $2",
        )
        .bind(listing_id)
        .bind(generation.id())
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    // -----------------------------------------------------------------------
    // Single-record writes
    // -----------------------------------------------------------------------

    /// Append a draft image to the end of its group.
    pub async fn add(
        pool: &PgPool,
        listing_id: DbId,
        group: &ImageGroup,
        url: &str,
        actor_id: DbId,
    ) -> Result<ImageAsset, WorkflowError> {
        let mut tx = pool.begin().await?;
        let asset = Self::add_tx(&mut tx, listing_id, group, url, actor_id).await?;
        tx.commit().await?;
        Ok(asset)
    }

    pub async fn add_tx(
        tx: &mut Tx<'_>,
        listing_id: DbId,
        group: &ImageGroup,
        url: &str,
        actor_id: DbId,
    ) -> Result<ImageAsset, WorkflowError> {
        validate_url(url)?;
        let query = format!(
            "INSERT INTO image_assets
                (listing_id, url, kind, room_type_tag, generation_id, sort_order, created_by, updated_by)
             VALUES (
                $1, $5, $2, $3, $4,
                (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM image_assets WHERE {GROUP_FILTER}),
                $6, $6
             )
             RETURNING {COLUMNS}"
        );
        let asset = sqlx::query_as::<_, ImageAsset>(&query)
            .bind(listing_id)
            .bind(group.kind.as_str())
            .bind(&group.room_type_tag)
            .bind(ImageGeneration::Draft.id())
            .bind(url.trim())
            .bind(actor_id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(asset)
    }

    /// Delete one draft image. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let deleted = Self::delete_tx(&mut tx, id).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    pub async fn delete_tx(tx: &mut Tx<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM image_assets WHERE id = $1 AND generation_id = $2")
            .bind(id)
            .bind(ImageGeneration::Draft.id())
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Group writes
    // -----------------------------------------------------------------------

    /// Reassign sort order so the group follows `ids`.
    ///
    /// All ids must exist and belong to the same draft group; ids of that
    /// group left out of `ids` follow in their current order.
    pub async fn reorder(pool: &PgPool, ids: &[DbId]) -> Result<Vec<ImageAsset>, WorkflowError> {
        let mut tx = pool.begin().await?;
        let assets = Self::reorder_tx(&mut tx, ids).await?;
        tx.commit().await?;
        Ok(assets)
    }

    pub async fn reorder_tx(
        tx: &mut Tx<'_>,
        ids: &[DbId],
    ) -> Result<Vec<ImageAsset>, WorkflowError> {
        let query = format!("SELECT {COLUMNS} FROM image_assets WHERE id = ANY($1) FOR UPDATE");
        let found = sqlx::query_as::<_, ImageAsset>(&query)
            .bind(ids)
            .fetch_all(&mut **tx)
            .await?;

        if let Some(missing) = ids.iter().find(|id| !found.iter().any(|a| a.id == **id)) {
            return Err(CoreError::NotFound {
                entity: "ImageAsset",
                id: *missing,
            }
            .into());
        }
        let Some(first) = found.first() else {
            return Err(CoreError::Validation("Reorder requires at least one image id".into()).into());
        };
        let (listing_id, generation_id) = (first.listing_id, first.generation_id);
        let group = first.group()?;
        for asset in &found {
            if asset.listing_id != listing_id
                || asset.generation_id != generation_id
                || asset.group()? != group
            {
                return Err(CoreError::Conflict(
                    "Images to reorder must belong to the same group".into(),
                )
                .into());
            }
        }
        if generation_id != ImageGeneration::Draft.id() {
            return Err(CoreError::Conflict("Only draft images can be reordered".into()).into());
        }

        let current = Self::group_records_tx(tx, listing_id, &group).await?;
        let current_ids: Vec<DbId> = current.iter().map(|(id, _)| *id).collect();
        let order = plan_reorder(&current_ids, ids)?;
        for (position, id) in order.iter().enumerate() {
            Self::set_sort_order_tx(tx, *id, position as i32).await?;
        }

        Ok(Self::list_group_tx(tx, listing_id, &group).await?)
    }

    /// Replace the draft set of `group` with exactly `urls`, in order.
    ///
    /// Existing records are reused by URL; an empty `urls` clears the group.
    pub async fn sync(
        pool: &PgPool,
        listing_id: DbId,
        group: &ImageGroup,
        urls: &[String],
        actor_id: DbId,
    ) -> Result<Vec<ImageAsset>, WorkflowError> {
        let mut tx = pool.begin().await?;
        let assets = Self::sync_tx(&mut tx, listing_id, group, urls, actor_id).await?;
        tx.commit().await?;
        Ok(assets)
    }

    pub async fn sync_tx(
        tx: &mut Tx<'_>,
        listing_id: DbId,
        group: &ImageGroup,
        urls: &[String],
        actor_id: DbId,
    ) -> Result<Vec<ImageAsset>, WorkflowError> {
        for url in urls {
            validate_url(url)?;
        }
        let urls: Vec<String> = urls.iter().map(|u| u.trim().to_string()).collect();

        let existing = Self::group_records_tx(tx, listing_id, group).await?;
        let plan = plan_sync(&existing, &urls);

        if !plan.delete.is_empty() {
            sqlx::query("DELETE FROM image_assets WHERE id = ANY($1)")
                .bind(&plan.delete)
                .execute(&mut **tx)
                .await?;
        }
        for (id, sort_order) in &plan.keep {
            Self::set_sort_order_tx(tx, *id, *sort_order).await?;
        }
        for (url, sort_order) in &plan.create {
            sqlx::query(
                "INSERT INTO image_assets
                    (listing_id, url, kind, room_type_tag, generation_id, sort_order, created_by, updated_by)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
            )
            .bind(listing_id)
            .bind(url)
            .bind(group.kind.as_str())
            .bind(&group.room_type_tag)
            .bind(ImageGeneration::Draft.id())
            .bind(sort_order)
            .bind(actor_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(Self::list_group_tx(tx, listing_id, group).await?)
    }

    /// Delete draft images of a listing, optionally only those of one group.
    /// Returns the number of rows removed.
    pub async fn discard_draft(
        pool: &PgPool,
        listing_id: DbId,
        group: Option<&ImageGroup>,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let removed = Self::discard_draft_tx(&mut tx, listing_id, group).await?;
        tx.commit().await?;
        Ok(removed)
    }

    pub async fn discard_draft_tx(
        tx: &mut Tx<'_>,
        listing_id: DbId,
        group: Option<&ImageGroup>,
    ) -> Result<u64, sqlx::Error> {
        let result = match group {
            Some(group) => {
                let query = format!("DELETE FROM image_assets WHERE {GROUP_FILTER}");
                sqlx::query(&query)
                    .bind(listing_id)
                    .bind(group.kind.as_str())
                    .bind(&group.room_type_tag)
                    .bind(ImageGeneration::Draft.id())
                    .execute(&mut **tx)
                    .await?
            }
            None => {
                sqlx::query("DELETE FROM image_assets WHERE listing_id = $1 AND generation_id = $2")
                    .bind(listing_id)
                    .bind(ImageGeneration::Draft.id())
                    .execute(&mut **tx)
                    .await?
            }
        };
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Generation management
    // -----------------------------------------------------------------------

    /// Give every published image a draft copy unless an identical draft
    /// (same group and URL) already exists. Returns the number of copies made.
    pub async fn copy_to_draft(
        pool: &PgPool,
        listing_id: DbId,
        actor_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let copied = Self::copy_to_draft_tx(&mut tx, listing_id, actor_id).await?;
        tx.commit().await?;
        Ok(copied)
    }

    pub async fn copy_to_draft_tx(
        tx: &mut Tx<'_>,
        listing_id: DbId,
        actor_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO image_assets
                (listing_id, url, kind, room_type_tag, generation_id, sort_order, created_by, updated_by)
             SELECT p.listing_id, p.url, p.kind, p.room_type_tag, $2, p.sort_order, $4, $4
             FROM image_assets p
             WHERE p.listing_id = $1 AND p.generation_id = $3
               AND NOT EXISTS (
                   SELECT 1 FROM image_assets d
                   WHERE d.listing_id = p.listing_id
                     AND d.generation_id = $2
                     AND d.kind = p.kind
                     AND d.room_type_tag IS NOT DISTINCT FROM p.room_type_tag
                     AND d.url = p.url
               )
             ORDER BY p.id",
        )
        .bind(listing_id)
        .bind(ImageGeneration::Draft.id())
        .bind(ImageGeneration::Published.id())
        .bind(actor_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Archive the published set and publish the draft set.
    ///
    /// With no draft records this is a no-op and returns `false`, so a
    /// repeated call never archives the live set.
    pub async fn promote(pool: &PgPool, listing_id: DbId, actor_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let promoted = Self::promote_tx(&mut tx, listing_id, actor_id).await?;
        tx.commit().await?;
        Ok(promoted)
    }

    pub async fn promote_tx(
        tx: &mut Tx<'_>,
        listing_id: DbId,
        actor_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (drafts,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM image_assets WHERE listing_id = $1 AND generation_id = $2",
        )
        .bind(listing_id)
        .bind(ImageGeneration::Draft.id())
        .fetch_one(&mut **tx)
        .await?;
        if drafts == 0 {
            return Ok(false);
        }
        Self::replace_published_tx(tx, listing_id, actor_id).await?;
        Ok(true)
    }

    /// Archive the published set and publish the draft set unconditionally.
    ///
    /// Used when an approved edit session owned the draft set: an empty draft
    /// set then means every image was removed, and the live set goes too.
    pub async fn replace_published_tx(
        tx: &mut Tx<'_>,
        listing_id: DbId,
        actor_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let archived = Self::move_generation_tx(
            tx,
            listing_id,
            ImageGeneration::Published,
            ImageGeneration::Archived,
            actor_id,
        )
        .await?;
        let published = Self::move_generation_tx(
            tx,
            listing_id,
            ImageGeneration::Draft,
            ImageGeneration::Published,
            actor_id,
        )
        .await?;
        tracing::debug!(listing_id, archived, published, "Image generations moved");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn move_generation_tx(
        tx: &mut Tx<'_>,
        listing_id: DbId,
        from: ImageGeneration,
        to: ImageGeneration,
        actor_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE image_assets SET generation_id = $3, updated_by = $4 \
             WHERE listing_id = $1 AND generation_id = $2",
        )
        .bind(listing_id)
        .bind(from.id())
        .bind(to.id())
        .bind(actor_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// `(id, url)` of a draft group in display order, locked.
    async fn group_records_tx(
        tx: &mut Tx<'_>,
        listing_id: DbId,
        group: &ImageGroup,
    ) -> Result<Vec<(DbId, String)>, sqlx::Error> {
        let query = format!(
            "SELECT id, url FROM image_assets WHERE {GROUP_FILTER} \
             ORDER BY sort_order, id FOR UPDATE"
        );
        sqlx::query_as(&query)
            .bind(listing_id)
            .bind(group.kind.as_str())
            .bind(&group.room_type_tag)
            .bind(ImageGeneration::Draft.id())
            .fetch_all(&mut **tx)
            .await
    }

    async fn list_group_tx(
        tx: &mut Tx<'_>,
        listing_id: DbId,
        group: &ImageGroup,
    ) -> Result<Vec<ImageAsset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM image_assets WHERE {GROUP_FILTER} ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, ImageAsset>(&query)
            .bind(listing_id)
            .bind(group.kind.as_str())
            .bind(&group.room_type_tag)
            .bind(ImageGeneration::Draft.id())
            .fetch_all(&mut **tx)
            .await
    }

    async fn set_sort_order_tx(
        tx: &mut Tx<'_>,
        id: DbId,
        sort_order: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE image_assets SET sort_order = $2 WHERE id = $1")
            .bind(id)
            .bind(sort_order)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
