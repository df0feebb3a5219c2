//! Transactional execution of listing operations.
//!
//! Every mutating operation locks the listing row (`SELECT ... FOR UPDATE`),
//! checks the caller's authority, runs the pure lifecycle transition, then
//! persists the new state and its image effect before committing. Any error
//! drops the transaction, which rolls everything back.

use sqlx::PgPool;
use stayboard_core::error::CoreError;
use stayboard_core::images::{ImageGeneration, ImageGroup};
use stayboard_core::lifecycle::{apply, required_authority, ImageEffect, ListingCommand};
use stayboard_core::listing::{ListingPatch, ListingState, ListingStatus};
use stayboard_core::overlay::{ensure_editable, ViewMode};
use stayboard_core::roles::{authorize, Actor, Authority};
use stayboard_core::submission::clamp_page;
use stayboard_core::types::DbId;

use crate::error::WorkflowError;
use crate::models::image_asset::{AddImage, ImageAsset, ReorderImages, SyncImages};
use crate::models::listing::{
    ListingFilter, ListingOrder, ListingRow, ListingSummary, ListingView, Page,
};
use crate::repositories::{ImageAssetRepo, ListingRepo};

type Tx<'c> = sqlx::Transaction<'c, sqlx::Postgres>;

/// A published listing as the public sees it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PublicListing {
    pub listing: ListingView,
    pub images: Vec<ImageAsset>,
}

fn listing_not_found(id: DbId) -> WorkflowError {
    CoreError::NotFound {
        entity: "Listing",
        id,
    }
    .into()
}

fn own_listing_not_found(owner_id: DbId) -> WorkflowError {
    CoreError::NotFound {
        entity: "Listing for owner",
        id: owner_id,
    }
    .into()
}

fn image_not_found(id: DbId) -> WorkflowError {
    CoreError::NotFound {
        entity: "ImageAsset",
        id,
    }
    .into()
}

/// Image generation shown in the editing view: the draft working set, except
/// where the live set is all there is.
fn editing_generation(state: &ListingState) -> ImageGeneration {
    match state.status {
        ListingStatus::Published | ListingStatus::Offline | ListingStatus::Approved
            if state.overlay.is_none() =>
        {
            ImageGeneration::Published
        }
        _ => ImageGeneration::Draft,
    }
}

/// Executes the listing operation set against the database.
pub struct ListingWorkflow;

impl ListingWorkflow {
    // -----------------------------------------------------------------------
    // Merchant: own listing
    // -----------------------------------------------------------------------

    /// Return the caller's listing, creating an empty Draft on first use.
    pub async fn create_or_get(pool: &PgPool, actor: &Actor) -> Result<ListingView, WorkflowError> {
        let row = ListingRepo::create_or_get(pool, actor.user_id).await?;
        Ok(ListingView::from_row(&row, ViewMode::Editing)?)
    }

    pub async fn read_own(
        pool: &PgPool,
        actor: &Actor,
        view: ViewMode,
    ) -> Result<ListingView, WorkflowError> {
        let row = ListingRepo::find_by_owner(pool, actor.user_id)
            .await?
            .ok_or_else(|| own_listing_not_found(actor.user_id))?;
        Ok(ListingView::from_row(&row, view)?)
    }

    /// Apply field changes: to the live fields of a Draft, to the overlay
    /// otherwise. Returns the editing view.
    pub async fn write_own(
        pool: &PgPool,
        actor: &Actor,
        patch: ListingPatch,
    ) -> Result<ListingView, WorkflowError> {
        Self::run_own(pool, actor, ListingCommand::Edit(patch)).await
    }

    pub async fn begin_editing(pool: &PgPool, actor: &Actor) -> Result<ListingView, WorkflowError> {
        Self::run_own(pool, actor, ListingCommand::BeginEditing).await
    }

    pub async fn discard_changes(
        pool: &PgPool,
        actor: &Actor,
    ) -> Result<ListingView, WorkflowError> {
        Self::run_own(pool, actor, ListingCommand::DiscardChanges).await
    }

    /// Submit for review. The image sets are compared under the row lock so
    /// an image-only edit session still counts as a change.
    pub async fn submit_own(
        pool: &PgPool,
        actor: &Actor,
        audit_info: Option<String>,
    ) -> Result<ListingView, WorkflowError> {
        let mut tx = pool.begin().await?;
        let row = ListingRepo::lock_by_owner(&mut tx, actor.user_id)
            .await?
            .ok_or_else(|| own_listing_not_found(actor.user_id))?;
        let images_changed =
            row.overlay.is_some() && ImageAssetRepo::drafts_differ_tx(&mut tx, row.id).await?;
        let command = ListingCommand::Submit {
            audit_info,
            images_changed,
        };
        let saved = Self::transition_tx(&mut tx, actor, &row, command).await?;
        tx.commit().await?;
        Ok(ListingView::from_row(&saved, ViewMode::Editing)?)
    }

    pub async fn cancel_own(pool: &PgPool, actor: &Actor) -> Result<ListingView, WorkflowError> {
        Self::run_own(pool, actor, ListingCommand::CancelSubmission).await
    }

    // -----------------------------------------------------------------------
    // By listing id
    // -----------------------------------------------------------------------

    /// Read any listing the caller owns, or any listing for an admin.
    pub async fn read_by_id(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
        view: ViewMode,
    ) -> Result<ListingView, WorkflowError> {
        let row = ListingRepo::find_by_id(pool, listing_id)
            .await?
            .ok_or_else(|| listing_not_found(listing_id))?;
        authorize(actor, row.owner_id, Authority::OwnerOrAdmin)?;
        Ok(ListingView::from_row(&row, view)?)
    }

    pub async fn approve(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
    ) -> Result<ListingView, WorkflowError> {
        Self::run_by_id(pool, actor, listing_id, ListingCommand::Approve).await
    }

    pub async fn reject(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
        reason: String,
    ) -> Result<ListingView, WorkflowError> {
        Self::run_by_id(pool, actor, listing_id, ListingCommand::Reject { reason }).await
    }

    pub async fn publish(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
    ) -> Result<ListingView, WorkflowError> {
        Self::run_by_id(pool, actor, listing_id, ListingCommand::Publish).await
    }

    pub async fn take_offline(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
    ) -> Result<ListingView, WorkflowError> {
        Self::run_by_id(pool, actor, listing_id, ListingCommand::TakeOffline).await
    }

    pub async fn restore(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
    ) -> Result<ListingView, WorkflowError> {
        Self::run_by_id(pool, actor, listing_id, ListingCommand::Restore).await
    }

    pub async fn set_banner(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
        is_banner: bool,
    ) -> Result<ListingView, WorkflowError> {
        Self::run_by_id(pool, actor, listing_id, ListingCommand::SetBanner(is_banner)).await
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Admin listing query over every status, most recently updated first.
    /// Summaries show the editing view so reviewers see what was submitted.
    pub async fn list(
        pool: &PgPool,
        actor: &Actor,
        filter: &ListingFilter,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Page<ListingSummary>, WorkflowError> {
        authorize(actor, 0, Authority::Admin)?;
        Self::query_page(
            pool,
            filter,
            ListingOrder::RecentlyUpdated,
            ViewMode::Editing,
            page,
            page_size,
        )
        .await
    }

    /// Published listings only, in storefront order, showing live fields.
    pub async fn list_public(
        pool: &PgPool,
        keyword: Option<String>,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Page<ListingSummary>, WorkflowError> {
        let filter = ListingFilter {
            status: Some(ListingStatus::Published),
            keyword,
        };
        Self::query_page(
            pool,
            &filter,
            ListingOrder::Storefront,
            ViewMode::Live,
            page,
            page_size,
        )
        .await
    }

    /// A published listing with its published images. Anything not
    /// published is reported as not found.
    pub async fn read_public(pool: &PgPool, listing_id: DbId) -> Result<PublicListing, WorkflowError> {
        let row = ListingRepo::find_by_id(pool, listing_id)
            .await?
            .filter(|r| r.status_id == ListingStatus::Published.id())
            .ok_or_else(|| listing_not_found(listing_id))?;
        let images =
            ImageAssetRepo::list_for_listing(pool, listing_id, ImageGeneration::Published).await?;
        Ok(PublicListing {
            listing: ListingView::from_row(&row, ViewMode::Live)?,
            images,
        })
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    /// Images of a listing, optionally of one group.
    ///
    /// Without an explicit generation, the generation behind the editing view
    /// is used: drafts while an edit set exists, the published set otherwise.
    /// Archived records are never returned.
    pub async fn list_images(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
        group: Option<&ImageGroup>,
        generation: Option<ImageGeneration>,
    ) -> Result<Vec<ImageAsset>, WorkflowError> {
        let row = ListingRepo::find_by_id(pool, listing_id)
            .await?
            .ok_or_else(|| listing_not_found(listing_id))?;
        authorize(actor, row.owner_id, Authority::OwnerOrAdmin)?;
        let generation = match generation {
            Some(ImageGeneration::Archived) => {
                return Err(CoreError::Validation(
                    "Archived images cannot be listed".into(),
                )
                .into());
            }
            Some(g) => g,
            None => editing_generation(&row.to_state()?),
        };
        let images = match group {
            Some(group) => ImageAssetRepo::list(pool, listing_id, group, generation).await?,
            None => ImageAssetRepo::list_for_listing(pool, listing_id, generation).await?,
        };
        Ok(images)
    }

    pub async fn add_image(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
        input: &AddImage,
    ) -> Result<ImageAsset, WorkflowError> {
        let group = ImageGroup::new(input.kind, input.room_type_tag.clone())?;
        let mut tx = pool.begin().await?;
        Self::open_image_edit_tx(&mut tx, actor, listing_id).await?;
        let asset = ImageAssetRepo::add_tx(&mut tx, listing_id, &group, &input.url, actor.user_id)
            .await?;
        tx.commit().await?;
        tracing::info!(listing_id, image_id = asset.id, kind = %asset.kind, "Image added");
        Ok(asset)
    }

    /// Reorder one draft group. Ids of published images are accepted while
    /// their draft copies exist, since that is what the editing view lists
    /// before an edit session opens.
    pub async fn reorder_images(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
        input: &ReorderImages,
    ) -> Result<Vec<ImageAsset>, WorkflowError> {
        let mut tx = pool.begin().await?;
        Self::open_image_edit_tx(&mut tx, actor, listing_id).await?;
        let mut ids = Vec::with_capacity(input.ids.len());
        for id in &input.ids {
            ids.push(Self::draft_id_tx(&mut tx, listing_id, *id).await?);
        }
        let assets = ImageAssetRepo::reorder_tx(&mut tx, &ids).await?;
        tx.commit().await?;
        Ok(assets)
    }

    pub async fn sync_images(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
        input: &SyncImages,
    ) -> Result<Vec<ImageAsset>, WorkflowError> {
        let group = ImageGroup::new(input.kind, input.room_type_tag.clone())?;
        let mut tx = pool.begin().await?;
        Self::open_image_edit_tx(&mut tx, actor, listing_id).await?;
        let assets =
            ImageAssetRepo::sync_tx(&mut tx, listing_id, &group, &input.urls, actor.user_id)
                .await?;
        tx.commit().await?;
        tracing::info!(listing_id, kind = group.kind.as_str(), count = assets.len(), "Image group synced");
        Ok(assets)
    }

    /// Delete draft images, optionally only one group. Published images are
    /// never touched.
    pub async fn discard_draft_images(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
        group: Option<&ImageGroup>,
    ) -> Result<u64, WorkflowError> {
        let mut tx = pool.begin().await?;
        let row = Self::lock_authorized_tx(&mut tx, actor, listing_id).await?;
        ensure_editable(row.status()?)?;
        let removed = ImageAssetRepo::discard_draft_tx(&mut tx, listing_id, group).await?;
        tx.commit().await?;
        Ok(removed)
    }

    pub async fn copy_images_to_draft(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
    ) -> Result<u64, WorkflowError> {
        let mut tx = pool.begin().await?;
        let row = Self::lock_authorized_tx(&mut tx, actor, listing_id).await?;
        ensure_editable(row.status()?)?;
        let copied = ImageAssetRepo::copy_to_draft_tx(&mut tx, listing_id, actor.user_id).await?;
        tx.commit().await?;
        Ok(copied)
    }

    /// Delete one draft image. A published id removes its draft copy, so the
    /// image disappears from the live set on the next approval.
    pub async fn delete_image(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
        image_id: DbId,
    ) -> Result<(), WorkflowError> {
        let mut tx = pool.begin().await?;
        Self::open_image_edit_tx(&mut tx, actor, listing_id).await?;
        let draft_id = Self::draft_id_tx(&mut tx, listing_id, image_id).await?;
        if !ImageAssetRepo::delete_tx(&mut tx, draft_id).await? {
            return Err(image_not_found(image_id));
        }
        tx.commit().await?;
        tracing::info!(listing_id, image_id, draft_id, "Image deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn run_own(
        pool: &PgPool,
        actor: &Actor,
        command: ListingCommand,
    ) -> Result<ListingView, WorkflowError> {
        let mut tx = pool.begin().await?;
        let row = ListingRepo::lock_by_owner(&mut tx, actor.user_id)
            .await?
            .ok_or_else(|| own_listing_not_found(actor.user_id))?;
        let saved = Self::transition_tx(&mut tx, actor, &row, command).await?;
        tx.commit().await?;
        Ok(ListingView::from_row(&saved, ViewMode::Editing)?)
    }

    async fn run_by_id(
        pool: &PgPool,
        actor: &Actor,
        listing_id: DbId,
        command: ListingCommand,
    ) -> Result<ListingView, WorkflowError> {
        let mut tx = pool.begin().await?;
        let row = ListingRepo::lock_by_id(&mut tx, listing_id)
            .await?
            .ok_or_else(|| listing_not_found(listing_id))?;
        let saved = Self::transition_tx(&mut tx, actor, &row, command).await?;
        tx.commit().await?;
        Ok(ListingView::from_row(&saved, ViewMode::Editing)?)
    }

    /// Authorize and execute one command on a locked row.
    async fn transition_tx(
        tx: &mut Tx<'_>,
        actor: &Actor,
        row: &ListingRow,
        command: ListingCommand,
    ) -> Result<ListingRow, WorkflowError> {
        if let Err(e) = authorize(actor, row.owner_id, required_authority(&command)) {
            tracing::warn!(
                listing_id = row.id,
                user_id = actor.user_id,
                command = command.name(),
                "Listing command forbidden"
            );
            return Err(e.into());
        }
        Self::execute_tx(tx, actor, row, command).await
    }

    /// Apply `command` to a locked row, persist the result, and carry out the
    /// transition's image effect in the same transaction.
    async fn execute_tx(
        tx: &mut Tx<'_>,
        actor: &Actor,
        row: &ListingRow,
        command: ListingCommand,
    ) -> Result<ListingRow, WorkflowError> {
        let state = row.to_state()?;
        let name = command.name();
        let transition = match apply(&state, command) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(
                    listing_id = row.id,
                    command = name,
                    status = %state.status,
                    error = %e,
                    "Listing command rejected"
                );
                return Err(e.into());
            }
        };

        let saved =
            ListingRepo::save_state_tx(tx, row.id, &transition.next, transition.min_price).await?;

        match transition.image_effect {
            ImageEffect::None => {}
            ImageEffect::CopyPublishedToDraft => {
                ImageAssetRepo::copy_to_draft_tx(tx, row.id, actor.user_id).await?;
            }
            // With an edit session the draft set is a full working copy, so
            // an empty one still replaces the live images.
            ImageEffect::PromoteDrafts if state.overlay.is_some() => {
                ImageAssetRepo::replace_published_tx(tx, row.id, actor.user_id).await?;
            }
            ImageEffect::PromoteDrafts => {
                ImageAssetRepo::promote_tx(tx, row.id, actor.user_id).await?;
            }
            ImageEffect::DiscardDrafts => {
                ImageAssetRepo::discard_draft_tx(tx, row.id, None).await?;
            }
        }

        tracing::info!(
            listing_id = row.id,
            user_id = actor.user_id,
            command = name,
            from = %transition.from,
            to = %transition.next.status,
            image_effect = ?transition.image_effect,
            "Listing transition committed"
        );
        Ok(saved)
    }

    /// Lock a listing and check the caller owns it or is an admin.
    async fn lock_authorized_tx(
        tx: &mut Tx<'_>,
        actor: &Actor,
        listing_id: DbId,
    ) -> Result<ListingRow, WorkflowError> {
        let row = ListingRepo::lock_by_id(tx, listing_id)
            .await?
            .ok_or_else(|| listing_not_found(listing_id))?;
        authorize(actor, row.owner_id, Authority::OwnerOrAdmin)?;
        Ok(row)
    }

    /// Prepare a listing for a draft image mutation.
    ///
    /// Listings under review or awaiting publication are locked. A published
    /// or offline listing without an edit session gets one first, so the
    /// draft set starts as a full copy of the live images.
    async fn open_image_edit_tx(
        tx: &mut Tx<'_>,
        actor: &Actor,
        listing_id: DbId,
    ) -> Result<ListingRow, WorkflowError> {
        let row = Self::lock_authorized_tx(tx, actor, listing_id).await?;
        let status = row.status()?;
        ensure_editable(status)?;
        if matches!(status, ListingStatus::Published | ListingStatus::Offline)
            && row.overlay.is_none()
        {
            return Self::execute_tx(tx, actor, &row, ListingCommand::BeginEditing).await;
        }
        Ok(row)
    }

    /// Resolve an image id of `listing_id` to the draft record it stands for.
    async fn draft_id_tx(
        tx: &mut Tx<'_>,
        listing_id: DbId,
        image_id: DbId,
    ) -> Result<DbId, WorkflowError> {
        let asset = ImageAssetRepo::find_by_id_tx(tx, image_id)
            .await?
            .ok_or_else(|| image_not_found(image_id))?;
        if asset.listing_id != listing_id {
            return Err(CoreError::Conflict(format!(
                "Image {image_id} does not belong to listing {listing_id}"
            ))
            .into());
        }
        match asset.generation()? {
            ImageGeneration::Draft => Ok(asset.id),
            ImageGeneration::Published => ImageAssetRepo::draft_counterpart_tx(tx, &asset)
                .await?
                .ok_or_else(|| {
                    CoreError::Conflict(format!(
                        "Image {image_id} was already removed from the draft set"
                    ))
                    .into()
                }),
            ImageGeneration::Archived => Err(image_not_found(image_id)),
        }
    }

    async fn query_page(
        pool: &PgPool,
        filter: &ListingFilter,
        order: ListingOrder,
        view: ViewMode,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Page<ListingSummary>, WorkflowError> {
        let (limit, offset) = clamp_page(page, page_size);
        let (rows, total) = ListingRepo::list(pool, filter, order, view, limit, offset).await?;
        let items = rows
            .iter()
            .map(|row| ListingSummary::from_row(row, view))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            total,
            page: offset / limit + 1,
            page_size: limit,
        })
    }
}
