//! Listing entity model and the view/summary shapes built from it.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use stayboard_core::error::CoreError;
use stayboard_core::listing::{
    Discount, ListingFields, ListingPatch, ListingState, ListingStatus, StatusId,
};
use stayboard_core::overlay::{resolve_view, ViewMode};
use stayboard_core::pricing::{apply_best_discount, derive_min_price};
use stayboard_core::types::{DbId, Timestamp};

/// A row from the `listings` table.
#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub status_id: StatusId,
    pub fields: Json<ListingFields>,
    pub overlay: Option<Json<ListingPatch>>,
    pub min_price: i64,
    pub reject_reason: Option<String>,
    pub audit_info: Option<String>,
    pub resume_status_id: Option<StatusId>,
    pub is_banner: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ListingRow {
    pub fn status(&self) -> Result<ListingStatus, CoreError> {
        ListingStatus::from_id(self.status_id)
    }

    /// The lifecycle state held by this row.
    pub fn to_state(&self) -> Result<ListingState, CoreError> {
        Ok(ListingState {
            status: self.status()?,
            live: self.fields.0.clone(),
            overlay: self.overlay.as_ref().map(|o| o.0.clone()),
            reject_reason: self.reject_reason.clone(),
            audit_info: self.audit_info.clone(),
            resume_status: self.resume_status_id.map(ListingStatus::from_id).transpose()?,
            is_banner: self.is_banner,
        })
    }
}

/// A listing as returned to readers: the effective fields for one view mode.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub id: DbId,
    pub owner_id: DbId,
    pub status: ListingStatus,
    pub view: ViewMode,
    pub fields: ListingFields,
    pub min_price: i64,
    /// `true` when unapproved changes exist.
    pub has_overlay: bool,
    pub reject_reason: Option<String>,
    pub audit_info: Option<String>,
    pub is_banner: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ListingView {
    pub fn from_row(row: &ListingRow, view: ViewMode) -> Result<Self, CoreError> {
        let state = row.to_state()?;
        Ok(Self {
            id: row.id,
            owner_id: row.owner_id,
            status: state.status,
            view,
            fields: resolve_view(&state, view),
            min_price: row.min_price,
            has_overlay: state.overlay.is_some(),
            reject_reason: state.reject_reason,
            audit_info: state.audit_info,
            is_banner: row.is_banner,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Listing queries
// ---------------------------------------------------------------------------

/// A listing row joined with its representative image.
#[derive(Debug, Clone, FromRow)]
pub struct ListingSummaryRow {
    #[sqlx(flatten)]
    pub listing: ListingRow,
    pub cover_image: Option<String>,
}

/// One entry of a paginated listing query.
#[derive(Debug, Clone, Serialize)]
pub struct ListingSummary {
    pub id: DbId,
    pub owner_id: DbId,
    pub status: ListingStatus,
    pub name_local: String,
    pub name_intl: String,
    pub address: String,
    pub star_rating: i16,
    pub min_price: i64,
    /// `min_price` after the best applicable discount.
    pub final_price: i64,
    pub applied_discount: Option<Discount>,
    pub cover_image: Option<String>,
    pub has_overlay: bool,
    pub is_banner: bool,
    pub updated_at: Timestamp,
}

impl ListingSummary {
    /// Summarise `row` using the fields visible in `view`.
    pub fn from_row(row: &ListingSummaryRow, view: ViewMode) -> Result<Self, CoreError> {
        let listing = &row.listing;
        let state = listing.to_state()?;
        let fields = resolve_view(&state, view);
        let min_price = match view {
            ViewMode::Live => listing.min_price,
            ViewMode::Editing => derive_min_price(&fields.room_types),
        };
        let priced = apply_best_discount(min_price, &fields.discounts);

        Ok(Self {
            id: listing.id,
            owner_id: listing.owner_id,
            status: state.status,
            name_local: fields.name_local,
            name_intl: fields.name_intl,
            address: fields.address,
            star_rating: fields.star_rating,
            min_price,
            final_price: priced.final_price,
            applied_discount: priced.applied,
            cover_image: row.cover_image.clone(),
            has_overlay: state.overlay.is_some(),
            is_banner: listing.is_banner,
            updated_at: listing.updated_at,
        })
    }
}

/// Filter for listing queries. Unset fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    /// Case-insensitive substring of the local name, international name, or
    /// address.
    pub keyword: Option<String>,
}

/// Sort order of a listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOrder {
    /// Most recently updated first.
    RecentlyUpdated,
    /// Banner listings first, then cheapest.
    Storefront,
}

impl ListingOrder {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            ListingOrder::RecentlyUpdated => "l.updated_at DESC, l.id DESC",
            ListingOrder::Storefront => "l.is_banner DESC, l.min_price ASC, l.id ASC",
        }
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}
