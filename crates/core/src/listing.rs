//! Listing status, editable field shapes, and the in-memory listing state
//! the lifecycle operates on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status ID type matching SMALLINT in the `listing_statuses` lookup table.
pub type StatusId = i16;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Listing lifecycle status. Discriminants match the seed order of the
/// `listing_statuses` table.
#[repr(i16)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Draft = 1,
    Pending = 2,
    Approved = 3,
    Published = 4,
    Offline = 5,
    Rejected = 6,
}

impl ListingStatus {
    pub const ALL: [ListingStatus; 6] = [
        ListingStatus::Draft,
        ListingStatus::Pending,
        ListingStatus::Approved,
        ListingStatus::Published,
        ListingStatus::Offline,
        ListingStatus::Rejected,
    ];

    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    pub fn from_id(id: StatusId) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| CoreError::Internal(format!("Unknown listing status id {id}")))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Draft => "draft",
            ListingStatus::Pending => "pending",
            ListingStatus::Approved => "approved",
            ListingStatus::Published => "published",
            ListingStatus::Offline => "offline",
            ListingStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid listing status '{value}'. Must be one of: {}",
                    Self::ALL.map(|s| s.as_str()).join(", ")
                ))
            })
    }

    /// Statuses whose live fields are a reviewed baseline, so edits go to the
    /// overlay instead.
    pub fn has_live_baseline(self) -> bool {
        matches!(
            self,
            ListingStatus::Published | ListingStatus::Offline | ListingStatus::Rejected
        )
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Field shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomType {
    /// Stable within a listing; room images are tagged with it.
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub bed_type: String,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `value` is a percentage off, e.g. 20 for 20%.
    Percentage,
    /// `value` is subtracted from the price.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub kind: DiscountKind,
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Largest percentage a discount may take off.
pub const MAX_DISCOUNT_PERCENTAGE: i64 = 100;

impl Discount {
    /// Percentages must lie in `0..=100`, fixed amounts must not be negative.
    pub fn validate(&self) -> Result<(), CoreError> {
        let valid = match self.kind {
            DiscountKind::Percentage => (0..=MAX_DISCOUNT_PERCENTAGE).contains(&self.value),
            DiscountKind::Fixed => self.value >= 0,
        };
        if valid {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Discount value {} is out of range for a {} discount",
                self.value,
                match self.kind {
                    DiscountKind::Percentage => "percentage",
                    DiscountKind::Fixed => "fixed",
                }
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// The full set of merchant-editable fields. The live copy of a listing is
/// always one of these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingFields {
    pub name_local: String,
    pub name_intl: String,
    pub address: String,
    /// 0 while unset; 1..=5 once rated.
    pub star_rating: i16,
    pub room_types: Vec<RoomType>,
    pub open_date: Option<NaiveDate>,
    pub description: String,
    pub facilities: Vec<String>,
    pub nearby_info: String,
    pub discounts: Vec<Discount>,
    pub geolocation: Option<Geolocation>,
}

/// A sparse set of field changes.
///
/// `None` means "not submitted" and never touches the destination. For list
/// fields `Some(vec![])` is an explicit clear. Blank text counts as not
/// submitted (see [`crate::overlay`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_local: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_intl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_rating: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_types: Option<Vec<RoomType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facilities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearby_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounts: Option<Vec<Discount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<Geolocation>,
}

// ---------------------------------------------------------------------------
// Listing state
// ---------------------------------------------------------------------------

/// Everything the lifecycle needs to know about a listing. Identity and
/// timestamps stay with the persisted row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingState {
    pub status: ListingStatus,
    pub live: ListingFields,
    pub overlay: Option<ListingPatch>,
    pub reject_reason: Option<String>,
    pub audit_info: Option<String>,
    /// Status to return to when a pending submission is cancelled.
    pub resume_status: Option<ListingStatus>,
    pub is_banner: bool,
}

impl ListingState {
    /// Check the overlay placement invariant.
    ///
    /// An overlay may exist on Published, Offline, and Rejected listings, and
    /// on a Pending listing whose submission came from one of those.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        if self.overlay.is_none() {
            return Ok(());
        }
        let allowed = match self.status {
            ListingStatus::Published | ListingStatus::Offline | ListingStatus::Rejected => true,
            ListingStatus::Pending => self.resume_status.is_some_and(|s| s.has_live_baseline()),
            ListingStatus::Draft | ListingStatus::Approved => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(CoreError::Internal(format!(
                "Overlay present on a {} listing",
                self.status
            )))
        }
    }
}
