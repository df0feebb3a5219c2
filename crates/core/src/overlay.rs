//! Draft overlay resolution.
//!
//! A published listing keeps its live fields untouched while the merchant
//! edits; edits accumulate in a sparse overlay that is merged over the live
//! fields for the editing view and folded into them on approval.
//!
//! Merging is an explicit per-field function over [`ListingFields`]. A
//! submitted value counts as present when:
//! - text: `Some` and not blank,
//! - lists: `Some`, including an empty list (an explicit clear),
//! - everything else: `Some`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::listing::{ListingFields, ListingPatch, ListingState, ListingStatus};

/// Which version of a listing a reader wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Working copy: overlay merged over live fields.
    #[default]
    Editing,
    /// What the public currently sees.
    Live,
}

/// Where a write landed.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub next: ListingState,
    /// `true` when this write created the overlay (start of an edit session
    /// on a listing with a live baseline).
    pub overlay_created: bool,
    /// `true` when the write changed room types in the live fields, so the
    /// denormalised minimum price must be recomputed.
    pub live_room_types_changed: bool,
}

fn present_text(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|s| !s.trim().is_empty())
}

impl ListingPatch {
    /// `true` when no field counts as present.
    pub fn is_empty(&self) -> bool {
        present_text(&self.name_local).is_none()
            && present_text(&self.name_intl).is_none()
            && present_text(&self.address).is_none()
            && self.star_rating.is_none()
            && self.room_types.is_none()
            && self.open_date.is_none()
            && present_text(&self.description).is_none()
            && self.facilities.is_none()
            && present_text(&self.nearby_info).is_none()
            && self.discounts.is_none()
            && self.geolocation.is_none()
    }

    pub fn touches_room_types(&self) -> bool {
        self.room_types.is_some()
    }

    /// Copy every present field of `self` into `fields`.
    pub fn merge_into(&self, fields: &mut ListingFields) {
        if let Some(v) = present_text(&self.name_local) {
            fields.name_local = v.clone();
        }
        if let Some(v) = present_text(&self.name_intl) {
            fields.name_intl = v.clone();
        }
        if let Some(v) = present_text(&self.address) {
            fields.address = v.clone();
        }
        if let Some(v) = self.star_rating {
            fields.star_rating = v;
        }
        if let Some(v) = &self.room_types {
            fields.room_types = v.clone();
        }
        if let Some(v) = self.open_date {
            fields.open_date = Some(v);
        }
        if let Some(v) = present_text(&self.description) {
            fields.description = v.clone();
        }
        if let Some(v) = &self.facilities {
            fields.facilities = v.clone();
        }
        if let Some(v) = present_text(&self.nearby_info) {
            fields.nearby_info = v.clone();
        }
        if let Some(v) = &self.discounts {
            fields.discounts = v.clone();
        }
        if let Some(v) = self.geolocation {
            fields.geolocation = Some(v);
        }
    }

    /// Fold a newer patch into this one. Present fields of `newer` win;
    /// blank text in `newer` leaves the existing value alone.
    pub fn absorb(&mut self, newer: ListingPatch) {
        fn text(dst: &mut Option<String>, src: Option<String>) {
            if let Some(v) = src.filter(|s| !s.trim().is_empty()) {
                *dst = Some(v);
            }
        }
        fn value<T>(dst: &mut Option<T>, src: Option<T>) {
            if src.is_some() {
                *dst = src;
            }
        }

        text(&mut self.name_local, newer.name_local);
        text(&mut self.name_intl, newer.name_intl);
        text(&mut self.address, newer.address);
        value(&mut self.star_rating, newer.star_rating);
        value(&mut self.room_types, newer.room_types);
        value(&mut self.open_date, newer.open_date);
        text(&mut self.description, newer.description);
        value(&mut self.facilities, newer.facilities);
        text(&mut self.nearby_info, newer.nearby_info);
        value(&mut self.discounts, newer.discounts);
        value(&mut self.geolocation, newer.geolocation);
    }

    /// The patch with blank text fields dropped, so what is stored in an
    /// overlay is exactly what counts as present.
    pub fn normalized(self) -> ListingPatch {
        let mut out = ListingPatch::default();
        out.absorb(self);
        out
    }
}

/// Compute the effective field set of `state` for `mode`.
pub fn resolve_view(state: &ListingState, mode: ViewMode) -> ListingFields {
    match (mode, &state.overlay) {
        (ViewMode::Editing, Some(overlay)) => {
            let mut fields = state.live.clone();
            overlay.merge_into(&mut fields);
            fields
        }
        _ => state.live.clone(),
    }
}

/// Route a merchant write to the live fields or the overlay.
///
/// - Draft: merged into the live fields.
/// - Published / Offline / Rejected: absorbed into the overlay, which is
///   created holding only the written fields when absent.
/// - Pending / Approved: locked for review.
///
/// A patch with no present fields changes nothing. Out-of-range discounts
/// are rejected before anything is written.
pub fn resolve_write(state: &ListingState, patch: ListingPatch) -> Result<WriteOutcome, CoreError> {
    ensure_editable(state.status)?;
    for discount in patch.discounts.iter().flatten() {
        discount.validate()?;
    }

    let mut next = state.clone();
    if patch.is_empty() {
        return Ok(WriteOutcome {
            next,
            overlay_created: false,
            live_room_types_changed: false,
        });
    }

    if state.status.has_live_baseline() {
        let overlay_created = next.overlay.is_none();
        next.overlay
            .get_or_insert_with(ListingPatch::default)
            .absorb(patch);
        Ok(WriteOutcome {
            next,
            overlay_created,
            live_room_types_changed: false,
        })
    } else {
        let live_room_types_changed = patch.touches_room_types();
        patch.merge_into(&mut next.live);
        Ok(WriteOutcome {
            next,
            overlay_created: false,
            live_room_types_changed,
        })
    }
}

/// Reject merchant modifications while a listing is under review or awaiting
/// publication.
pub fn ensure_editable(status: ListingStatus) -> Result<(), CoreError> {
    match status {
        ListingStatus::Draft
        | ListingStatus::Published
        | ListingStatus::Offline
        | ListingStatus::Rejected => Ok(()),
        ListingStatus::Pending => Err(CoreError::GuardViolation(
            "Listing is locked for review".into(),
        )),
        ListingStatus::Approved => Err(CoreError::GuardViolation(
            "Listing is approved and awaiting publication; publish it before editing".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::RoomType;

    fn live() -> ListingFields {
        ListingFields {
            name_local: "海景酒店".into(),
            name_intl: "Seaview Hotel".into(),
            address: "1 Harbour Rd".into(),
            star_rating: 4,
            room_types: vec![RoomType {
                name: "Deluxe".into(),
                price: 500,
                ..Default::default()
            }],
            description: "Quiet rooms".into(),
            facilities: vec!["wifi".into(), "pool".into()],
            ..Default::default()
        }
    }

    fn published() -> ListingState {
        ListingState {
            status: ListingStatus::Published,
            live: live(),
            ..Default::default()
        }
    }

    #[test]
    fn live_view_ignores_overlay() {
        let mut state = published();
        state.overlay = Some(ListingPatch {
            address: Some("2 New St".into()),
            ..Default::default()
        });
        assert_eq!(resolve_view(&state, ViewMode::Live), live());
    }

    #[test]
    fn editing_view_merges_overlay_per_field() {
        let mut state = published();
        state.overlay = Some(ListingPatch {
            address: Some("2 New St".into()),
            facilities: Some(vec![]),
            ..Default::default()
        });
        let view = resolve_view(&state, ViewMode::Editing);
        assert_eq!(view.address, "2 New St");
        assert!(view.facilities.is_empty());
        assert_eq!(view.name_intl, "Seaview Hotel");
        assert_eq!(view.room_types.len(), 1);
    }

    #[test]
    fn editing_view_without_overlay_is_live() {
        assert_eq!(resolve_view(&published(), ViewMode::Editing), live());
    }

    #[test]
    fn write_to_published_creates_sparse_overlay() {
        let patch = ListingPatch {
            address: Some("2 New St".into()),
            ..Default::default()
        };
        let outcome = resolve_write(&published(), patch).unwrap();
        assert!(outcome.overlay_created);
        assert_eq!(outcome.next.status, ListingStatus::Published);
        assert_eq!(outcome.next.live, live());
        assert_eq!(
            outcome.next.overlay,
            Some(ListingPatch {
                address: Some("2 New St".into()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn second_write_accumulates_in_overlay() {
        let first = resolve_write(
            &published(),
            ListingPatch {
                address: Some("2 New St".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let second = resolve_write(
            &first.next,
            ListingPatch {
                star_rating: Some(5),
                address: Some("   ".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!second.overlay_created);
        let overlay = second.next.overlay.unwrap();
        assert_eq!(overlay.address.as_deref(), Some("2 New St"));
        assert_eq!(overlay.star_rating, Some(5));
    }

    #[test]
    fn write_to_draft_goes_to_live_fields() {
        let state = ListingState::default();
        let outcome = resolve_write(
            &state,
            ListingPatch {
                name_local: Some("山居".into()),
                room_types: Some(vec![RoomType {
                    name: "Twin".into(),
                    price: 300,
                    ..Default::default()
                }]),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(outcome.next.overlay.is_none());
        assert!(outcome.live_room_types_changed);
        assert_eq!(outcome.next.live.name_local, "山居");
        assert_eq!(outcome.next.live.room_types[0].price, 300);
    }

    #[test]
    fn blank_text_does_not_overwrite() {
        let mut state = ListingState {
            live: live(),
            ..Default::default()
        };
        state = resolve_write(
            &state,
            ListingPatch {
                description: Some("".into()),
                ..Default::default()
            },
        )
        .unwrap()
        .next;
        assert_eq!(state.live.description, "Quiet rooms");
    }

    #[test]
    fn empty_patch_never_creates_overlay() {
        let outcome = resolve_write(&published(), ListingPatch::default()).unwrap();
        assert!(outcome.next.overlay.is_none());
        assert!(!outcome.overlay_created);
    }

    #[test]
    fn pending_listing_is_locked() {
        let state = ListingState {
            status: ListingStatus::Pending,
            ..Default::default()
        };
        let err = resolve_write(
            &state,
            ListingPatch {
                address: Some("x".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::GuardViolation(msg) if msg.contains("locked")));
    }

    #[test]
    fn approved_listing_is_not_editable() {
        assert!(ensure_editable(ListingStatus::Approved).is_err());
    }

    #[test]
    fn write_then_read_round_trips() {
        let patch = ListingPatch {
            name_intl: Some("Seaview Grand".into()),
            discounts: Some(vec![]),
            ..Default::default()
        };
        let next = resolve_write(&published(), patch.clone()).unwrap().next;
        let mut expected = live();
        expected.name_intl = "Seaview Grand".into();
        expected.discounts = vec![];
        assert_eq!(resolve_view(&next, ViewMode::Editing), expected);
    }

    #[test]
    fn normalized_drops_blank_text() {
        let patch = ListingPatch {
            name_local: Some(" ".into()),
            address: Some("3 Bay St".into()),
            ..Default::default()
        }
        .normalized();
        assert!(patch.name_local.is_none());
        assert_eq!(patch.address.as_deref(), Some("3 Bay St"));
    }

    #[test]
    fn out_of_range_discount_is_rejected_on_write() {
        use crate::listing::{Discount, DiscountKind};
        let patch = ListingPatch {
            discounts: Some(vec![Discount {
                kind: DiscountKind::Percentage,
                value: 150,
                name: None,
            }]),
            ..Default::default()
        };
        let err = resolve_write(&published(), patch.clone()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let mut draft = published();
        draft.status = ListingStatus::Draft;
        assert!(resolve_write(&draft, patch).is_err());
    }
}
