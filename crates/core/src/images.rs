//! Image asset kinds, generations, and the pure planning rules behind the
//! image store's reorder and sync operations.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Generation ID type matching SMALLINT in the `image_generations` table.
pub type GenerationId = i16;

/// Maximum length of an image URL.
pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Main,
    Room,
    Banner,
}

impl ImageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageKind::Main => "main",
            ImageKind::Room => "room",
            ImageKind::Banner => "banner",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "main" => Ok(ImageKind::Main),
            "room" => Ok(ImageKind::Room),
            "banner" => Ok(ImageKind::Banner),
            other => Err(CoreError::Validation(format!(
                "Invalid image kind '{other}'. Must be one of: main, room, banner"
            ))),
        }
    }
}

/// Lifecycle bucket of an image record. Discriminants match the seed order
/// of the `image_generations` table.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageGeneration {
    Draft = 1,
    Published = 2,
    Archived = 3,
}

impl ImageGeneration {
    pub fn id(self) -> GenerationId {
        self as GenerationId
    }

    pub fn from_id(id: GenerationId) -> Result<Self, CoreError> {
        match id {
            1 => Ok(ImageGeneration::Draft),
            2 => Ok(ImageGeneration::Published),
            3 => Ok(ImageGeneration::Archived),
            other => Err(CoreError::Internal(format!(
                "Unknown image generation id {other}"
            ))),
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "draft" => Ok(ImageGeneration::Draft),
            "published" => Ok(ImageGeneration::Published),
            other => Err(CoreError::Validation(format!(
                "Invalid image generation '{other}'. Must be one of: draft, published"
            ))),
        }
    }
}

/// An ordered image set within a listing: a kind plus, for room images, the
/// room type name it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageGroup {
    pub kind: ImageKind,
    pub room_type_tag: Option<String>,
}

impl ImageGroup {
    /// Build a group, rejecting tag/kind combinations that cannot exist.
    pub fn new(kind: ImageKind, room_type_tag: Option<String>) -> Result<Self, CoreError> {
        let tag = room_type_tag.map(|t| t.trim().to_string());
        match (kind, tag) {
            (ImageKind::Room, Some(tag)) if !tag.is_empty() => Ok(Self {
                kind,
                room_type_tag: Some(tag),
            }),
            (ImageKind::Room, _) => Err(CoreError::Conflict(
                "Room images require a room type tag".into(),
            )),
            (_, Some(tag)) if !tag.is_empty() => Err(CoreError::Conflict(format!(
                "Only room images may carry a room type tag, got '{tag}' for {} images",
                kind.as_str()
            ))),
            (_, _) => Ok(Self {
                kind,
                room_type_tag: None,
            }),
        }
    }

    pub fn main() -> Self {
        Self {
            kind: ImageKind::Main,
            room_type_tag: None,
        }
    }

    pub fn room(tag: &str) -> Result<Self, CoreError> {
        Self::new(ImageKind::Room, Some(tag.to_string()))
    }
}

/// Validate an image URL before it is stored.
pub fn validate_url(url: &str) -> Result<(), CoreError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Image URL must not be empty".into()));
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Image URL must not exceed {MAX_URL_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

/// Compute the new order of a group.
///
/// `current` is the group's ids in their present order. Every id in
/// `requested` must belong to the group and appear once; ids left out keep
/// their relative order after the requested ones.
pub fn plan_reorder(current: &[DbId], requested: &[DbId]) -> Result<Vec<DbId>, CoreError> {
    if requested.is_empty() {
        return Err(CoreError::Validation(
            "Reorder requires at least one image id".into(),
        ));
    }
    let mut seen = std::collections::HashSet::new();
    for id in requested {
        if !current.contains(id) {
            return Err(CoreError::Conflict(format!(
                "Image {id} does not belong to the group being reordered"
            )));
        }
        if !seen.insert(*id) {
            return Err(CoreError::Conflict(format!(
                "Image {id} appears more than once in the requested order"
            )));
        }
    }

    let mut order = requested.to_vec();
    order.extend(current.iter().filter(|id| !seen.contains(*id)));
    Ok(order)
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// Changes needed to make a group's draft set equal a target URL list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Existing records to keep, with their new sort order.
    pub keep: Vec<(DbId, i32)>,
    /// URLs to insert, with their sort order.
    pub create: Vec<(String, i32)>,
    /// Existing records to delete.
    pub delete: Vec<DbId>,
}

/// Plan a sync of `existing` (id, url) records to exactly `urls`, in order.
///
/// Existing records are reused by URL, one record per occurrence. An empty
/// `urls` deletes the whole group.
pub fn plan_sync(existing: &[(DbId, String)], urls: &[String]) -> SyncPlan {
    let mut unused: Vec<Option<&(DbId, String)>> = existing.iter().map(Some).collect();
    let mut plan = SyncPlan::default();

    for (position, url) in urls.iter().enumerate() {
        let sort_order = position as i32;
        let reuse = unused
            .iter_mut()
            .find(|slot| slot.is_some_and(|(_, u)| u == url))
            .and_then(Option::take);
        match reuse {
            Some((id, _)) => plan.keep.push((*id, sort_order)),
            None => plan.create.push((url.clone(), sort_order)),
        }
    }

    plan.delete = unused.into_iter().flatten().map(|(id, _)| *id).collect();
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_group_requires_tag() {
        assert!(ImageGroup::new(ImageKind::Room, Some("Deluxe".into())).is_ok());
        assert!(matches!(
            ImageGroup::new(ImageKind::Room, None),
            Err(CoreError::Conflict(_))
        ));
        assert!(matches!(
            ImageGroup::new(ImageKind::Room, Some("  ".into())),
            Err(CoreError::Conflict(_))
        ));
    }

    #[test]
    fn non_room_group_rejects_tag() {
        assert!(matches!(
            ImageGroup::new(ImageKind::Banner, Some("Deluxe".into())),
            Err(CoreError::Conflict(_))
        ));
        assert_eq!(
            ImageGroup::new(ImageKind::Main, Some("".into())).unwrap(),
            ImageGroup::main()
        );
    }

    #[test]
    fn generation_ids_match_lookup_table() {
        assert_eq!(ImageGeneration::Draft.id(), 1);
        assert_eq!(ImageGeneration::Published.id(), 2);
        assert_eq!(ImageGeneration::Archived.id(), 3);
        assert_eq!(
            ImageGeneration::from_id(2).unwrap(),
            ImageGeneration::Published
        );
        assert!(ImageGeneration::from_id(9).is_err());
    }

    #[test]
    fn archived_generation_cannot_be_requested() {
        assert!(ImageGeneration::parse("archived").is_err());
    }

    #[test]
    fn kind_parse_round_trips() {
        for kind in [ImageKind::Main, ImageKind::Room, ImageKind::Banner] {
            assert_eq!(ImageKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(ImageKind::parse("logo").is_err());
    }

    #[test]
    fn url_must_be_present() {
        assert!(validate_url("https://cdn.example.com/a.jpg").is_ok());
        assert!(validate_url(" ").is_err());
        assert!(validate_url(&"a".repeat(MAX_URL_LENGTH + 1)).is_err());
    }

    #[test]
    fn reorder_full_permutation() {
        assert_eq!(plan_reorder(&[1, 2, 3], &[3, 1, 2]).unwrap(), vec![3, 1, 2]);
    }

    #[test]
    fn reorder_partial_keeps_rest_in_order() {
        assert_eq!(
            plan_reorder(&[1, 2, 3, 4], &[4, 2]).unwrap(),
            vec![4, 2, 1, 3]
        );
    }

    #[test]
    fn reorder_rejects_foreign_ids() {
        assert!(matches!(
            plan_reorder(&[1, 2], &[2, 9]),
            Err(CoreError::Conflict(msg)) if msg.contains('9')
        ));
    }

    #[test]
    fn reorder_rejects_duplicates_and_empty() {
        assert!(matches!(
            plan_reorder(&[1, 2], &[1, 1]),
            Err(CoreError::Conflict(_))
        ));
        assert!(plan_reorder(&[1, 2], &[]).is_err());
    }

    #[test]
    fn sync_reuses_matching_urls_and_creates_new() {
        let existing = vec![(10, "a".to_string()), (11, "b".to_string())];
        let plan = plan_sync(&existing, &["b".into(), "c".into(), "a".into()]);
        assert_eq!(plan.keep, vec![(11, 0), (10, 2)]);
        assert_eq!(plan.create, vec![("c".to_string(), 1)]);
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn sync_with_empty_list_deletes_everything() {
        let existing = vec![(10, "a".to_string()), (11, "b".to_string())];
        let plan = plan_sync(&existing, &[]);
        assert!(plan.keep.is_empty());
        assert!(plan.create.is_empty());
        assert_eq!(plan.delete, vec![10, 11]);
    }

    #[test]
    fn sync_matches_duplicate_urls_one_to_one() {
        let existing = vec![(10, "a".to_string())];
        let plan = plan_sync(&existing, &["a".into(), "a".into()]);
        assert_eq!(plan.keep, vec![(10, 0)]);
        assert_eq!(plan.create, vec![("a".to_string(), 1)]);
    }
}
