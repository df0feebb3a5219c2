//! Image asset entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stayboard_core::error::CoreError;
use stayboard_core::images::{GenerationId, ImageGeneration, ImageGroup, ImageKind};
use stayboard_core::types::{DbId, Timestamp};

/// A row from the `image_assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImageAsset {
    pub id: DbId,
    pub listing_id: DbId,
    pub url: String,
    pub kind: String,
    pub room_type_tag: Option<String>,
    pub generation_id: GenerationId,
    pub sort_order: i32,
    pub created_by: DbId,
    pub updated_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ImageAsset {
    pub fn generation(&self) -> Result<ImageGeneration, CoreError> {
        ImageGeneration::from_id(self.generation_id)
    }

    pub fn group(&self) -> Result<ImageGroup, CoreError> {
        ImageGroup::new(ImageKind::parse(&self.kind)?, self.room_type_tag.clone())
    }
}

/// DTO for appending an image to a group's draft set.
#[derive(Debug, Clone, Deserialize)]
pub struct AddImage {
    pub kind: ImageKind,
    pub room_type_tag: Option<String>,
    pub url: String,
}

/// DTO for reordering images within one group.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderImages {
    pub ids: Vec<DbId>,
}

/// DTO for replacing a group's draft set with an exact URL list.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncImages {
    pub kind: ImageKind,
    pub room_type_tag: Option<String>,
    /// An empty list clears the group.
    pub urls: Vec<String>,
}
