//! Shared query parameter types for API handlers.

use serde::Deserialize;
use stayboard_core::error::CoreError;
use stayboard_core::images::{ImageGeneration, ImageGroup, ImageKind};
use stayboard_core::listing::ListingStatus;
use stayboard_core::overlay::ViewMode;

/// Query parameters for the public listing search (`?keyword=&page=&page_size=`).
///
/// Paging values are clamped by the workflow via `clamp_page`.
#[derive(Debug, Default, Deserialize)]
pub struct PublicListParams {
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Query parameters for the admin listing query.
#[derive(Debug, Default, Deserialize)]
pub struct ListingListParams {
    pub status: Option<ListingStatus>,
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// `?view=editing|live`; defaults to the editing view.
#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    pub view: Option<ViewMode>,
}

impl ViewParams {
    pub fn mode(&self) -> ViewMode {
        self.view.unwrap_or_default()
    }
}

/// Image group selector (`?kind=&room_type_tag=`), optionally with a
/// generation (`draft` or `published`).
#[derive(Debug, Default, Deserialize)]
pub struct ImageListParams {
    pub kind: Option<ImageKind>,
    pub room_type_tag: Option<String>,
    pub generation: Option<String>,
}

impl ImageListParams {
    /// The selected group, or `None` for every group of the listing.
    pub fn group(&self) -> Result<Option<ImageGroup>, CoreError> {
        match (self.kind, &self.room_type_tag) {
            (Some(kind), tag) => ImageGroup::new(kind, tag.clone()).map(Some),
            (None, None) => Ok(None),
            (None, Some(_)) => Err(CoreError::Validation(
                "room_type_tag requires kind=room".into(),
            )),
        }
    }

    /// The requested generation. Archived records are not readable.
    pub fn generation(&self) -> Result<Option<ImageGeneration>, CoreError> {
        self.generation
            .as_deref()
            .map(|g| ImageGeneration::parse(g.trim()))
            .transpose()
    }
}
