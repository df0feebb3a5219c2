//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Methods suffixed `_tx` run inside a
//! caller-owned transaction so the workflow can compose them atomically.

pub mod image_asset_repo;
pub mod listing_repo;

pub use image_asset_repo::ImageAssetRepo;
pub use listing_repo::ListingRepo;
