//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the database row plus
//! the request and response shapes built from it.

pub mod image_asset;
pub mod listing;
