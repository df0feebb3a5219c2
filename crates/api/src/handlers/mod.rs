//! Request handlers.
//!
//! Handlers extract the caller, call into [`stayboard_db::ListingWorkflow`],
//! and map errors via [`AppError`](crate::error::AppError). Authorization
//! beyond the role gate is decided by the workflow.

pub mod admin;
pub mod images;
pub mod listing;
pub mod public;
