//! Domain logic for merchant hotel listings.
//!
//! Nothing in this crate touches the database or HTTP. The db crate loads
//! rows, hands them to these functions, and persists what comes back.

pub mod error;
pub mod images;
pub mod lifecycle;
pub mod listing;
pub mod overlay;
pub mod pricing;
pub mod roles;
pub mod submission;
pub mod types;
