//! Access-token handling.
//!
//! Accounts and login live in the surrounding platform; this service only
//! verifies the tokens it is handed.
//!
//! - [`jwt`] -- JWT access-token generation and validation.

pub mod jwt;
