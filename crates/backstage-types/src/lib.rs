//! Shared domain types for backstage bot account management.
//!
//! This crate contains the records exchanged with the server (Bot, User,
//! AccessToken, Team), the client configuration, and the error types used by
//! the other crates.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod bot;
pub mod config;
pub mod error;
pub mod team;
pub mod token;
pub mod user;
