//! Infrastructure layer for the bot backstage.
//!
//! Contains the implementation of the `BotActions` port defined in
//! `backstage-core` (a reqwest client for the server's REST API), the
//! `config.toml` loader, and access token storage in the OS keychain.

pub mod client;
pub mod config;
pub mod credentials;
