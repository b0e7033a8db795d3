//! Bot backstage logic and the `BotActions` port.
//!
//! This crate defines the server interface that the infrastructure layer
//! implements, the shared bot store, the list controller and the editor form.
//! It depends only on `backstage-types` -- never on `backstage-infra` or any
//! HTTP crate.

pub mod actions;
pub mod editor;
pub mod list;
pub mod row;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
