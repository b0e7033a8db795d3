//! Observability setup shared by backstage binaries.

pub mod tracing_setup;
