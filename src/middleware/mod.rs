//! Middleware
//!
//! Capas HTTP compartidas por el router.

pub mod cors;

pub use cors::cors_layer;
