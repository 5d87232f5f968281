//! Shelf - Per-bot shared-library manager
//!
//! Gives each bot an isolated, versioned dependency environment backed by
//! a virtual content store, and keeps a shared object cache consistent
//! with the on-disk bot trees.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod store;

pub use error::{ShelfError, ShelfResult};
