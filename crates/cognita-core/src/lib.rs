//! Cognita Core: shared error types, traits, and utilities.
//!
//! This crate provides the foundational types used across all Cognita crates.
//! It has no internal Cognita dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`traits`]: Configuration abstraction for host applications
//! - [`util`]: Path utilities

#![doc = include_str!("../README.md")]

pub mod error;
pub mod traits;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use traits::ConfigProvider;

pub use util::paths::expand_tilde;
