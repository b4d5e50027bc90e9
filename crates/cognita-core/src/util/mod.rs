//! Utility modules.
//!
//! - [`paths`]: Path resolution helpers (tilde expansion)

pub mod paths;
