//! This module is separated into its own crate to keep the public surface of `npk-rs` stable, and should not be used directly.

/// `use npk::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export npk_types for convenience
pub use npk_types;

// Re-export commonly used types at crate root
pub use npk_types::file::{
	Canvas, DecodeError, Hash256, Image, Inflate, LoadConfig, Loader, NpkError, NpkFile, Sha256Hash,
	ZlibInflate,
};
