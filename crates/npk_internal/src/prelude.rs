//! Prelude module for `npk_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use npk_internal::prelude::*;
//!
//! // Now you can use all common types directly
//! let loader = Loader::new(Sha256Hash, ZlibInflate);
//! let config = LoadConfig::lenient();
//! let canvas = Canvas::new(2, 2);
//!
//! assert_eq!(canvas.pixel(0, 0), Some(Color::transparent()));
//! assert!(config.tolerate_truncated_payloads);
//! # let _ = loader;
//! ```

// Re-export everything from npk_types::prelude
#[doc(inline)]
pub use npk_types::prelude::*;

// Re-export the entire npk_types module for advanced usage
#[doc(inline)]
pub use npk_types;
