//! Prelude module for `npk_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use npk_types::prelude::*;
//!
//! // Now you can use all common types directly
//! let loader = Loader::new(Sha256Hash, ZlibInflate).with_config(LoadConfig::strict());
//! let canvas = Canvas::new(4, 4);
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	// Block textures
	BlockFormat,

	// Canvas types
	Canvas,
	ClipRect,
	Color,
	ColorFormat,
	Compression,

	// Constants
	DIGEST_SIZE,

	// Errors
	DecodeError,
	Frame,

	// Capabilities
	Hash256,
	Image,
	ImageHeader,
	Inflate,
	InflateError,

	// Archive types
	LoadConfig,
	Loader,
	NpkEntry,
	NpkError,
	NpkFile,
	NpkHeader,
	Palette,
	PaletteStore,
	Section,
	Sha256Hash,
	SubTexture,
	V5Info,
	ZlibInflate,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
