//! This crate provides core data types and file format support for the `npk-rs` project.
//!
//! # File Formats
//!
//! - **NPK**: Archive of images behind an obfuscated directory and an integrity digest
//! - **IMG**: Versioned image entry holding frames, palettes and sub-textures
//! - **DDS/DXT**: Block-compressed sub-textures (DXT1, DXT3, DXT5)
//!
//! Hashing and decompression are injected: pass a [`Hash256`](file::Hash256)
//! and an [`Inflate`](file::Inflate) to [`Loader::new`](file::Loader::new).
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use npk_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = Loader::new(Sha256Hash, ZlibInflate).open("sprite_character.NPK")?;
//! let image = archive.image_by_name("sprite/character/swordman/equipment/avatar/skin/sm_body0000.img");
//!
//! if let Some(image) = image {
//!     let canvas = image.decode_frame(0, 0, &ZlibInflate)?;
//!     println!("{canvas}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Or use explicit paths:
//!
//! ```
//! use npk_types::file::canvas::{Canvas, ClipRect};
//!
//! let canvas = Canvas::new(8, 8);
//! assert!(canvas.clip(ClipRect::new(0, 0, 9, 8)).is_none());
//! ```

pub mod file;

/// `use npk_types::prelude::*;` to import commonly used items.
pub mod prelude;
