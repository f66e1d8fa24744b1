#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `npk-rs` reads NeoplePack (`.NPK`) game asset archives.
//!
//! An archive holds versioned images; each image holds frames that decode
//! to RGBA canvases from palette indices, packed 16/32-bit colours or
//! DXT-compressed sub-textures.
//!
pub use npk_internal::*;
