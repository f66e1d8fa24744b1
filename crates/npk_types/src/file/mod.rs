//! File format support for `npk-rs` project.

mod error;

pub mod canvas;
pub mod codec;
pub mod dxt;
pub mod img;
pub mod npk;

// Re-export unified error types
pub use error::{DecodeError, InflateError, NpkError, Section};

// Re-export main file types
pub use canvas::{Canvas, ClipRect, Color};
pub use codec::{DIGEST_SIZE, Hash256, Inflate, Sha256Hash, ZlibInflate};
pub use dxt::BlockFormat;
pub use img::{
	ColorFormat, Compression, Frame, Header as ImageHeader, Image, Palette, PaletteStore, SubTexture,
	V5Info,
};
pub use npk::{Entry as NpkEntry, File as NpkFile, Header as NpkHeader, LoadConfig, Loader};
