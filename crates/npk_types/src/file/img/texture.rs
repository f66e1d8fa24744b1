//! Block-compressed sub-textures of version 5 images.
//!
//! A sub-texture index record is 28 bytes:
//!
//! | Offset | Field             |
//! |--------|-------------------|
//! | 0x00   | reserved          |
//! | 0x04   | format            |
//! | 0x08   | index             |
//! | 0x0C   | compressed size   |
//! | 0x10   | uncompressed size |
//! | 0x14   | width             |
//! | 0x18   | height            |
//!
//! The payload is a zlib-compressed DDS container: a 128-byte header
//! followed by DXT block data.

use std::fmt;

use crate::file::canvas::Canvas;
use crate::file::codec::Inflate;
use crate::file::dxt::{self, BlockFormat};
use crate::file::{DecodeError, NpkError, Section};

use super::read_u32;

/// Size of a sub-texture index record in bytes.
pub const SUB_TEXTURE_RECORD_SIZE: usize = 28;

/// Size of the DDS container header in bytes (magic included).
pub const TEXTURE_HEADER_SIZE: usize = 128;

/// `"DDS "`
pub const TEXTURE_MAGIC: u32 = 0x2053_4444;

/// Declared header size (excluding the magic).
pub const TEXTURE_HEADER_DECLARED_SIZE: u32 = 124;

/// Flags of a compressed texture: caps, height, width, pixel format and
/// linear size.
pub const TEXTURE_FLAGS: u32 = 0x0008_1007;

/// DDS container header fields used for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHeader {
	/// Texture height
	pub height: u32,
	/// Texture width
	pub width: u32,
	/// Size of the block data in bytes
	pub linear_size: u32,
	/// Four-character block format code
	pub four_cc: u32,
}

impl TextureHeader {
	/// Parses and validates a DDS container header.
	///
	/// `uncompressed_size` is the declared size of the whole container; the
	/// header's linear size must cover everything after the header.
	pub fn parse(data: &[u8], uncompressed_size: u32) -> Result<Self, DecodeError> {
		if data.len() < TEXTURE_HEADER_SIZE {
			return Err(DecodeError::InvalidTextureHeader("container shorter than its header"));
		}
		if read_u32(data, 0) != TEXTURE_MAGIC {
			return Err(DecodeError::InvalidTextureHeader("magic mismatch"));
		}
		if read_u32(data, 4) != TEXTURE_HEADER_DECLARED_SIZE {
			return Err(DecodeError::InvalidTextureHeader("header size mismatch"));
		}
		if read_u32(data, 8) != TEXTURE_FLAGS {
			return Err(DecodeError::InvalidTextureHeader("unexpected flags"));
		}

		let header = Self {
			height: read_u32(data, 12),
			width: read_u32(data, 16),
			linear_size: read_u32(data, 20),
			four_cc: read_u32(data, 84),
		};

		let body = u64::from(uncompressed_size).saturating_sub(TEXTURE_HEADER_SIZE as u64);
		if u64::from(header.linear_size) < body {
			return Err(DecodeError::InvalidTextureHeader("linear size too short"));
		}
		Ok(header)
	}
}

/// One sub-texture: index record plus compressed payload.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubTexture {
	/// Format tag (informational)
	pub format: u32,
	/// Stored index (informational; lookups use table position)
	pub index: u32,
	/// Declared compressed size
	pub compressed_size: u32,
	/// Declared size of the inflated container
	pub uncompressed_size: u32,
	/// Declared width
	pub width: u32,
	/// Declared height
	pub height: u32,
	payload: Vec<u8>,
}

impl SubTexture {
	/// Parses a sub-texture index record.
	pub fn parse_record(data: &[u8]) -> Result<Self, NpkError> {
		if data.len() < SUB_TEXTURE_RECORD_SIZE {
			return Err(NpkError::insufficient_data(
				Section::SubTextureRecord,
				SUB_TEXTURE_RECORD_SIZE,
				data.len(),
			));
		}

		Ok(Self {
			format: read_u32(data, 4),
			index: read_u32(data, 8),
			compressed_size: read_u32(data, 12),
			uncompressed_size: read_u32(data, 16),
			width: read_u32(data, 20),
			height: read_u32(data, 24),
			payload: Vec::new(),
		})
	}

	/// Compressed payload bytes (may be shorter than declared).
	pub fn payload(&self) -> &[u8] {
		&self.payload
	}

	pub(super) fn set_payload(&mut self, payload: Vec<u8>) {
		self.payload = payload;
	}

	/// Inflates the payload and decodes its block data.
	///
	/// Decoding is uncached: each call inflates again.
	pub fn decode(&self, inflater: &dyn Inflate) -> Result<Canvas, DecodeError> {
		if self.payload.is_empty() {
			return Err(DecodeError::MissingPayload);
		}

		let container = inflater.inflate(&self.payload, self.uncompressed_size as usize)?;
		let header = TextureHeader::parse(&container, self.uncompressed_size)?;
		let format = BlockFormat::from_four_cc(header.four_cc)
			.ok_or(DecodeError::UnsupportedBlockFormat(header.four_cc))?;

		log::debug!("Decoding {format} sub-texture {}x{}", header.width, header.height);
		dxt::decode_blocks(&container[TEXTURE_HEADER_SIZE..], header.width, header.height, format)
	}
}

impl fmt::Display for SubTexture {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"SubTexture {{ {}x{}, {} -> {} bytes }}",
			self.width, self.height, self.compressed_size, self.uncompressed_size
		)
	}
}
