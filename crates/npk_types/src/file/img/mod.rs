//! Versioned image entries.
//!
//! Each directory entry of an NPK archive points at one image blob. Images
//! come in several versions:
//!
//! - **v2**: direct-color bitmaps only
//! - **v4**: one palette, palette-indexed bitmaps
//! - **v5**: one palette plus block-compressed sub-textures
//! - **v6**: a list of palettes
//!
//! Any other version is treated as an empty image.
//!
//! # Blob Layout
//!
//! ```text
//! header (32 bytes)
//! [v5 info (8 bytes)]                    v5
//! [palette block]                        v4, v5, v6
//! [sub-texture records × N]              v5
//! frame records × frame_count
//! [sub-texture payloads × N]             v5
//! bitmap payloads, in frame order
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use npk_types::file::codec::{Sha256Hash, ZlibInflate};
//! use npk_types::file::npk::Loader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = Loader::new(Sha256Hash, ZlibInflate).open("sprite_character.NPK")?;
//!
//! if let Some(image) = archive.image(0) {
//!     println!("{} (v{}, {} frames)", image.name(), image.version(), image.frame_count());
//!     for index in 0..image.frame_count() {
//!         println!("  {}: {}", image.link_chain(index).unwrap_or_default(), image.frames()[index]);
//!     }
//!
//!     let canvas = image.decode_frame(0, 0, &ZlibInflate)?;
//!     println!("frame 0: {canvas}");
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;

use crate::file::canvas::{Canvas, ClipRect};
use crate::file::codec::Inflate;
use crate::file::npk::LoadConfig;
use crate::file::{DecodeError, NpkError, Section};

pub mod frame;
pub mod palette;
pub mod texture;


pub use frame::{Bitmap, ColorFormat, Compression, Frame, FrameInfo, TextureRef};
pub use palette::{Palette, PaletteStore};
pub use texture::{SubTexture, TextureHeader};

/// Image constants.
pub mod constants {
	/// Size of the image header
	pub const HEADER_SIZE: usize = 32;

	/// Size of the image magic
	pub const MAGIC_SIZE: usize = 16;

	/// Size of the version 5 info block
	pub const V5_INFO_SIZE: usize = 8;

	/// Size of the obfuscated name field
	pub const NAME_SIZE: usize = 256;

	/// Leading part of the name key; the rest repeats `"DNF"`
	pub const NAME_KEY_PREFIX: &[u8] = b"puchikon@neople dungeon and fighter ";

	/// Maximum number of link hops followed when resolving a frame
	pub const MAX_LINK_DEPTH: usize = 2;
}

/// Builds the 256-byte name key.
///
/// The key is the prefix followed by `"DNF"` repeated, with a terminating
/// zero at the last position.
pub fn name_key() -> [u8; constants::NAME_SIZE] {
	let prefix = constants::NAME_KEY_PREFIX;
	let mut key = [0u8; constants::NAME_SIZE];
	for (i, byte) in key.iter_mut().enumerate().take(constants::NAME_SIZE - 1) {
		*byte = match prefix.get(i) {
			Some(&b) => b,
			None => b"DNF"[(i - prefix.len()) % 3],
		};
	}
	key
}

/// De-obfuscates a name field.
///
/// The name ends at the first zero byte after de-obfuscation.
pub fn decode_name(raw: &[u8]) -> String {
	let key = name_key();
	let bytes: Vec<u8> = raw
		.iter()
		.zip(key.iter())
		.map(|(&b, &k)| b ^ k)
		.take_while(|&b| b != 0)
		.collect();
	String::from_utf8_lossy(&bytes).into_owned()
}

/// Obfuscates a name into a 256-byte field.
///
/// Names longer than 255 bytes are truncated.
pub fn encode_name(name: &str) -> [u8; constants::NAME_SIZE] {
	let key = name_key();
	let mut raw = key;
	for (slot, &b) in raw.iter_mut().zip(name.as_bytes().iter().take(constants::NAME_SIZE - 1)) {
		*slot ^= b;
	}
	raw
}

/// Reads a little-endian `u32`. The caller guarantees `offset + 4 <= data.len()`.
pub(crate) fn read_u32(data: &[u8], offset: usize) -> u32 {
	u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

/// Fixed image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
	/// Image magic (not validated)
	pub magic: [u8; constants::MAGIC_SIZE],
	/// Declared size of the frame table
	pub frame_table_size: u32,
	/// Reserved
	pub reserved: u32,
	/// Image version
	pub version: u32,
	/// Number of frame records
	pub frame_count: u32,
}

impl Header {
	/// Parses the image header.
	pub fn parse(data: &[u8]) -> Result<Self, NpkError> {
		if data.len() < constants::HEADER_SIZE {
			return Err(NpkError::insufficient_data(
				Section::ImageHeader,
				constants::HEADER_SIZE,
				data.len(),
			));
		}

		let mut magic = [0u8; constants::MAGIC_SIZE];
		magic.copy_from_slice(&data[..constants::MAGIC_SIZE]);

		Ok(Self {
			magic,
			frame_table_size: read_u32(data, 16),
			reserved: read_u32(data, 20),
			version: read_u32(data, 24),
			frame_count: read_u32(data, 28),
		})
	}

	/// Returns `true` for versions this crate parses.
	pub fn is_supported(&self) -> bool {
		matches!(self.version, 2 | 4 | 5 | 6)
	}

	/// Returns `true` for versions that carry a palette block.
	pub fn has_palettes(&self) -> bool {
		matches!(self.version, 4 | 5 | 6)
	}
}

/// Extra block of version 5 images.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct V5Info {
	/// Number of sub-texture records
	pub sub_texture_count: u32,
	/// Declared image payload size
	pub image_size: u32,
}

impl V5Info {
	/// Parses the version 5 info block.
	pub fn parse(data: &[u8]) -> Result<Self, NpkError> {
		if data.len() < constants::V5_INFO_SIZE {
			return Err(NpkError::insufficient_data(Section::V5Info, constants::V5_INFO_SIZE, data.len()));
		}

		Ok(Self {
			sub_texture_count: read_u32(data, 0),
			image_size: read_u32(data, 4),
		})
	}
}

/// A parsed image: header, palettes, sub-textures and frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
	name: String,
	header: Header,
	v5_info: Option<V5Info>,
	palettes: Option<PaletteStore>,
	textures: Vec<SubTexture>,
	frames: Vec<Frame>,
}

impl Image {
	/// Parses an image blob.
	///
	/// `raw_name` is the obfuscated name field of the directory entry.
	///
	/// # Errors
	///
	/// Returns an error if a fixed-size record does not fit in `data`, or if
	/// `config` rejects a truncated payload or malformed palette block.
	pub fn parse(raw_name: &[u8], data: &[u8], config: &LoadConfig) -> Result<Self, NpkError> {
		let header = Header::parse(data)?;
		let mut image = Self {
			name: decode_name(raw_name),
			header,
			v5_info: None,
			palettes: None,
			textures: Vec::new(),
			frames: Vec::new(),
		};
		let mut offset = constants::HEADER_SIZE;

		if header.version == 5 {
			let info = V5Info::parse(&data[offset..])?;
			image.v5_info = Some(info);
			offset += constants::V5_INFO_SIZE;
		}

		if header.has_palettes() {
			let (store, consumed) = PaletteStore::load(&data[offset..], header.version, config)?;
			if consumed == 0 {
				log::warn!("Image {} has no palette data", image.name);
			}
			image.palettes = Some(store);
			offset += consumed;
		} else if !header.is_supported() {
			log::warn!("Unsupported image version {} in {}, treating as empty", header.version, image.name);
			return Ok(image);
		}

		if let Some(info) = image.v5_info {
			let count = info.sub_texture_count as usize;
			image.textures.reserve(count.min(data.len() / texture::SUB_TEXTURE_RECORD_SIZE));
			for _ in 0..count {
				image.textures.push(SubTexture::parse_record(&data[offset..])?);
				offset += texture::SUB_TEXTURE_RECORD_SIZE;
			}
		}

		let count = header.frame_count as usize;
		image.frames.reserve(count.min(data.len() / frame::LINK_RECORD_SIZE));
		for _ in 0..count {
			let (frame, size) = Frame::parse_record(&data[offset..])?;
			image.frames.push(frame);
			offset += size;
		}

		for (index, texture) in image.textures.iter_mut().enumerate() {
			let size = texture.compressed_size as usize;
			if size > 0 && offset >= data.len() {
				exhausted(&image.name, Section::SubTexturePayload, index, size, config)?;
				break;
			}
			texture.set_payload(take_payload(data, &mut offset, size, Section::SubTexturePayload, index, config)?);
		}

		for (index, frame) in image.frames.iter_mut().enumerate() {
			// Links and sub-texture references carry no payload
			let Some(size) = frame.payload_size() else {
				continue;
			};
			if size > 0 && offset >= data.len() {
				exhausted(&image.name, Section::FramePayload, index, size, config)?;
				break;
			}
			frame.set_payload(take_payload(data, &mut offset, size, Section::FramePayload, index, config)?);
		}

		log::debug!(
			"Parsed image {} (v{}, {} frames, {} sub-textures)",
			image.name,
			header.version,
			image.frames.len(),
			image.textures.len()
		);
		Ok(image)
	}

	/// Full image path.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Text after the last `/` of the path.
	pub fn short_name(&self) -> &str {
		self.name.rsplit('/').next().unwrap_or(&self.name)
	}

	/// Image header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Image version.
	pub fn version(&self) -> u32 {
		self.header.version
	}

	/// Version 5 info block.
	pub fn v5_info(&self) -> Option<&V5Info> {
		self.v5_info.as_ref()
	}

	/// Number of parsed frames (zero for unsupported versions).
	pub fn frame_count(&self) -> usize {
		self.frames.len()
	}

	/// All frames in index order.
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// Returns the frame at `index` without following links.
	pub fn frame(&self, index: usize) -> Option<&Frame> {
		self.frames.get(index)
	}

	/// Palette store, present for versions 4, 5 and 6.
	pub fn palettes(&self) -> Option<&PaletteStore> {
		self.palettes.as_ref()
	}

	/// Number of palettes.
	pub fn palette_count(&self) -> usize {
		self.palettes.as_ref().map_or(0, PaletteStore::len)
	}

	/// Sub-texture table.
	pub fn sub_textures(&self) -> &[SubTexture] {
		&self.textures
	}

	/// Number of sub-textures.
	pub fn sub_texture_count(&self) -> usize {
		self.textures.len()
	}

	/// Follows link frames from `index` to the frame holding pixels.
	///
	/// At most two links are followed; a longer chain, a cycle or an index
	/// out of range resolves to `None`.
	pub fn resolve(&self, index: usize) -> Option<&Frame> {
		self.resolve_at(index, 0)
	}

	fn resolve_at(&self, index: usize, depth: usize) -> Option<&Frame> {
		if depth > constants::MAX_LINK_DEPTH {
			return None;
		}
		match self.frames.get(index)? {
			Frame::Link {
				target,
			} => self.resolve_at(*target as usize, depth + 1),
			frame => Some(frame),
		}
	}

	/// Pixel format of the resolved frame.
	pub fn frame_color_format(&self, index: usize) -> Option<ColorFormat> {
		self.resolve(index).map(Frame::color_format)
	}

	/// Width of the resolved frame.
	pub fn frame_width(&self, index: usize) -> Option<u32> {
		self.resolve(index).map(Frame::width)
	}

	/// Height of the resolved frame.
	pub fn frame_height(&self, index: usize) -> Option<u32> {
		self.resolve(index).map(Frame::height)
	}

	/// Returns `true` if the frame at `index` is a link (links not followed).
	pub fn frame_is_link(&self, index: usize) -> bool {
		self.frames.get(index).is_some_and(Frame::is_link)
	}

	/// Returns `true` if the resolved frame is a sub-texture reference.
	pub fn frame_is_sub_texture(&self, index: usize) -> bool {
		self.resolve(index).is_some_and(|f| f.sub_texture_index().is_some())
	}

	/// Sub-texture index of the resolved frame.
	pub fn frame_sub_texture_index(&self, index: usize) -> Option<u32> {
		self.resolve(index).and_then(Frame::sub_texture_index)
	}

	/// Clip rectangle of the resolved frame.
	pub fn frame_clip_rect(&self, index: usize) -> Option<ClipRect> {
		self.resolve(index).and_then(Frame::clip_rect)
	}

	/// Describes the link chain starting at `index`, e.g. `"3 -> 1 -> 0"`.
	///
	/// Follows at most two links.
	pub fn link_chain(&self, index: usize) -> Option<String> {
		let mut frame = self.frames.get(index)?;
		let mut chain = index.to_string();

		for _ in 0..constants::MAX_LINK_DEPTH {
			let Some(target) = frame.link_target() else {
				break;
			};
			chain.push_str(&format!(" -> {target}"));
			match self.frames.get(target as usize) {
				Some(next) => frame = next,
				None => break,
			}
		}
		Some(chain)
	}

	/// Decodes frame `index` into a canvas, following links.
	///
	/// Bitmap frames use palette `palette` of this image when it has a
	/// palette store. Sub-texture references decode their texture and crop
	/// the clip rectangle. Every call decodes from scratch.
	pub fn decode_frame(&self, index: usize, palette: usize, inflater: &dyn Inflate) -> Result<Canvas, DecodeError> {
		let frame = self.resolve(index).ok_or(DecodeError::UnresolvedFrame {
			index,
		})?;
		frame.to_canvas(self.palettes.as_ref(), palette, &self.textures, inflater)
	}

	/// Decodes sub-texture `index` into a full canvas.
	pub fn decode_sub_texture(&self, index: usize, inflater: &dyn Inflate) -> Result<Canvas, DecodeError> {
		let texture = self.textures.get(index).ok_or(DecodeError::SubTextureOutOfRange {
			index: index as u32,
			count: self.textures.len(),
		})?;
		texture.decode(inflater)
	}
}

impl fmt::Display for Image {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} (v{}, {} frames, {} palettes, {} sub-textures)",
			self.name,
			self.header.version,
			self.frames.len(),
			self.palette_count(),
			self.textures.len()
		)
	}
}

/// Handles a payload whose data region is already used up.
fn exhausted(
	name: &str,
	section: Section,
	index: usize,
	size: usize,
	config: &LoadConfig,
) -> Result<(), NpkError> {
	if !config.tolerate_truncated_payloads {
		return Err(NpkError::TruncatedPayload {
			section,
			index,
			expected: size,
			actual: 0,
		});
	}
	log::warn!("Image {name} ends before {section} #{index}, skipping the remaining payloads");
	Ok(())
}

/// Slices the next payload out of `data`, shortening it if the data ends early.
fn take_payload(
	data: &[u8],
	offset: &mut usize,
	size: usize,
	section: Section,
	index: usize,
	config: &LoadConfig,
) -> Result<Vec<u8>, NpkError> {
	let available = data.len().saturating_sub(*offset);
	if available < size {
		if !config.tolerate_truncated_payloads {
			return Err(NpkError::TruncatedPayload {
				section,
				index,
				expected: size,
				actual: available,
			});
		}
		log::warn!("Truncated {section} #{index}: declared {size} bytes, {available} bytes available");
	}

	let end = *offset + size.min(available);
	let payload = data[*offset..end].to_vec();
	*offset = end;
	Ok(payload)
}
