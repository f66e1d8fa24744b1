//! Frame index records and pixel unpacking.
//!
//! Every frame record starts with a color type that decides its role and
//! record size:
//!
//! | Color type   | Role                  | Record size |
//! |--------------|-----------------------|-------------|
//! | `0x11`       | link to another frame | 8 bytes     |
//! | below `0x11` | bitmap (matrix)       | 36 bytes    |
//! | above `0x11` | sub-texture reference | 64 bytes    |
//!
//! Bitmap and sub-texture records share the first 36 bytes:
//!
//! ```text
//! color_type, compression, width, height, data_size,
//! pos_x, pos_y, frame_width, frame_height
//! ```
//!
//! Sub-texture references append `reserved, sub_texture, left, top, right,
//! bottom, reserved`.

use std::borrow::Cow;
use std::fmt;

use crate::file::canvas::{Canvas, ClipRect, Color};
use crate::file::codec::Inflate;
use crate::file::{DecodeError, NpkError, Section};

use super::palette::PaletteStore;
use super::read_u32;
use super::texture::SubTexture;

/// Size of a link frame record.
pub const LINK_RECORD_SIZE: usize = 8;

/// Size of a bitmap frame record.
pub const BITMAP_RECORD_SIZE: usize = 36;

/// Size of a sub-texture reference frame record.
pub const TEXTURE_REF_RECORD_SIZE: usize = 64;

/// Color type marking a link frame.
pub const LINK_MARKER: u32 = 0x11;

/// Pixel format of a frame, taken from its color type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFormat {
	/// 1-byte palette index
	Indexed,
	/// 16-bit 5-6-5, opaque
	Rgb565,
	/// 16-bit 1-5-5-5
	Argb1555,
	/// 16-bit 4-4-4-4
	Argb4444,
	/// 32-bit, stored B, G, R, A
	Argb8888,
	/// Link marker
	Link,
	/// DXT1 sub-texture reference
	Dxt1,
	/// DXT3 sub-texture reference
	Dxt3,
	/// DXT5 sub-texture reference
	Dxt5,
	/// Any other value
	Unknown(u32),
}

impl ColorFormat {
	/// Maps a raw color type.
	pub const fn from_raw(value: u32) -> Self {
		match value {
			0x01 => Self::Indexed,
			0x02 => Self::Rgb565,
			0x0E => Self::Argb1555,
			0x0F => Self::Argb4444,
			0x10 => Self::Argb8888,
			LINK_MARKER => Self::Link,
			0x12 => Self::Dxt1,
			0x13 => Self::Dxt3,
			0x14 => Self::Dxt5,
			other => Self::Unknown(other),
		}
	}

	/// Returns the raw color type.
	pub const fn raw(self) -> u32 {
		match self {
			Self::Indexed => 0x01,
			Self::Rgb565 => 0x02,
			Self::Argb1555 => 0x0E,
			Self::Argb4444 => 0x0F,
			Self::Argb8888 => 0x10,
			Self::Link => LINK_MARKER,
			Self::Dxt1 => 0x12,
			Self::Dxt3 => 0x13,
			Self::Dxt5 => 0x14,
			Self::Unknown(value) => value,
		}
	}

	/// Bytes per pixel used to size the inflate buffer.
	pub const fn bytes_per_color(self) -> usize {
		match self {
			Self::Rgb565 | Self::Argb1555 | Self::Argb4444 => 2,
			_ => 4,
		}
	}

	/// Unpacks one direct color from little-endian bytes.
	///
	/// Returns `None` for formats that are not direct colors.
	pub fn unpack(self, bytes: &[u8]) -> Option<Color> {
		match self {
			Self::Argb8888 => Some(Color::new(bytes[2], bytes[1], bytes[0], bytes[3])),
			Self::Argb4444 => {
				let v = u16::from_le_bytes([bytes[0], bytes[1]]);
				Some(Color::new(
					((v >> 8) & 0x0F) as u8 * 16,
					((v >> 4) & 0x0F) as u8 * 16,
					(v & 0x0F) as u8 * 16,
					((v >> 12) & 0x0F) as u8 * 17,
				))
			}
			Self::Argb1555 => {
				let v = u16::from_le_bytes([bytes[0], bytes[1]]);
				Some(Color::new(
					((v >> 10) & 0x1F) as u8 * 8,
					((v >> 5) & 0x1F) as u8 * 8,
					(v & 0x1F) as u8 * 8,
					((v >> 15) & 0x01) as u8 * 255,
				))
			}
			Self::Rgb565 => {
				let v = u16::from_le_bytes([bytes[0], bytes[1]]);
				Some(Color::rgb(
					((v >> 11) & 0x1F) as u8 * 8,
					((v >> 5) & 0x3F) as u8 * 4,
					(v & 0x1F) as u8 * 8,
				))
			}
			_ => None,
		}
	}
}

impl fmt::Display for ColorFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Indexed => f.write_str("INDEXED"),
			Self::Rgb565 => f.write_str("RGB565"),
			Self::Argb1555 => f.write_str("ARGB1555"),
			Self::Argb4444 => f.write_str("ARGB4444"),
			Self::Argb8888 => f.write_str("ARGB8888"),
			Self::Link => f.write_str("LINK"),
			Self::Dxt1 => f.write_str("DDS_DXT1"),
			Self::Dxt3 => f.write_str("DDS_DXT3"),
			Self::Dxt5 => f.write_str("DDS_DXT5"),
			Self::Unknown(value) => write!(f, "UNKNOWN(0x{value:02X})"),
		}
	}
}

/// Payload compression of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
	/// Stored
	None,
	/// zlib
	Zlib,
	/// zlib (alternate tag)
	Zlib2,
	/// Any other value, treated as stored
	Unknown(u32),
}

impl Compression {
	/// Maps a raw compress type.
	pub const fn from_raw(value: u32) -> Self {
		match value {
			0x05 => Self::None,
			0x06 => Self::Zlib,
			0x07 => Self::Zlib2,
			other => Self::Unknown(other),
		}
	}

	/// Returns the raw compress type.
	pub const fn raw(self) -> u32 {
		match self {
			Self::None => 0x05,
			Self::Zlib => 0x06,
			Self::Zlib2 => 0x07,
			Self::Unknown(value) => value,
		}
	}

	/// Returns `true` if the payload must be inflated.
	pub const fn is_compressed(self) -> bool {
		matches!(self, Self::Zlib | Self::Zlib2)
	}
}

impl fmt::Display for Compression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::None => f.write_str("NONE"),
			Self::Zlib => f.write_str("ZLIB"),
			Self::Zlib2 => f.write_str("ZLIB2"),
			Self::Unknown(value) => write!(f, "UNKNOWN(0x{value:02X})"),
		}
	}
}

/// Fields shared by bitmap and sub-texture reference records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
	/// Pixel format
	pub format: ColorFormat,
	/// Payload compression
	pub compression: Compression,
	/// Bitmap width
	pub width: u32,
	/// Bitmap height
	pub height: u32,
	/// Declared payload length (compressed length if compressed)
	pub data_size: u32,
	/// Horizontal draw position inside the frame field
	pub pos_x: u32,
	/// Vertical draw position inside the frame field
	pub pos_y: u32,
	/// Frame field width
	pub frame_width: u32,
	/// Frame field height
	pub frame_height: u32,
}

impl FrameInfo {
	fn parse(data: &[u8]) -> Self {
		Self {
			format: ColorFormat::from_raw(read_u32(data, 0)),
			compression: Compression::from_raw(read_u32(data, 4)),
			width: read_u32(data, 8),
			height: read_u32(data, 12),
			data_size: read_u32(data, 16),
			pos_x: read_u32(data, 20),
			pos_y: read_u32(data, 24),
			frame_width: read_u32(data, 28),
			frame_height: read_u32(data, 32),
		}
	}

	fn canvas(&self) -> Result<Canvas, DecodeError> {
		Canvas::try_with_layout(
			self.width,
			self.height,
			self.frame_width,
			self.frame_height,
			self.pos_x,
			self.pos_y,
		)
		.ok_or(DecodeError::FieldTooLarge {
			width: self.frame_width.max(self.width),
			height: self.frame_height.max(self.height),
		})
	}
}

/// Direct-color or palette-indexed bitmap frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
	/// Record fields
	pub info: FrameInfo,
	payload: Vec<u8>,
}

impl Bitmap {
	/// Raw payload bytes, possibly shorter than declared.
	pub fn payload(&self) -> &[u8] {
		&self.payload
	}

	/// Decodes the bitmap into a canvas laid out inside its frame field.
	///
	/// With a palette store every payload byte is a color index into
	/// palette `palette_index`; otherwise pixels are unpacked by color type.
	/// A payload shorter than the bitmap leaves the remaining pixels
	/// transparent.
	pub fn to_canvas(
		&self,
		palettes: Option<&PaletteStore>,
		palette_index: usize,
		inflater: &dyn Inflate,
	) -> Result<Canvas, DecodeError> {
		let info = &self.info;
		if info.width == 0 || info.height == 0 {
			return Err(DecodeError::EmptyFrame {
				width: info.width,
				height: info.height,
			});
		}
		if self.payload.is_empty() {
			return Err(DecodeError::MissingPayload);
		}

		let data: Cow<'_, [u8]> = if info.compression.is_compressed() {
			let expected = (info.width as usize)
				.saturating_mul(info.height as usize)
				.saturating_mul(info.format.bytes_per_color());
			Cow::Owned(inflater.inflate(&self.payload, expected)?)
		} else {
			Cow::Borrowed(&self.payload)
		};

		let mut canvas = info.canvas()?;
		let width = info.width as usize;

		match palettes {
			Some(store) => {
				for (i, &index) in data.iter().enumerate().take(width * info.height as usize) {
					let color = store.color(palette_index, usize::from(index));
					canvas.set_pixel((i % width) as u32, (i / width) as u32, color);
				}
			}
			None => {
				if info.format.unpack(&[0; 4]).is_none() {
					return Err(DecodeError::UnsupportedColorFormat(info.format.raw()));
				}
				let bpc = info.format.bytes_per_color();
				for (i, bytes) in data.chunks_exact(bpc).enumerate().take(width * info.height as usize) {
					if let Some(color) = info.format.unpack(bytes) {
						canvas.set_pixel((i % width) as u32, (i / width) as u32, color);
					}
				}
			}
		}

		if data.len() < width * info.height as usize {
			log::debug!("Frame payload covers only {} of {}x{} pixels", data.len(), info.width, info.height);
		}
		Ok(canvas)
	}
}

/// Frame cropped out of a block-compressed sub-texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRef {
	/// Record fields
	pub info: FrameInfo,
	/// Index into the image's sub-texture table
	pub sub_texture: u32,
	/// Crop rectangle inside the decoded texture
	pub clip: ClipRect,
}

impl TextureRef {
	/// Decodes the referenced sub-texture and crops the clip rectangle.
	pub fn to_canvas(&self, textures: &[SubTexture], inflater: &dyn Inflate) -> Result<Canvas, DecodeError> {
		let texture = textures.get(self.sub_texture as usize).ok_or(DecodeError::SubTextureOutOfRange {
			index: self.sub_texture,
			count: textures.len(),
		})?;

		let full = texture.decode(inflater)?;
		full.clip(self.clip).ok_or(DecodeError::InvalidClip {
			left: self.clip.left,
			top: self.clip.top,
			right: self.clip.right,
			bottom: self.clip.bottom,
			width: full.width(),
			height: full.height(),
		})
	}
}

/// One frame of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
	/// Alias of another frame in the same image
	Link {
		/// Target frame index
		target: u32,
	},
	/// Bitmap with its own payload
	Matrix(Bitmap),
	/// Crop of a sub-texture
	SubTextureRef(TextureRef),
}

impl Frame {
	/// Parses one frame index record.
	///
	/// Returns the frame and the number of bytes consumed.
	pub fn parse_record(data: &[u8]) -> Result<(Self, usize), NpkError> {
		if data.len() < LINK_RECORD_SIZE {
			return Err(NpkError::insufficient_data(Section::FrameRecord, LINK_RECORD_SIZE, data.len()));
		}

		let color_type = read_u32(data, 0);
		if color_type == LINK_MARKER {
			let frame = Frame::Link {
				target: read_u32(data, 4),
			};
			return Ok((frame, LINK_RECORD_SIZE));
		}

		let size = if color_type < LINK_MARKER {
			BITMAP_RECORD_SIZE
		} else {
			TEXTURE_REF_RECORD_SIZE
		};
		if data.len() < size {
			return Err(NpkError::insufficient_data(Section::FrameRecord, size, data.len()));
		}

		let info = FrameInfo::parse(data);
		let frame = if color_type < LINK_MARKER {
			Frame::Matrix(Bitmap {
				info,
				payload: Vec::new(),
			})
		} else {
			Frame::SubTextureRef(TextureRef {
				info,
				sub_texture: read_u32(data, 40),
				clip: ClipRect::new(
					read_u32(data, 44),
					read_u32(data, 48),
					read_u32(data, 52),
					read_u32(data, 56),
				),
			})
		};
		Ok((frame, size))
	}

	/// Returns `true` for link frames.
	pub fn is_link(&self) -> bool {
		matches!(self, Frame::Link { .. })
	}

	/// Link target, for link frames.
	pub fn link_target(&self) -> Option<u32> {
		match self {
			Frame::Link {
				target,
			} => Some(*target),
			_ => None,
		}
	}

	/// Record fields, absent for link frames.
	pub fn info(&self) -> Option<&FrameInfo> {
		match self {
			Frame::Link {
				..
			} => None,
			Frame::Matrix(bitmap) => Some(&bitmap.info),
			Frame::SubTextureRef(texture) => Some(&texture.info),
		}
	}

	/// Pixel format of the frame.
	pub fn color_format(&self) -> ColorFormat {
		self.info().map_or(ColorFormat::Link, |info| info.format)
	}

	/// Bitmap width, `0` for link frames.
	pub fn width(&self) -> u32 {
		self.info().map_or(0, |info| info.width)
	}

	/// Bitmap height, `0` for link frames.
	pub fn height(&self) -> u32 {
		self.info().map_or(0, |info| info.height)
	}

	/// Sub-texture index, for sub-texture references.
	pub fn sub_texture_index(&self) -> Option<u32> {
		match self {
			Frame::SubTextureRef(texture) => Some(texture.sub_texture),
			_ => None,
		}
	}

	/// Clip rectangle, for sub-texture references.
	pub fn clip_rect(&self) -> Option<ClipRect> {
		match self {
			Frame::SubTextureRef(texture) => Some(texture.clip),
			_ => None,
		}
	}

	/// Declared payload length of a bitmap frame.
	pub(super) fn payload_size(&self) -> Option<usize> {
		match self {
			Frame::Matrix(bitmap) => Some(bitmap.info.data_size as usize),
			_ => None,
		}
	}

	pub(super) fn set_payload(&mut self, payload: Vec<u8>) {
		if let Frame::Matrix(bitmap) = self {
			bitmap.payload = payload;
		}
	}

	/// Decodes the frame's pixels.
	///
	/// `palettes` and `textures` are the owning image's palette store and
	/// sub-texture table.
	pub fn to_canvas(
		&self,
		palettes: Option<&PaletteStore>,
		palette_index: usize,
		textures: &[SubTexture],
		inflater: &dyn Inflate,
	) -> Result<Canvas, DecodeError> {
		match self {
			Frame::Link {
				..
			} => Err(DecodeError::LinkFrame),
			Frame::Matrix(bitmap) => bitmap.to_canvas(palettes, palette_index, inflater),
			Frame::SubTextureRef(texture) => texture.to_canvas(textures, inflater),
		}
	}
}

impl fmt::Display for Frame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Frame::Link {
				target,
			} => write!(f, "Link -> {target}"),
			Frame::Matrix(bitmap) => write!(
				f,
				"{} {}x{} at ({}, {}) in {}x{}, {} ({} bytes)",
				bitmap.info.format,
				bitmap.info.width,
				bitmap.info.height,
				bitmap.info.pos_x,
				bitmap.info.pos_y,
				bitmap.info.frame_width,
				bitmap.info.frame_height,
				bitmap.info.compression,
				bitmap.info.data_size
			),
			Frame::SubTextureRef(texture) => write!(
				f,
				"{} {}x{} from texture {} [{}]",
				texture.info.format,
				texture.info.width,
				texture.info.height,
				texture.sub_texture,
				texture.clip
			),
		}
	}
}
