//! DXT1/DXT3/DXT5 block texture decoding.
//!
//! Block-compressed textures are stored as a grid of 4×4 pixel blocks. Each
//! block is a fixed-size unit:
//!
//! | Format | Unit size | Layout                                                  |
//! |--------|-----------|---------------------------------------------------------|
//! | DXT1   | 8 bytes   | color0 (u16), color1 (u16), 2-bit indices (u32)         |
//! | DXT3   | 16 bytes  | 4-bit alpha ×16 (8 bytes), then a DXT1-style color unit |
//! | DXT5   | 16 bytes  | alpha0, alpha1, 3-bit alpha indices (6 bytes), color    |
//!
//! Reference colors are RGB565 and are expanded by plain shifts, without
//! bit replication. Ramp interpolation uses integer division on the 8-bit
//! channels.
//!
//! # Examples
//!
//! ```
//! use npk_types::file::dxt::{BlockFormat, decode_blocks};
//!
//! // One DXT1 block: pure red and pure blue, every pixel uses color0
//! let block = [0x00, 0xF8, 0x1F, 0x00, 0x00, 0x00, 0x00, 0x00];
//! let canvas = decode_blocks(&block, 4, 4, BlockFormat::Dxt1).unwrap();
//! assert_eq!(canvas.pixel(3, 3).unwrap().r, 0xF8);
//! ```

use std::fmt;

use crate::file::DecodeError;
use crate::file::canvas::{Canvas, Color};


/// Number of pixels in one block.
pub const BLOCK_PIXELS: usize = 16;

/// Supported block compression formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFormat {
	/// DXT1 (BC1), opaque or 1-bit alpha cutout
	Dxt1,
	/// DXT3 (BC2), explicit 4-bit alpha
	Dxt3,
	/// DXT5 (BC3), interpolated alpha
	Dxt5,
}

impl BlockFormat {
	/// Four-character code `"DXT1"`.
	pub const DXT1_FOURCC: u32 = 0x3154_5844;
	/// Four-character code `"DXT3"`.
	pub const DXT3_FOURCC: u32 = 0x3354_5844;
	/// Four-character code `"DXT5"`.
	pub const DXT5_FOURCC: u32 = 0x3554_5844;

	/// Maps a four-character code to a block format.
	pub const fn from_four_cc(code: u32) -> Option<Self> {
		match code {
			Self::DXT1_FOURCC => Some(Self::Dxt1),
			Self::DXT3_FOURCC => Some(Self::Dxt3),
			Self::DXT5_FOURCC => Some(Self::Dxt5),
			_ => None,
		}
	}

	/// Returns the four-character code of this format.
	pub const fn four_cc(self) -> u32 {
		match self {
			Self::Dxt1 => Self::DXT1_FOURCC,
			Self::Dxt3 => Self::DXT3_FOURCC,
			Self::Dxt5 => Self::DXT5_FOURCC,
		}
	}

	/// Size of one encoded 4×4 block in bytes.
	pub const fn unit_size(self) -> usize {
		match self {
			Self::Dxt1 => 8,
			Self::Dxt3 | Self::Dxt5 => 16,
		}
	}
}

impl fmt::Display for BlockFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Dxt1 => "DXT1",
			Self::Dxt3 => "DXT3",
			Self::Dxt5 => "DXT5",
		};
		f.write_str(name)
	}
}

/// Decodes a grid of blocks into a `width × height` canvas.
///
/// # Errors
///
/// Returns an error if the dimensions are not multiples of 4 or `data` is
/// shorter than the block grid.
pub fn decode_blocks(
	data: &[u8],
	width: u32,
	height: u32,
	format: BlockFormat,
) -> Result<Canvas, DecodeError> {
	if width % 4 != 0 || height % 4 != 0 {
		return Err(DecodeError::UnalignedDimensions {
			width,
			height,
		});
	}

	let blocks_wide = (width / 4) as usize;
	let blocks_high = (height / 4) as usize;
	let unit = format.unit_size();
	let expected = blocks_wide * blocks_high * unit;
	if data.len() < expected {
		return Err(DecodeError::InsufficientBlockData {
			expected,
			actual: data.len(),
		});
	}

	let mut canvas = Canvas::new(width, height);
	let mut units = data.chunks_exact(unit);
	for block_y in 0..blocks_high {
		for block_x in 0..blocks_wide {
			let Some(block) = units.next() else {
				break;
			};
			let colors = match format {
				BlockFormat::Dxt1 => decode_dxt1(block),
				BlockFormat::Dxt3 => decode_dxt3(block),
				BlockFormat::Dxt5 => decode_dxt5(block),
			};
			for (i, color) in colors.into_iter().enumerate() {
				let x = (block_x * 4 + i % 4) as u32;
				let y = (block_y * 4 + i / 4) as u32;
				canvas.set_pixel(x, y, color);
			}
		}
	}

	log::debug!("Decoded {format} texture {width}x{height}");
	Ok(canvas)
}

/// Expands an RGB565 value into an opaque color.
pub const fn rgb565(value: u16) -> Color {
	Color::rgb(
		((value & 0xF800) >> 8) as u8,
		((value & 0x07E0) >> 3) as u8,
		((value & 0x001F) << 3) as u8,
	)
}

/// Builds the four-entry color ramp for two reference colors.
///
/// With `cutout` set and `color0 <= color1`, the ramp switches to the
/// three-color mode: slot 2 is the plain average and slot 3 is transparent
/// black. Otherwise slots 2 and 3 are the 2:1 and 1:2 blends.
pub fn color_ramp(color0: u16, color1: u16, cutout: bool) -> [Color; 4] {
	let c0 = rgb565(color0);
	let c1 = rgb565(color1);

	if cutout && color0 <= color1 {
		return [c0, c1, blend(c0, c1, 1, 1, 2), Color::transparent()];
	}
	[c0, c1, blend(c0, c1, 2, 1, 3), blend(c0, c1, 1, 2, 3)]
}

/// Builds the eight-entry alpha ramp used by DXT5.
pub fn alpha_ramp(alpha0: u8, alpha1: u8) -> [u8; 8] {
	let a0 = u32::from(alpha0);
	let a1 = u32::from(alpha1);
	let mut ramp = [alpha0, alpha1, 0, 0, 0, 0, 0, 0];

	if alpha0 > alpha1 {
		for k in 1..=6u32 {
			ramp[k as usize + 1] = (((7 - k) * a0 + k * a1) / 7) as u8;
		}
	} else {
		for k in 1..=4u32 {
			ramp[k as usize + 1] = (((5 - k) * a0 + k * a1) / 5) as u8;
		}
		ramp[6] = 0;
		ramp[7] = 0xFF;
	}
	ramp
}

fn blend(c0: Color, c1: Color, w0: u32, w1: u32, div: u32) -> Color {
	let mix = |a: u8, b: u8| ((w0 * u32::from(a) + w1 * u32::from(b)) / div) as u8;
	Color::rgb(mix(c0.r, c1.r), mix(c0.g, c1.g), mix(c0.b, c1.b))
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
	u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
	u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

/// Applies 2-bit color indices to a ramp.
fn index_colors(ramp: &[Color; 4], indices: u32) -> [Color; BLOCK_PIXELS] {
	std::array::from_fn(|i| ramp[((indices >> (i * 2)) & 0x03) as usize])
}

fn decode_dxt1(block: &[u8]) -> [Color; BLOCK_PIXELS] {
	let ramp = color_ramp(read_u16(block, 0), read_u16(block, 2), true);
	index_colors(&ramp, read_u32(block, 4))
}

fn decode_dxt3(block: &[u8]) -> [Color; BLOCK_PIXELS] {
	let ramp = color_ramp(read_u16(block, 8), read_u16(block, 10), false);
	let mut colors = index_colors(&ramp, read_u32(block, 12));

	for (i, color) in colors.iter_mut().enumerate() {
		let packed = block[i / 2];
		let nibble = if i % 2 == 0 {
			packed & 0x0F
		} else {
			packed >> 4
		};
		color.a = nibble * 0x11;
	}
	colors
}

fn decode_dxt5(block: &[u8]) -> [Color; BLOCK_PIXELS] {
	let alphas = alpha_ramp(block[0], block[1]);
	let ramp = color_ramp(read_u16(block, 8), read_u16(block, 10), false);
	let mut colors = index_colors(&ramp, read_u32(block, 12));

	// 48-bit alpha index field, 3 bits per pixel, least significant first
	let mut bits = block[2..8].iter().rev().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
	for color in colors.iter_mut() {
		color.a = alphas[(bits & 0x07) as usize];
		bits >>= 3;
	}
	colors
}
